//! Dependency tracking between formula cells.
//!
//! Cells are interned into an arena and edges are stored as index sets, so the
//! graph owns no pointers and never needs reference counting.
//!
//! Edge direction: `A -> B` means "A reads from B". For A's formula `=B1+C1`
//! the outgoing set of A is {B1, C1}, and A appears in the incoming set of
//! both B1 and C1.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};

use super::cell_ref::CellRef;

type NodeId = usize;

#[derive(Clone, Debug)]
struct Node {
    cell: CellRef,
    /// Cells this node reads from.
    outgoing: BTreeSet<NodeId>,
    /// Cells that read from this node.
    incoming: BTreeSet<NodeId>,
}

/// Directed "reads-from" graph over cell coordinates.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    index: HashMap<CellRef, NodeId>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn id(&self, cell: &CellRef) -> Option<NodeId> {
        self.index.get(cell).copied()
    }

    fn intern(&mut self, cell: CellRef) -> NodeId {
        if let Some(id) = self.id(&cell) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            cell,
            outgoing: BTreeSet::new(),
            incoming: BTreeSet::new(),
        });
        self.index.insert(cell, id);
        id
    }

    /// Replace `cell`'s outgoing edges with edges to `refs`.
    ///
    /// Does not check for cycles; call [`would_create_cycle`](Self::would_create_cycle) first.
    pub fn add_or_replace(&mut self, cell: CellRef, refs: &[CellRef]) {
        let id = self.intern(cell);
        let old = std::mem::take(&mut self.nodes[id].outgoing);
        for target in old {
            self.nodes[target].incoming.remove(&id);
        }
        for r in refs {
            let target = self.intern(*r);
            self.nodes[id].outgoing.insert(target);
            self.nodes[target].incoming.insert(id);
        }
        log::trace!("graph: {} reads {} cell(s)", cell, refs.len());
    }

    /// Drop every outgoing edge of `cell` (the cell became a literal).
    pub fn clear(&mut self, cell: CellRef) {
        if self.id(&cell).is_some() {
            self.add_or_replace(cell, &[]);
        }
    }

    /// True if giving `cell` the references `refs` would close a cycle.
    pub fn would_create_cycle(&self, cell: CellRef, refs: &[CellRef]) -> bool {
        self.cycle_path(cell, refs).is_some()
    }

    /// The path `cell -> ... -> cell` that giving `cell` the references
    /// `refs` would create, if any.
    pub fn cycle_path(&self, cell: CellRef, refs: &[CellRef]) -> Option<Vec<CellRef>> {
        if refs.contains(&cell) {
            return Some(vec![cell, cell]);
        }
        let target = self.id(&cell)?;

        for start in refs {
            let Some(start_id) = self.id(start) else {
                continue;
            };
            let mut parent: HashMap<NodeId, NodeId> = HashMap::new();
            let mut visited: HashSet<NodeId> = HashSet::from([start_id]);
            let mut stack = vec![start_id];

            while let Some(current) = stack.pop() {
                if current == target {
                    let mut path = vec![cell];
                    let mut at = current;
                    while at != start_id {
                        at = parent[&at];
                        path.push(self.nodes[at].cell);
                    }
                    path.reverse();
                    // path now runs start -> ... -> cell; prefix the edited cell.
                    path.insert(0, cell);
                    return Some(path);
                }
                for &next in &self.nodes[current].outgoing {
                    if visited.insert(next) {
                        parent.insert(next, current);
                        stack.push(next);
                    }
                }
            }
        }
        None
    }

    /// `cell` followed by every cell that transitively reads from it, ordered
    /// so that each cell comes after everything it reads from.
    pub fn dirty_closure(&self, cell: CellRef) -> Vec<CellRef> {
        let Some(start) = self.id(&cell) else {
            return vec![cell];
        };

        let mut members: HashSet<NodeId> = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for &dependent in &self.nodes[current].incoming {
                if members.insert(dependent) {
                    queue.push_back(dependent);
                }
            }
        }

        self.kahn(&members)
    }

    /// Every cell known to the graph in dependency order.
    pub fn topological_order(&self) -> Vec<CellRef> {
        let members: HashSet<NodeId> = (0..self.nodes.len()).collect();
        self.kahn(&members)
    }

    /// Kahn's algorithm restricted to `members`. Ties break on coordinate.
    fn kahn(&self, members: &HashSet<NodeId>) -> Vec<CellRef> {
        let mut pending: HashMap<NodeId, usize> = members
            .iter()
            .map(|&id| {
                let reads_inside = self.nodes[id]
                    .outgoing
                    .iter()
                    .filter(|t| members.contains(t))
                    .count();
                (id, reads_inside)
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<(CellRef, NodeId)>> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(&id, _)| Reverse((self.nodes[id].cell, id)))
            .collect();

        let mut order = Vec::with_capacity(members.len());
        while let Some(Reverse((cell, id))) = ready.pop() {
            order.push(cell);
            for &dependent in &self.nodes[id].incoming {
                if let Some(count) = pending.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(Reverse((self.nodes[dependent].cell, dependent)));
                    }
                }
            }
        }

        if order.len() < members.len() {
            // Unreachable while commits reject cycles.
            log::error!(
                "dependency graph holds a cycle; {} cell(s) left unordered",
                members.len() - order.len()
            );
            let mut rest: Vec<CellRef> = pending
                .into_iter()
                .filter(|(_, count)| *count > 0)
                .map(|(id, _)| self.nodes[id].cell)
                .collect();
            rest.sort();
            order.extend(rest);
        }
        order
    }

    /// Cells `cell` reads from directly, sorted.
    pub fn precedents(&self, cell: CellRef) -> Vec<CellRef> {
        self.neighbours(cell, |n| &n.outgoing)
    }

    /// Cells reading `cell` directly, sorted.
    pub fn dependents(&self, cell: CellRef) -> Vec<CellRef> {
        self.neighbours(cell, |n| &n.incoming)
    }

    fn neighbours(&self, cell: CellRef, pick: impl Fn(&Node) -> &BTreeSet<NodeId>) -> Vec<CellRef> {
        let Some(id) = self.id(&cell) else {
            return Vec::new();
        };
        let mut cells: Vec<CellRef> = pick(&self.nodes[id])
            .iter()
            .map(|&n| self.nodes[n].cell)
            .collect();
        cells.sort();
        cells
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.outgoing.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(label: &str) -> CellRef {
        CellRef::decode(label).unwrap()
    }

    #[test]
    fn test_replace_removes_old_edges() {
        let mut graph = DependencyGraph::new();
        graph.add_or_replace(c("C1"), &[c("A1"), c("B1")]);
        assert_eq!(graph.dependents(c("A1")), vec![c("C1")]);

        graph.add_or_replace(c("C1"), &[c("B1")]);
        assert!(graph.dependents(c("A1")).is_empty());
        assert_eq!(graph.precedents(c("C1")), vec![c("B1")]);
        assert_eq!(graph.edge_count(), 1);

        graph.clear(c("C1"));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let graph = DependencyGraph::new();
        assert!(graph.would_create_cycle(c("A1"), &[c("A1")]));
    }

    #[test]
    fn test_indirect_cycle_path() {
        let mut graph = DependencyGraph::new();
        graph.add_or_replace(c("B1"), &[c("C1")]);
        graph.add_or_replace(c("C1"), &[c("A1")]);

        let path = graph.cycle_path(c("A1"), &[c("B1")]).unwrap();
        assert_eq!(path, vec![c("A1"), c("B1"), c("C1"), c("A1")]);
        assert!(!graph.would_create_cycle(c("D1"), &[c("B1")]));
    }

    #[test]
    fn test_dirty_closure_diamond_order() {
        // B1 = A1, C1 = A1, D1 = B1 + C1, E1 = D1 + A1
        let mut graph = DependencyGraph::new();
        graph.add_or_replace(c("B1"), &[c("A1")]);
        graph.add_or_replace(c("C1"), &[c("A1")]);
        graph.add_or_replace(c("D1"), &[c("B1"), c("C1")]);
        graph.add_or_replace(c("E1"), &[c("D1"), c("A1")]);

        let order = graph.dirty_closure(c("A1"));
        assert_eq!(order, vec![c("A1"), c("B1"), c("C1"), c("D1"), c("E1")]);

        let order = graph.dirty_closure(c("C1"));
        assert_eq!(order, vec![c("C1"), c("D1"), c("E1")]);
    }

    #[test]
    fn test_dirty_closure_waits_for_all_inputs() {
        // A2 reads A1 and Z9; Z9 reads A1. A2 must come after Z9 even though
        // A2 sorts first.
        let mut graph = DependencyGraph::new();
        graph.add_or_replace(c("A2"), &[c("A1"), c("Z9")]);
        graph.add_or_replace(c("Z9"), &[c("A1")]);
        assert_eq!(graph.dirty_closure(c("A1")), vec![c("A1"), c("Z9"), c("A2")]);
    }

    #[test]
    fn test_dirty_closure_unknown_cell() {
        let graph = DependencyGraph::new();
        assert_eq!(graph.dirty_closure(c("Q7")), vec![c("Q7")]);
    }

    #[test]
    fn test_topological_order_covers_graph() {
        let mut graph = DependencyGraph::new();
        graph.add_or_replace(c("A1"), &[c("B1")]);
        graph.add_or_replace(c("B1"), &[c("C1")]);
        assert_eq!(graph.topological_order(), vec![c("C1"), c("B1"), c("A1")]);
    }
}

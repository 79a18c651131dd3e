//! Markdown table output

use std::io::Write;

use gridcalc_core::{CellRef, Document};

/// Write the populated part of the grid as a markdown table of display values.
pub fn write_markdown<W: Write>(out: &mut W, doc: &Document) -> std::io::Result<()> {
    let Some((max_row, max_col)) = find_grid_bounds(doc) else {
        writeln!(out, "*Empty grid*")?;
        return Ok(());
    };

    write!(out, "|   |")?;
    for col in 0..=max_col {
        write!(out, " {} |", CellRef::col_to_letters(col))?;
    }
    writeln!(out)?;

    write!(out, "|---|")?;
    for _ in 0..=max_col {
        write!(out, "---|")?;
    }
    writeln!(out)?;

    for row in 0..=max_row {
        write!(out, "| {} |", row + 1)?;
        for col in 0..=max_col {
            let display = doc
                .display_value(CellRef::new(row, col))
                .unwrap_or_default();
            write!(out, " {} |", escape_markdown(&display))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Bottom-right corner of the populated cells; tables always start at A1.
fn find_grid_bounds(doc: &Document) -> Option<(usize, usize)> {
    doc.sheet()
        .store()
        .iter()
        .map(|(at, _)| (at.row, at.col))
        .reduce(|(r, c), (row, col)| (r.max(row), c.max(col)))
}

fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(doc: &Document) -> String {
        let mut out = Vec::new();
        write_markdown(&mut out, doc).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_grid() {
        assert_eq!(render(&Document::new(3, 3)), "*Empty grid*\n");
    }

    #[test]
    fn test_table_shows_display_values() {
        let mut doc = Document::new(5, 5);
        doc.commit_edit(CellRef::new(0, 0), "2").unwrap();
        doc.commit_edit(CellRef::new(1, 1), "=A1/0").unwrap();
        doc.commit_edit(CellRef::new(0, 1), "a|b").unwrap();
        assert_eq!(
            render(&doc),
            "|   | A | B |\n|---|---|---|\n| 1 | 2 | a\\|b |\n| 2 |  | #DIV0! |\n"
        );
    }
}

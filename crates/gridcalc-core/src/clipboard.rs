//! Clipboard interchange.
//!
//! Blocks travel as plain text: fields separated by tabs, rows by newlines,
//! each field being a cell's raw input (formulas keep their `=`). A field is
//! wrapped in double quotes, with inner quotes doubled, when it contains a tab,
//! a line break, or starts with a quote. A final row holding one empty field
//! is written as `""` so the trailing line break is not mistaken for padding.

use std::borrow::Cow;

use gridcalc_engine::engine::{CellRange, CellRef, Sheet, StoreError};

pub const FIELD_DELIMITER: char = '\t';
pub const ROW_DELIMITER: char = '\n';

/// Quote a raw input if it would not survive a plain split.
pub fn escape_field(input: &str) -> Cow<'_, str> {
    let needs_quotes = input.starts_with('"')
        || input.contains(|c| c == FIELD_DELIMITER || c == ROW_DELIMITER || c == '\r');
    if needs_quotes {
        Cow::Owned(format!("\"{}\"", input.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(input)
    }
}

/// Raw inputs of `range`, row by row.
pub fn serialize(sheet: &Sheet, range: CellRange) -> Result<String, StoreError> {
    sheet.store().check(range.start)?;
    sheet.store().check(range.end)?;

    let mut rows = Vec::with_capacity(range.rows());
    for row in range.start.row..=range.end.row {
        let mut fields = Vec::with_capacity(range.cols());
        for col in range.start.col..=range.end.col {
            let raw = sheet.raw_input(CellRef::new(row, col))?;
            fields.push(escape_field(raw).into_owned());
        }
        rows.push(fields.join(&FIELD_DELIMITER.to_string()));
    }
    if let Some(last) = rows.last_mut()
        && last.is_empty()
    {
        *last = "\"\"".to_string();
    }
    Ok(rows.join(&ROW_DELIMITER.to_string()))
}

/// Split clipboard text into rows of unescaped fields.
pub fn split_rows(text: &str) -> Vec<Vec<String>> {
    // A single trailing line break is conventional on the clipboard.
    let text = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }

    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // Check for escaped quote
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
            continue;
        }
        match c {
            '"' if current.is_empty() && !field_was_quoted => {
                in_quotes = true;
                field_was_quoted = true;
            }
            FIELD_DELIMITER => {
                fields.push(std::mem::take(&mut current));
                field_was_quoted = false;
            }
            '\r' | ROW_DELIMITER => {
                if c == '\r' && chars.peek() == Some(&ROW_DELIMITER) {
                    chars.next();
                }
                fields.push(std::mem::take(&mut current));
                rows.push(std::mem::take(&mut fields));
                field_was_quoted = false;
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    rows.push(fields);
    rows
}

/// Map clipboard text onto the grid with its first field at `anchor`.
/// Targets outside `rows x cols` are dropped.
pub fn deserialize(text: &str, anchor: CellRef, rows: usize, cols: usize) -> Vec<(CellRef, String)> {
    let mut cells = Vec::new();
    for (row_offset, fields) in split_rows(text).into_iter().enumerate() {
        for (col_offset, field) in fields.into_iter().enumerate() {
            let (Some(row), Some(col)) = (
                anchor.row.checked_add(row_offset),
                anchor.col.checked_add(col_offset),
            ) else {
                continue;
            };
            if row < rows && col < cols {
                cells.push((CellRef::new(row, col), field));
            }
        }
    }
    cells
}

/// Where copied blocks go and pasted blocks come from.
pub trait ClipboardProvider {
    /// Current clipboard text, `None` if empty or unreadable.
    fn get_text(&mut self) -> Option<String>;

    /// Replace the clipboard text. Returns false if the write failed.
    fn set_text(&mut self, text: String) -> bool;
}

/// In-process clipboard, used when no system clipboard is available.
#[derive(Clone, Debug, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl ClipboardProvider for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: String) -> bool {
        self.text = Some(text);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(label: &str) -> CellRef {
        CellRef::decode(label).unwrap()
    }

    #[test]
    fn test_serialize_block() {
        let mut sheet = Sheet::new(5, 5);
        sheet.commit_edit(c("A1"), "1").unwrap();
        sheet.commit_edit(c("B1"), "=A1*2").unwrap();
        sheet.commit_edit(c("B2"), "x").unwrap();
        let text = serialize(&sheet, CellRange::parse("A1:B2").unwrap()).unwrap();
        assert_eq!(text, "1\t=A1*2\n\tx");
    }

    #[test]
    fn test_trailing_empty_row_is_kept() {
        let mut sheet = Sheet::new(5, 5);
        sheet.commit_edit(c("A1"), "x").unwrap();

        let text = serialize(&sheet, CellRange::parse("A1:A2").unwrap()).unwrap();
        assert_eq!(text, "x\n\"\"");
        assert_eq!(split_rows(&text), vec![vec!["x"], vec![""]]);

        let text = serialize(&sheet, CellRange::parse("B1:B1").unwrap()).unwrap();
        assert_eq!(text, "\"\"");
        assert_eq!(
            deserialize(&text, c("C3"), 5, 5),
            vec![(c("C3"), String::new())]
        );

        // Wider rows already carry their delimiters.
        let text = serialize(&sheet, CellRange::parse("A1:B2").unwrap()).unwrap();
        assert_eq!(text, "x\t\n\t");
    }

    #[test]
    fn test_deserialize_anchor_at_address_limit() {
        let anchor = CellRef::new(usize::MAX, usize::MAX);
        assert!(deserialize("1\t2\n3\t4", anchor, 10, 10).is_empty());

        let anchor = CellRef::new(usize::MAX - 1, usize::MAX - 1);
        assert_eq!(
            deserialize("1\t2\n3\t4", anchor, usize::MAX, usize::MAX),
            vec![(anchor, "1".to_string())]
        );
    }

    #[test]
    fn test_serialize_out_of_bounds() {
        let sheet = Sheet::new(2, 2);
        assert!(serialize(&sheet, CellRange::parse("A1:C1").unwrap()).is_err());
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("say \"hi\""), "say \"hi\"");
        assert_eq!(escape_field("a\tb"), "\"a\tb\"");
        assert_eq!(escape_field("\"007\""), "\"\"\"007\"\"\"");
    }

    #[test]
    fn test_delimiters_survive_round_trip() {
        let mut sheet = Sheet::new(5, 5);
        let awkward = ["line\nbreak", "tab\there", "\"quoted\"", "crlf\r\nend"];
        for (col, input) in awkward.iter().enumerate() {
            sheet.commit_edit(CellRef::new(0, col), input).unwrap();
        }
        let text = serialize(&sheet, CellRange::parse("A1:D1").unwrap()).unwrap();
        let cells = deserialize(&text, c("A2"), 5, 5);
        let inputs: Vec<&str> = cells.iter().map(|(_, s)| s.as_str()).collect();
        assert_eq!(inputs, awkward);
        assert!(cells.iter().all(|(at, _)| at.row == 1));
    }

    #[test]
    fn test_split_rows_handles_crlf_and_trailing_newline() {
        assert_eq!(
            split_rows("a\tb\r\nc\td\r\n"),
            vec![vec!["a", "b"], vec!["c", "d"]]
        );
        assert_eq!(split_rows(""), Vec::<Vec<String>>::new());
        assert_eq!(split_rows("\n"), Vec::<Vec<String>>::new());
        assert_eq!(split_rows("a\t"), vec![vec!["a", ""]]);
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        assert_eq!(split_rows("5\" screen"), vec![vec!["5\" screen"]]);
    }

    #[test]
    fn test_deserialize_offsets_from_anchor() {
        let cells = deserialize("1\t2\n3\t4", c("C3"), 10, 10);
        let targets: Vec<String> = cells.iter().map(|(at, _)| at.label()).collect();
        assert_eq!(targets, vec!["C3", "D3", "C4", "D4"]);
    }

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::default();
        assert_eq!(clipboard.get_text(), None);
        assert!(clipboard.set_text("A".to_string()));
        assert_eq!(clipboard.get_text().as_deref(), Some("A"));
    }
}

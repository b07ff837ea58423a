//! Plain-text rendering of a table window.

use std::fmt::Write;

use datagrid_lib::prelude::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Parses a `key=value` argument.
pub fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

/// Value of a quick filter argument: JSON scalars (`7`, `true`) keep their
/// type, anything else is a string.
pub fn quick_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::from(text))
}

/// Fits text into `width` display cells, truncating with an ellipsis and
/// padding with spaces.
fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    if text.width() <= width {
        out.push_str(text);
    } else {
        let mut used = 0;
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if used + w + 1 > width {
                break;
            }
            out.push(c);
            used += w;
        }
        if width > 0 {
            out.push('…');
        }
    }
    let pad = width.saturating_sub(out.width());
    out.extend(std::iter::repeat_n(' ', pad));
    out
}

/// Renders the materialized rows: header, one line per row, then a footer.
pub fn grid(table: &DataTable) -> String {
    let columns = table.columns();
    let marker = table.config().selectable;
    let mut out = String::new();

    let header: Vec<String> = columns
        .iter()
        .map(|c| fit(&c.title, c.width as usize))
        .collect();
    if marker {
        out.push_str("    ");
    }
    let _ = writeln!(out, "{}", header.join(" | ").trim_end());

    let rows = table.rendered_rows();
    if rows.is_empty() {
        out.push_str("(no rows)\n");
    }
    for row in rows {
        if marker {
            out.push_str(if row.selected { "[x] " } else { "[ ] " });
        }
        let cells: Vec<String> = columns
            .iter()
            .zip(&row.cells)
            .map(|(c, text)| fit(&text.replace('\n', " "), c.width as usize))
            .collect();
        let _ = writeln!(out, "{}", cells.join(" | ").trim_end());
    }

    let pagination = table.pagination();
    let _ = writeln!(
        out,
        "Page {}/{} ({} records, {} selected)",
        pagination.page(),
        pagination.total_pages(),
        pagination.total_count(),
        table.selected_count()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DataTable {
        let columns = ColumnRegistry::new(vec![
            Column::new("name", "Name").width(6),
            Column::new("team", "Team").width(4),
        ])
        .unwrap();
        let mut table = DataTable::new(columns, TableConfig::default());
        table.set_records(
            vec![
                Record::new().set("id", "a").set("name", "Ada Lovelace").set("team", "Core"),
                Record::new().set("id", "b").set("name", "Bob"),
            ],
            None,
        );
        table.set_viewport(10);
        table
    }

    #[test]
    fn test_fit_truncates_and_pads() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("日本語", 4), "日… ");
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("status=active").unwrap(), ("status".to_string(), "active".to_string()));
        assert_eq!(parse_pair("q=a=b").unwrap().1, "a=b");
        assert!(parse_pair("=x").is_err());
        assert!(parse_pair("status").is_err());
    }

    #[test]
    fn test_quick_value_keeps_scalar_types() {
        assert_eq!(quick_value("7"), Value::Int(7));
        assert_eq!(quick_value("true"), Value::Bool(true));
        assert_eq!(quick_value("Core"), Value::from("Core"));
    }

    #[test]
    fn test_grid_marks_selection_and_placeholder() {
        let mut table = table();
        table.select("b", true);
        let text = grid(&table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "    Name   | Team");
        assert_eq!(lines[1], "[ ] Ada L… | Core");
        assert_eq!(lines[2], "[x] Bob    | -");
        assert_eq!(lines[3], "Page 1/1 (2 records, 1 selected)");
    }
}

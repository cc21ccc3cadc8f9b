//! Mapping tables: one `pattern,replacement` row per pass, applied in file order.

use crate::pattern::{Pattern, PatternSource};
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub fn load_table(path: &Path, delimiter: u8) -> Result<Vec<PatternSource>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open mapping table {}", path.display()))?;
    parse_table(file, delimiter)
        .with_context(|| format!("Failed to read mapping table {}", path.display()))
}

/// Parse delimited rows without a header. Column 0 is the match expression,
/// column 1 the replacement; further columns are ignored and blank lines are
/// skipped.
pub fn parse_table<R: Read>(reader: R, delimiter: u8) -> Result<Vec<PatternSource>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);

        let (Some(pattern), Some(replacement)) = (record.get(0), record.get(1)) else {
            bail!(
                "Row on line {} has {} column(s); expected a pattern and a replacement",
                line,
                record.len()
            );
        };

        rows.push(PatternSource {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        });
    }

    Ok(rows)
}

/// Compile every row, failing on the first invalid expression.
pub fn compile_table(rows: &[PatternSource]) -> Result<Vec<Pattern>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            Pattern::try_from(row).with_context(|| format!("Invalid pattern in row {}", index + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source(pattern: &str, replacement: &str) -> PatternSource {
        PatternSource {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }

    #[test]
    fn test_parse_rows_in_order() {
        let table = "A,B\nB,C\n";
        let rows = parse_table(table.as_bytes(), b',').unwrap();
        assert_eq!(rows, vec![source("A", "B"), source("B", "C")]);
    }

    #[test]
    fn test_regex_source_is_verbatim() {
        let table = "(ITEM)_G(0\\d{2}),$1_G1$2\n";
        let rows = parse_table(table.as_bytes(), b',').unwrap();
        assert_eq!(rows, vec![source(r"(ITEM)_G(0\d{2})", "$1_G1$2")]);
    }

    #[test]
    fn test_quoted_fields_may_contain_the_delimiter() {
        let table = "\"a{1,3}\",\"x,y\"\n";
        let rows = parse_table(table.as_bytes(), b',').unwrap();
        assert_eq!(rows, vec![source("a{1,3}", "x,y")]);
    }

    #[test]
    fn test_extra_columns_and_blank_lines_are_ignored() {
        let table = "a,b,comment\n\nc,d\n";
        let rows = parse_table(table.as_bytes(), b',').unwrap();
        assert_eq!(rows, vec![source("a", "b"), source("c", "d")]);
    }

    #[test]
    fn test_empty_replacement_column_is_allowed() {
        let rows = parse_table("_old,\n".as_bytes(), b',').unwrap();
        assert_eq!(rows, vec![source("_old", "")]);
    }

    #[test]
    fn test_tab_delimiter() {
        let rows = parse_table("a,1\tb\n".as_bytes(), b'\t').unwrap();
        assert_eq!(rows, vec![source("a,1", "b")]);
    }

    #[test]
    fn test_single_column_row_is_an_error() {
        let err = parse_table("a,b\nlonely\n".as_bytes(), b',').unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_compile_reports_bad_row() {
        let rows = vec![source("ok", "fine"), source("(broken", "x")];
        let err = compile_table(&rows).unwrap_err();
        assert!(format!("{err:#}").contains("row 2"));
    }

    #[test]
    fn test_load_missing_table() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_table(&temp_dir.path().join("nope.csv"), b',').unwrap_err();
        assert!(err.to_string().contains("nope.csv"));
    }

    #[test]
    fn test_load_table_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("replace.csv");
        std::fs::write(&path, "x_01,y_01\r\nfoo,bar\r\n").unwrap();

        let rows = load_table(&path, b',').unwrap();
        assert_eq!(rows, vec![source("x_01", "y_01"), source("foo", "bar")]);
    }
}

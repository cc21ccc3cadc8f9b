use super::{ensure_root, RunOptions};
use crate::batch::apply_pattern_sequence;
use crate::output::{RunMode, RunResult};
use crate::report::EventSink;
use crate::table::{compile_table, load_table};
use anyhow::Result;
use std::path::Path;

/// Apply every row of the mapping table at `table_path`, in order.
///
/// The whole table is compiled before the first pass, so an invalid row
/// aborts the run without touching the tree.
pub fn batch_operation(
    root: &Path,
    table_path: &Path,
    options: &RunOptions,
    sink: &dyn EventSink,
) -> Result<RunResult> {
    ensure_root(root)?;
    let rows = load_table(table_path, options.delimiter)?;
    let patterns = compile_table(&rows)?;
    let apply_options = options.apply_options()?;

    let report = options.install(|| {
        Ok(apply_pattern_sequence(
            root,
            &patterns,
            &apply_options,
            sink,
        )?)
    })?;

    Ok(RunResult::new(
        root.to_path_buf(),
        RunMode::Batch,
        report.passes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{MemorySink, NullSink};
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, TempDir) {
        (TempDir::new().unwrap(), TempDir::new().unwrap())
    }

    #[test]
    fn test_batch_operation_applies_rows_in_order() {
        let (site, tables) = fixture();
        let root = site.path();
        fs::create_dir(root.join("docs")).unwrap();
        fs::write(root.join("docs/intro_v1.html"), "intro_v1").unwrap();

        let table = tables.path().join("map.csv");
        fs::write(&table, "intro_v1,intro_v2\nintro_v2,intro_v3\n").unwrap();

        let sink = MemorySink::new();
        let result = batch_operation(root, &table, &RunOptions::default(), &sink).unwrap();

        assert_eq!(result.mode, RunMode::Batch);
        assert_eq!(result.passes.len(), 2);
        assert_eq!(
            fs::read_to_string(root.join("docs/intro_v3.html")).unwrap(),
            "intro_v3"
        );
        assert_eq!(sink.lines()[0], "intro_v1 -> intro_v2");
    }

    #[test]
    fn test_bad_row_aborts_before_any_pass() {
        let (site, tables) = fixture();
        let root = site.path();
        fs::write(root.join("first_row.txt"), "").unwrap();

        let table = tables.path().join("map.csv");
        fs::write(&table, "first_row,renamed_row\n(broken,x\n").unwrap();

        let err = batch_operation(root, &table, &RunOptions::default(), &NullSink).unwrap_err();
        assert!(format!("{err:#}").contains("row 2"));
        assert!(root.join("first_row.txt").exists());
    }

    #[test]
    fn test_semicolon_delimiter() {
        let (site, tables) = fixture();
        let root = site.path();
        fs::write(root.join("one_file.txt"), "").unwrap();

        let table = tables.path().join("map.csv");
        fs::write(&table, "one_file;two_file\n").unwrap();

        let options = RunOptions {
            delimiter: b';',
            threads: 1,
            ..RunOptions::default()
        };
        batch_operation(root, &table, &options, &NullSink).unwrap();
        assert!(root.join("two_file.txt").exists());
    }

    #[test]
    fn test_missing_table() {
        let (site, tables) = fixture();
        let result = batch_operation(
            site.path(),
            &tables.path().join("absent.csv"),
            &RunOptions::default(),
            &NullSink,
        );
        assert!(result.is_err());
    }
}

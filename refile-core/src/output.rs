use crate::apply::{PassReport, PassStats};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write;
use std::path::PathBuf;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Single,
    Batch,
}

/// Result of a single-pattern or batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub root: PathBuf,
    pub mode: RunMode,
    pub passes: Vec<PassReport>,
    pub totals: PassStats,
}

impl RunResult {
    pub fn new(root: PathBuf, mode: RunMode, passes: Vec<PassReport>) -> Self {
        let mut totals = PassStats::default();
        for pass in &passes {
            totals.merge(&pass.stats);
        }
        Self {
            root,
            mode,
            passes,
            totals,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.totals.errors > 0
    }
}

/// Trait for formatting output in different formats
pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }
    fn format_json(&self) -> String;
    fn format_summary(&self) -> String;
}

impl OutputFormatter for RunResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": !self.has_errors(),
            "operation": self.mode,
            "root": self.root,
            "summary": self.totals,
            "passes": self.passes,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();

        if self.mode == RunMode::Batch {
            output.push_str(&pass_table(&self.passes));
            output.push('\n');
        }

        let totals = &self.totals;
        writeln!(
            output,
            "✓ Rewrote {} documents ({} replacements)",
            totals.documents_rewritten, totals.replacements
        )
        .unwrap();
        writeln!(
            output,
            "✓ Moved {} of {} files",
            totals.files_moved, totals.files_scanned
        )
        .unwrap();

        if totals.directories_created > 0 || totals.directories_removed > 0 {
            writeln!(
                output,
                "✓ Created {} and removed {} directories",
                totals.directories_created, totals.directories_removed
            )
            .unwrap();
        }

        if totals.warnings > 0 {
            writeln!(output, "⚠ {} warnings", totals.warnings).unwrap();
        }

        if totals.errors > 0 {
            writeln!(output, "✗ {} files could not be processed", totals.errors).unwrap();
        }

        output
    }
}

fn pass_table(passes: &[PassReport]) -> String {
    use comfy_table::{Cell, Color, Table};

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("#").fg(Color::Cyan),
        Cell::new("Pattern").fg(Color::Cyan),
        Cell::new("Replacement").fg(Color::Cyan),
        Cell::new("Rewritten").fg(Color::Cyan),
        Cell::new("Moved").fg(Color::Cyan),
        Cell::new("Errors").fg(Color::Cyan),
    ]);

    for (index, pass) in passes.iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            pass.pattern.pattern.clone(),
            pass.pattern.replacement.clone(),
            pass.stats.documents_rewritten.to_string(),
            pass.stats.files_moved.to_string(),
            pass.stats.errors.to_string(),
        ]);
    }

    table.to_string()
}

use crate::apply::{apply_pattern, ApplyOptions, PassReport, PassStats};
use crate::error::Result;
use crate::pattern::Pattern;
use crate::report::{Event, EventSink};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub passes: Vec<PassReport>,
}

impl BatchReport {
    pub fn totals(&self) -> PassStats {
        let mut totals = PassStats::default();
        for pass in &self.passes {
            totals.merge(&pass.stats);
        }
        totals
    }
}

/// Apply `patterns` in order, one full pass each.
///
/// A pass starts only after the previous one has settled, so later patterns
/// see the files and contents produced by earlier ones. Patterns that match
/// nothing just produce an empty report, as does every pass after one that
/// removed the emptied root.
pub fn apply_pattern_sequence(
    root: &Path,
    patterns: &[Pattern],
    options: &ApplyOptions,
    sink: &dyn EventSink,
) -> Result<BatchReport> {
    let total = patterns.len();
    let mut passes = Vec::with_capacity(total);

    for (index, pattern) in patterns.iter().enumerate() {
        sink.emit(&Event::PatternStarted {
            index,
            total,
            pattern,
        });
        // An earlier pass may have emptied and removed the root.
        if index > 0 && !root.exists() {
            passes.push(PassReport::new(pattern));
            continue;
        }
        passes.push(apply_pattern(root, pattern, options, sink)?);
    }

    Ok(BatchReport { passes })
}

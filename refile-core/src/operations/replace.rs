use super::{ensure_root, RunOptions};
use crate::apply::apply_pattern;
use crate::output::{RunMode, RunResult};
use crate::pattern::Pattern;
use crate::report::EventSink;
use anyhow::Result;
use std::path::Path;

/// Apply one pattern to the tree below `root`.
pub fn replace_operation(
    root: &Path,
    pattern: &str,
    replacement: &str,
    options: &RunOptions,
    sink: &dyn EventSink,
) -> Result<RunResult> {
    ensure_root(root)?;
    let pattern = Pattern::new(pattern, replacement)?;
    let apply_options = options.apply_options()?;

    let report = options.install(|| Ok(apply_pattern(root, &pattern, &apply_options, sink)?))?;

    Ok(RunResult::new(
        root.to_path_buf(),
        RunMode::Single,
        vec![report],
    ))
}

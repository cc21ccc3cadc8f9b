#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Bulk regex renaming of files and directories, with matching rewrites of
//! the references inside text documents.

pub mod apply;
pub mod batch;
pub mod config;
pub mod error;
pub mod operations;
pub mod output;
pub mod pattern;
pub mod report;
pub mod table;
pub mod template;
pub mod walker;

pub use apply::{apply_pattern, ApplyOptions, PassError, PassReport, PassStats, RenameOutcome};
pub use batch::{apply_pattern_sequence, BatchReport};
pub use config::{Config, DefaultsConfig};
pub use error::RefileError;
pub use operations::{batch_operation, replace_operation, RunOptions};
pub use output::{OutputFormat, OutputFormatter, RunMode, RunResult};
pub use pattern::{Pattern, PatternSource};
pub use report::{ConsoleSink, Event, EventSink, MemorySink, NullSink};
pub use table::{compile_table, load_table, parse_table};
pub use template::Template;
pub use walker::{walk, walk_with, FileEntry, WalkOptions};

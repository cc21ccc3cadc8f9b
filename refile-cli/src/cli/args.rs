use clap::Parser;
use std::path::PathBuf;

use super::types::OutputFormat;

/// Rename files across a directory tree by regular expression and rewrite
/// the documents that reference them
#[derive(Parser, Debug)]
#[command(name = "refile")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Examples:
  refile ./site '(ITEM)_G(0\\d{2})' '$1_G1$2'
  refile ./site renames.csv")]
pub struct Cli {
    /// Directory whose contents are renamed; it is removed if a move leaves it empty
    pub root: PathBuf,

    /// Regular expression to match, or a mapping table when no replacement is given
    #[arg(value_name = "PATTERN|TABLE")]
    pub pattern_or_table: String,

    /// Replacement template ($1, $<name>, $&, $$ ...)
    pub replacement: Option<String>,

    /// Read settings from this file instead of .refile/config.toml
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Extensions whose content is rewritten (defaults to html)
    #[arg(long = "ext", value_name = "EXT", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Exclude glob patterns, relative to the root
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Column delimiter of the mapping table
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Worker threads per pass (0 = one per CPU)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Append a timestamped record of every change to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Output format for machine consumption
    #[arg(long, value_enum, default_value = "summary")]
    pub output: OutputFormat,

    /// Only report warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Keep the root directory even when every file moves out of it
    #[arg(long)]
    pub keep_root: bool,

    /// Exit with status 3 if any file could not be processed
    #[arg(long)]
    pub strict: bool,
}

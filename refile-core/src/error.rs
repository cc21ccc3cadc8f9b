use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures the engine reports for a single file or subtree.
///
/// None of these abort a pass on their own; the walker and the applier route
/// them to the active [`EventSink`](crate::report::EventSink) and keep going.
/// Only a `ListDir` on the pass root is returned to the caller.
#[derive(Debug, Error)]
pub enum RefileError {
    #[error("failed to list directory {}: {source}", .path.display())]
    ListDir { path: PathBuf, source: io::Error },

    #[error("failed to inspect {}: {source}", .path.display())]
    Stat { path: PathBuf, source: io::Error },

    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to move {} -> {}: {source}", .from.display(), .to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("failed to remove empty directory {}: {source}", .path.display())]
    RemoveDir { path: PathBuf, source: io::Error },

    #[error("path is not valid UTF-8: {}", .path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("renaming {} produced an empty file name", .path.display())]
    EmptyName { path: PathBuf },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

impl RefileError {
    /// Path the failure is about, if there is one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::ListDir { path, .. }
            | Self::Stat { path, .. }
            | Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::CreateDir { path, .. }
            | Self::RemoveDir { path, .. }
            | Self::NonUtf8Path { path }
            | Self::EmptyName { path } => Some(path),
            Self::Move { from, .. } => Some(from),
            Self::InvalidPattern { .. } => None,
        }
    }

    /// Whether the failure is tolerated housekeeping rather than a failed step.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::RemoveDir { .. })
    }
}

pub type Result<T, E = RefileError> = std::result::Result<T, E>;

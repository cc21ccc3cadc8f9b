//! High-level operations that correspond to CLI invocations
//!
//! These wrap the engine with root validation, mapping-table loading and
//! thread pool setup, leaving argument parsing and output to the CLI.

pub mod batch;
pub mod replace;

pub use batch::batch_operation;
pub use replace::replace_operation;

use crate::apply::ApplyOptions;
use crate::walker::WalkOptions;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Options shared by every operation
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Extensions (without the dot) whose content is rewritten
    pub text_extensions: Vec<String>,
    /// Glob patterns, relative to the root, that are never visited
    pub excludes: Vec<String>,
    /// Column delimiter for mapping tables
    pub delimiter: u8,
    /// Worker threads (0 = rayon default)
    pub threads: usize,
    /// Never remove the root, even when a move leaves it empty
    pub keep_root: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            text_extensions: vec!["html".to_string()],
            excludes: Vec::new(),
            delimiter: b',',
            threads: 0,
            keep_root: false,
        }
    }
}

impl RunOptions {
    pub(crate) fn apply_options(&self) -> Result<ApplyOptions> {
        Ok(ApplyOptions {
            text_extensions: self.text_extensions.clone(),
            walk: WalkOptions::with_excludes(&self.excludes)?,
            keep_root: self.keep_root,
        })
    }

    /// Run `op` on a pool sized by `threads`.
    pub(crate) fn install<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send,
        T: Send,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .context("Failed to start worker threads")?;
        pool.install(op)
    }
}

pub(crate) fn ensure_root(root: &Path) -> Result<()> {
    if !root.exists() {
        bail!("Root directory does not exist: {}", root.display());
    }
    if !root.is_dir() {
        bail!("Root is not a directory: {}", root.display());
    }
    Ok(())
}

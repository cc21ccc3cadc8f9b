use crate::error::{RefileError, Result};
use crate::pattern::{Pattern, PatternSource};
use crate::report::{Event, EventSink};
use crate::walker::{self, FileEntry, WalkOptions};
use content_inspector::ContentType;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;

/// Options for a single rename/rewrite pass
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Extensions (without the dot) whose content is rewritten
    pub text_extensions: Vec<String>,
    /// Which parts of the tree the walk visits
    pub walk: WalkOptions,
    /// Never remove the pass root, even when a move leaves it empty
    pub keep_root: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            text_extensions: vec!["html".to_string()],
            walk: WalkOptions::default(),
            keep_root: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassStats {
    pub files_scanned: usize,
    pub documents_rewritten: usize,
    pub replacements: usize,
    pub files_moved: usize,
    pub directories_created: usize,
    pub directories_removed: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl PassStats {
    pub fn merge(&mut self, other: &Self) {
        self.files_scanned += other.files_scanned;
        self.documents_rewritten += other.documents_rewritten;
        self.replacements += other.replacements;
        self.files_moved += other.files_moved;
        self.directories_created += other.directories_created;
        self.directories_removed += other.directories_removed;
        self.errors += other.errors;
        self.warnings += other.warnings;
    }
}

/// A file that was moved because its path matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOutcome {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// A per-file failure, kept for the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub message: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub warning: bool,
}

impl From<&RefileError> for PassError {
    fn from(err: &RefileError) -> Self {
        Self {
            path: err.path().map(Path::to_path_buf),
            message: err.to_string(),
            warning: err.is_warning(),
        }
    }
}

/// Everything one pass did, sorted by path once the pass has settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassReport {
    pub pattern: PatternSource,
    pub stats: PassStats,
    pub rewritten: Vec<PathBuf>,
    pub renames: Vec<RenameOutcome>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<PassError>,
}

impl PassReport {
    pub(crate) fn new(pattern: &Pattern) -> Self {
        Self {
            pattern: pattern.source(),
            stats: PassStats::default(),
            rewritten: Vec::new(),
            renames: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Apply one pattern to every file below `root`.
///
/// For each file the content rewrite (text documents only) runs first, then
/// the path rename, both against the path the walk discovered. A failure in
/// either step is reported to `sink` and recorded without stopping the pass.
/// Only a failure to list `root` itself is returned as an error.
pub fn apply_pattern(
    root: &Path,
    pattern: &Pattern,
    options: &ApplyOptions,
    sink: &dyn EventSink,
) -> Result<PassReport> {
    let pass = Pass {
        root,
        pattern,
        options,
        sink,
        report: Mutex::new(PassReport::new(pattern)),
    };

    walker::walk_with(
        root,
        &options.walk,
        |entry| pass.process(&entry),
        |err| pass.fail(&err),
    )?;

    let mut report = pass
        .report
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    report.rewritten.sort();
    report.renames.sort_by(|a, b| a.from.cmp(&b.from));
    Ok(report)
}

struct Pass<'a> {
    root: &'a Path,
    pattern: &'a Pattern,
    options: &'a ApplyOptions,
    sink: &'a dyn EventSink,
    report: Mutex<PassReport>,
}

impl Pass<'_> {
    fn process(&self, entry: &FileEntry) {
        self.record(|report| report.stats.files_scanned += 1);

        if !entry.is_symlink && entry.has_extension(&self.options.text_extensions) {
            if let Err(err) = self.rewrite_content(entry) {
                self.fail(&err);
            }
        }

        if let Err(err) = self.rename_path(entry) {
            self.fail(&err);
        }
    }

    fn rewrite_content(&self, entry: &FileEntry) -> Result<()> {
        let path = &entry.path;
        let bytes = fs::read(path).map_err(|source| RefileError::Read {
            path: path.clone(),
            source,
        })?;

        if is_binary(&bytes) {
            return Ok(());
        }

        let content = String::from_utf8(bytes).map_err(|e| RefileError::Read {
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;

        let (rewritten, replacements) = self.pattern.replace_all_counted(&content);
        let Cow::Owned(rewritten) = rewritten else {
            return Ok(());
        };
        if rewritten == content {
            return Ok(());
        }

        write_atomically(path, rewritten.as_bytes())?;

        self.sink.emit(&Event::ContentRewritten { path, replacements });
        self.record(|report| {
            report.stats.documents_rewritten += 1;
            report.stats.replacements += replacements;
            report.rewritten.push(path.clone());
        });
        Ok(())
    }

    fn rename_path(&self, entry: &FileEntry) -> Result<()> {
        let from = &entry.path;
        let full = from.to_str().ok_or_else(|| RefileError::NonUtf8Path {
            path: from.clone(),
        })?;

        if !self.pattern.is_match(full) {
            return Ok(());
        }

        let old_dir = from.parent().unwrap_or_else(|| Path::new(""));
        let old_dir_str = old_dir.to_str().ok_or_else(|| RefileError::NonUtf8Path {
            path: from.clone(),
        })?;

        let new_dir = PathBuf::from(self.pattern.replace_all(old_dir_str).as_ref());
        let new_name = self.pattern.replace_all(&entry.name);
        if new_name.is_empty() {
            return Err(RefileError::EmptyName { path: from.clone() });
        }

        let to = new_dir.join(new_name.as_ref());
        if &to == from {
            return Ok(());
        }

        if let Some(parent) = to.parent() {
            self.ensure_dir(parent)?;
        }

        if fs::symlink_metadata(&to).is_ok() {
            self.sink.emit(&Event::Overwriting { path: &to });
            self.record(|report| report.stats.warnings += 1);
        }

        fs::rename(from, &to).map_err(|source| RefileError::Move {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;

        self.sink.emit(&Event::Moved { from, to: &to });
        self.record(|report| {
            report.stats.files_moved += 1;
            report.renames.push(RenameOutcome {
                from: from.clone(),
                to: to.clone(),
            });
        });

        self.prune_empty_dirs(old_dir);
        Ok(())
    }

    /// Create `dir` if it is missing. Losing a creation race to another task
    /// counts as success.
    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if dir.as_os_str().is_empty() || dir.is_dir() {
            return Ok(());
        }

        let create_error = |source| RefileError::CreateDir {
            path: dir.to_path_buf(),
            source,
        };

        if let Some(parent) = dir.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(create_error)?;
        }

        match fs::create_dir(dir) {
            Ok(()) => {
                self.sink.emit(&Event::DirectoryCreated { path: dir });
                self.record(|report| report.stats.directories_created += 1);
                Ok(())
            },
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(create_error(e)),
        }
    }

    /// Remove `start` if the move left it empty, then keep climbing while
    /// parents become empty too. The climb stops below the pass root; the
    /// root itself goes only when it is `start` and `keep_root` is off.
    fn prune_empty_dirs(&self, start: &Path) {
        if start == self.root && self.options.keep_root {
            return;
        }
        let mut dir = start;

        while dir.starts_with(self.root) {
            if dir == self.root && dir != start {
                return;
            }

            match is_empty_dir(dir) {
                Ok(true) => {},
                Ok(false) => return,
                // Already gone, e.g. removed by a sibling's cleanup.
                Err(e) if e.kind() == io::ErrorKind::NotFound => return,
                Err(source) => {
                    self.fail(&RefileError::RemoveDir {
                        path: dir.to_path_buf(),
                        source,
                    });
                    return;
                },
            }

            match fs::remove_dir(dir) {
                Ok(()) => {
                    self.sink.emit(&Event::DirectoryRemoved { path: dir });
                    self.record(|report| report.stats.directories_removed += 1);
                },
                Err(e) if e.kind() == io::ErrorKind::NotFound => return,
                Err(source) => {
                    self.fail(&RefileError::RemoveDir {
                        path: dir.to_path_buf(),
                        source,
                    });
                    return;
                },
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => return,
            }
        }
    }

    fn fail(&self, err: &RefileError) {
        self.sink.emit(&Event::Failed(err));
        let error = PassError::from(err);
        self.record(|report| {
            if error.warning {
                report.stats.warnings += 1;
            } else {
                report.stats.errors += 1;
            }
            report.errors.push(error);
        });
    }

    fn record(&self, update: impl FnOnce(&mut PassReport)) {
        let mut report = self.report.lock().unwrap_or_else(PoisonError::into_inner);
        update(&mut report);
    }
}

fn is_binary(content: &[u8]) -> bool {
    matches!(content_inspector::inspect(content), ContentType::BINARY)
}

fn is_empty_dir(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}

/// Replace `path` with `contents` so readers only ever see the old or the
/// new file: write a sibling temp file, copy permissions, fsync, rename.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let write_error = |source| RefileError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(path).map_err(write_error)?.permissions();

    let mut temp_file = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp_file.write_all(contents).map_err(write_error)?;
    temp_file.as_file().sync_all().map_err(write_error)?;
    fs::set_permissions(temp_file.path(), permissions).map_err(write_error)?;

    temp_file
        .persist(path)
        .map_err(|e| write_error(e.error))?;

    Ok(())
}

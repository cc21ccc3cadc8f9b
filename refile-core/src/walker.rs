use crate::error::{RefileError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::Scope;
use std::fs;
use std::path::{Path, PathBuf};

/// A non-directory entry discovered during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub extension: Option<String>,
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl FileEntry {
    fn new(path: PathBuf, is_symlink: bool) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned());

        Self {
            path,
            name,
            extension,
            is_dir: false,
            is_symlink,
        }
    }

    /// Exact, case-sensitive extension check; `INDEX.HTML` is not `html`.
    pub fn has_extension(&self, candidates: &[String]) -> bool {
        self.extension
            .as_deref()
            .is_some_and(|ext| candidates.iter().any(|c| c.trim_start_matches('.') == ext))
    }
}

#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Paths relative to the root that are skipped; excluded directories are
    /// not descended into.
    pub excludes: Option<GlobSet>,
}

impl WalkOptions {
    pub fn with_excludes(patterns: &[String]) -> anyhow::Result<Self> {
        Ok(Self {
            excludes: build_globset(patterns)?,
        })
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let Some(ref excludes) = self.excludes else {
            return false;
        };
        let relative = path.strip_prefix(root).unwrap_or(path);
        excludes.is_match(relative)
    }
}

/// Build a glob set for exclusions. A bare name without wildcards or an
/// extension (`node_modules`, `build/`) also matches everything below it.
pub fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let trimmed = pattern.trim_end_matches('/');
        builder.add(Glob::new(trimmed)?);

        if !trimmed.contains('/') {
            builder.add(Glob::new(&format!("**/{}", trimmed))?);
        }

        if pattern.ends_with('/')
            || (!pattern.contains('*') && !pattern.contains('?') && !pattern.contains('.'))
        {
            builder.add(Glob::new(&format!("{}/**", trimmed))?);
            if !trimmed.contains('/') {
                builder.add(Glob::new(&format!("**/{}/**", trimmed))?);
            }
        }
    }
    Ok(Some(builder.build()?))
}

/// Walk every file below `root`, calling `on_file` once per file.
///
/// Siblings are dispatched as independent tasks on the current rayon pool and
/// may complete in any order. The call returns once every task has settled.
/// A failure listing a subdirectory goes to `on_error` and only loses that
/// subtree; failing to list `root` itself is returned.
pub fn walk<F, E>(root: &Path, on_file: F, on_error: E) -> Result<()>
where
    F: Fn(FileEntry) + Sync,
    E: Fn(RefileError) + Sync,
{
    walk_with(root, &WalkOptions::default(), on_file, on_error)
}

pub fn walk_with<F, E>(root: &Path, options: &WalkOptions, on_file: F, on_error: E) -> Result<()>
where
    F: Fn(FileEntry) + Sync,
    E: Fn(RefileError) + Sync,
{
    walk_listed_by(root, options, &list_dir, on_file, on_error)
}

type Lister<'a> = &'a (dyn Fn(&Path) -> Result<Vec<PathBuf>> + Sync);

fn walk_listed_by<F, E>(
    root: &Path,
    options: &WalkOptions,
    list: Lister<'_>,
    on_file: F,
    on_error: E,
) -> Result<()>
where
    F: Fn(FileEntry) + Sync,
    E: Fn(RefileError) + Sync,
{
    let children = list(root)?;
    let walk = Walk {
        root,
        options,
        list,
        on_file: &on_file,
        on_error: &on_error,
    };

    rayon::scope(|scope| {
        for child in children {
            walk.dispatch(scope, child);
        }
    });

    Ok(())
}

struct Walk<'a, F, E> {
    root: &'a Path,
    options: &'a WalkOptions,
    list: Lister<'a>,
    on_file: &'a F,
    on_error: &'a E,
}

impl<F, E> Clone for Walk<'_, F, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F, E> Copy for Walk<'_, F, E> {}

impl<'a, F, E> Walk<'a, F, E>
where
    F: Fn(FileEntry) + Sync,
    E: Fn(RefileError) + Sync,
{
    fn dispatch(self, scope: &Scope<'a>, path: PathBuf) {
        if self.options.is_excluded(self.root, &path) {
            return;
        }

        scope.spawn(move |scope| {
            let metadata = match fs::symlink_metadata(&path) {
                Ok(metadata) => metadata,
                Err(source) => {
                    (self.on_error)(RefileError::Stat { path, source });
                    return;
                },
            };

            if metadata.is_dir() {
                match (self.list)(&path) {
                    Ok(children) => {
                        for child in children {
                            self.dispatch(scope, child);
                        }
                    },
                    Err(err) => (self.on_error)(err),
                }
            } else {
                (self.on_file)(FileEntry::new(path, metadata.file_type().is_symlink()));
            }
        });
    }
}

/// Read a whole directory listing before anything below it is touched.
fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let list_error = |source| RefileError::ListDir {
        path: dir.to_path_buf(),
        source,
    };

    fs::read_dir(dir)
        .map_err(list_error)?
        .map(|entry| entry.map(|e| e.path()).map_err(list_error))
        .collect()
}

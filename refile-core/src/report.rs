use crate::error::RefileError;
use crate::pattern::Pattern;
use anyhow::{Context, Result};
use nu_ansi_term::Color;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Progress notifications raised while a pass runs.
///
/// Events from sibling files arrive in whatever order their work completes.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    PatternStarted {
        index: usize,
        total: usize,
        pattern: &'a Pattern,
    },
    ContentRewritten {
        path: &'a Path,
        replacements: usize,
    },
    DirectoryCreated {
        path: &'a Path,
    },
    Overwriting {
        path: &'a Path,
    },
    Moved {
        from: &'a Path,
        to: &'a Path,
    },
    DirectoryRemoved {
        path: &'a Path,
    },
    Failed(&'a RefileError),
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PatternStarted { pattern, .. } => write!(f, "{}", pattern),
            Self::ContentRewritten { path, .. } => write!(f, "replaced in {}", path.display()),
            Self::DirectoryCreated { path } => write!(f, "created directory {}", path.display()),
            Self::Overwriting { path } => write!(f, "overwriting existing {}", path.display()),
            Self::Moved { from, to } => write!(f, "{} -> {}", from.display(), to.display()),
            Self::DirectoryRemoved { path } => {
                write!(f, "removed empty directory {}", path.display())
            },
            Self::Failed(err) => write!(f, "{}", err),
        }
    }
}

/// Receiver for progress events. Sinks are shared by every task in a pass.
pub trait EventSink: Sync {
    fn emit(&self, event: &Event<'_>);
}

impl<T: EventSink + ?Sized> EventSink for &T {
    fn emit(&self, event: &Event<'_>) {
        (**self).emit(event);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &Event<'_>) {}
}

/// Prints progress to stdout and problems to stderr as they happen, and
/// optionally appends every event to a timestamped log file.
#[derive(Debug)]
pub struct ConsoleSink {
    use_color: bool,
    quiet: bool,
    log_file: Option<Mutex<File>>,
}

impl ConsoleSink {
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            use_color,
            quiet,
            log_file: None,
        }
    }

    pub fn with_log_file(mut self, path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        self.log_file = Some(Mutex::new(file));
        Ok(self)
    }

    fn log(&self, event: &Event<'_>) {
        let Some(ref log_file) = self.log_file else {
            return;
        };
        let mut file = log_file.lock().unwrap_or_else(PoisonError::into_inner);
        let level = match event {
            Event::Failed(err) if err.is_warning() => "WARN",
            Event::Overwriting { .. } => "WARN",
            Event::Failed(_) => "ERROR",
            _ => "INFO",
        };
        // A broken log file must not interrupt the pass.
        let _ = writeln!(
            file,
            "[{}] {} {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            level,
            event
        );
    }

    fn paint(&self, color: Color, text: &str) -> String {
        if self.use_color {
            color.paint(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: &Event<'_>) {
        self.log(event);

        match event {
            Event::Failed(err) => {
                let label = if err.is_warning() {
                    self.paint(Color::Yellow, "Warning:")
                } else {
                    self.paint(Color::Red, "Error:")
                };
                eprintln!("{} {}", label, err);
            },
            Event::Overwriting { path } => {
                eprintln!(
                    "{} overwriting existing {}",
                    self.paint(Color::Yellow, "Warning:"),
                    path.display()
                );
            },
            _ if self.quiet => {},
            Event::PatternStarted { .. } => {
                println!("{}", self.paint(Color::Cyan, &event.to_string()));
            },
            Event::ContentRewritten { .. } => println!("{}", event),
            Event::Moved { from, to } => {
                println!(
                    "{} -> {}",
                    from.display(),
                    self.paint(Color::Green, &to.display().to_string())
                );
            },
            Event::DirectoryCreated { .. } | Event::DirectoryRemoved { .. } => {},
        }
    }
}

/// Keeps a plain-text copy of every event. Handy for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &Event<'_>) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.to_string());
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Extensions whose content is rewritten, without the leading dot
    #[serde(default = "default_text_extensions")]
    pub text_extensions: Vec<String>,

    /// Glob patterns (relative to the root) that are never visited
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Column delimiter for mapping tables
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Worker threads per pass (0 = one per CPU)
    #[serde(default)]
    pub threads: usize,

    /// Never remove the root directory, even when a move leaves it empty
    #[serde(default)]
    pub keep_root: bool,

    /// Exit non-zero when any file failed during a run
    #[serde(default)]
    pub strict: bool,

    /// Whether to use color output by default (None = auto-detect)
    #[serde(default)]
    pub use_color: Option<bool>,

    /// Append a timestamped record of every event to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            text_extensions: default_text_extensions(),
            exclude: Vec::new(),
            delimiter: default_delimiter(),
            threads: 0,
            keep_root: false,
            strict: false,
            use_color: None,
            log_file: None,
        }
    }
}

fn default_text_extensions() -> Vec<String> {
    vec!["html".to_string()]
}

fn default_delimiter() -> char {
    ','
}

impl Config {
    /// Load config from .refile/config.toml if it exists
    pub fn load() -> Result<Self> {
        if let Ok(cwd) = std::env::current_dir() {
            let config_path = cwd.join(".refile").join("config.toml");
            if config_path.exists() {
                return Self::load_from_path(&config_path);
            }
        }

        Ok(Self::default())
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

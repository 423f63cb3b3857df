//! Configuration loading and parsing.
//!
//! Parses `tandem.toml` (or an override path provided by the binary). Only the
//! `[history]` table is understood today:
//!
//! ```toml
//! [history]
//! group_edits = true   # fold adjacent typing / deleting into one undo step
//! max_depth = 500      # optional cap on the undo stack
//! ```
//!
//! Unknown fields are ignored so older binaries accept newer files. A missing
//! file yields defaults silently; a file that fails to parse yields defaults
//! and a warning on the `config` target.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, io, path::Path, path::PathBuf};
use tracing::{info, warn};

const FILE_NAME: &str = "tandem.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_group_edits")]
    pub group_edits: bool,
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            group_edits: Self::default_group_edits(),
            max_depth: None,
        }
    }
}

impl HistoryConfig {
    const fn default_group_edits() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub path: Option<PathBuf>,
    pub file: ConfigFile, // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("tandem").join(FILE_NAME);
    }
    PathBuf::from(FILE_NAME)
}

/// Load configuration from `path` (or the discovered location). Only I/O
/// failures other than "not found" are errors.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(target: "config", path = %path.display(), "config_missing_using_defaults");
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading config file {}", path.display()));
        }
    };
    Ok(parse(&path, content))
}

fn parse(path: &Path, content: String) -> Config {
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(
                target: "config",
                path = %path.display(),
                group_edits = file.history.group_edits,
                max_depth = ?file.history.max_depth,
                "config_loaded"
            );
            Config {
                raw: Some(content),
                path: Some(path.to_path_buf()),
                file,
            }
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Config::default()
        }
    }
}

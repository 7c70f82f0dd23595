//! Engine configuration.
//!
//! Precedence: CLI flags > environment > config file > defaults. The environment is
//! read through a lookup closure so callers (and tests) decide where values come from.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dates::DEFAULT_DATE_FORMATS;
use crate::errors::QueryError;

pub const ENV_CONFIG: &str = "ARRAYQUERY_CONFIG";
pub const ENV_DATE_FORMATS: &str = "ARRAYQUERY_DATE_FORMATS";
pub const ENV_LOG_LEVEL: &str = "ARRAYQUERY_LOG_LEVEL";

/// File name looked up in the user config dir and the working directory.
pub const CONFIG_FILE_NAME: &str = "arrayquery.toml";

// Date formats in the environment are separated by ';' (formats may contain ',').
const ENV_LIST_SEPARATOR: char = ';';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Accepted date formats (`chrono` patterns or `iso8601`), tried in order.
    pub date_formats: Vec<String>,
    /// error|warn|info|debug|trace
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|s| (*s).to_string()).collect(),
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// # Errors
    /// `QueryError::Config` on malformed TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, QueryError> {
        toml::from_str(text).map_err(|e| QueryError::Config(e.to_string()))
    }

    /// # Errors
    /// `QueryError::Io` if the file cannot be read, `QueryError::Config` if it does not parse.
    pub fn from_file(path: &Path) -> Result<Self, QueryError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| QueryError::Config(format!("{}: {e}", path.display())))
    }

    /// Overlay environment values found through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(ENV_DATE_FORMATS) {
            let formats: Vec<String> = raw
                .split(ENV_LIST_SEPARATOR)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if !formats.is_empty() {
                self.date_formats = formats;
            }
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|s| !s.trim().is_empty()) {
            self.log_level = level.trim().to_ascii_lowercase();
        }
    }

    /// Candidate config files, most specific first.
    #[must_use]
    pub fn search_paths(explicit: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(p) = explicit {
            paths.push(p.to_path_buf());
        }
        if let Some(p) = lookup(ENV_CONFIG) {
            paths.push(PathBuf::from(p));
        }
        if let Some(dir) = dirs_next::config_dir() {
            paths.push(dir.join(CONFIG_FILE_NAME));
        }
        paths.push(PathBuf::from(CONFIG_FILE_NAME));
        paths
    }

    /// Resolve the effective configuration: first existing file (an explicit path must
    /// exist), then environment overrides.
    ///
    /// # Errors
    /// Missing explicit file, unreadable or malformed config.
    pub fn load(explicit: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, QueryError> {
        if let Some(p) = explicit
            && !p.exists()
        {
            return Err(QueryError::Config(format!("config file not found: {}", p.display())));
        }
        let mut cfg = match Self::search_paths(explicit, &lookup).into_iter().find(|p| p.is_file()) {
            Some(path) => {
                log::debug!("loading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        cfg.apply_env(&lookup);
        Ok(cfg)
    }
}

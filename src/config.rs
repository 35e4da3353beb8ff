//! Dashboard configuration.
//! Every key is optional in the JSON file; missing keys take the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const WIDE_DEFAULT: &str = "nextfest_50_games_languages_wide.csv";
pub const LONG_DEFAULT: &str = "nextfest_50_games_languages_long.csv";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub wide_path: PathBuf,
    pub long_path: PathBuf,
    /// Load the default files when present. Disabled means uploads only.
    pub auto_load: bool,
    /// Length of the "most supported languages" table.
    pub top_n: usize,
    /// Languages shown next to the average in the KPI header.
    pub headline_languages: usize,
    /// Languages listed for the max-language game.
    pub headline_language_limit: usize,
    pub histogram_bins: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            wide_path: PathBuf::from(WIDE_DEFAULT),
            long_path: PathBuf::from(LONG_DEFAULT),
            auto_load: true,
            top_n: 5,
            headline_languages: 3,
            headline_language_limit: 15,
            histogram_bins: 10,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

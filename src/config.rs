//! Configuration file
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration. Command-line flags are layered on top in `main`.
//!
//! ```toml
//! database = "postmood.db"
//!
//! [source]
//! archive_dir = "timeline-archive"
//! count = 20
//!
//! [analysis]
//! on_oracle_error = "abort"    # or "neutral"
//! lexicon = "extra-words.json"
//!
//! [report]
//! report_dir = "postmood-reports"
//! table_name = "posts_table.csv"
//! chart_name = "opinion_chart.svg"
//! on_conflict = "rename"       # "overwrite" | "rename" | "abort"
//! open_chart = true
//! ```

use crate::analyzer::OracleFailurePolicy;
use crate::report::ConflictMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file to store each run in. No storage when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    pub source: SourceConfig,
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Root of the exported timeline archive
    pub archive_dir: PathBuf,
    /// How many of the newest posts to analyze
    pub count: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            archive_dir: PathBuf::from("timeline-archive"),
            count: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub on_oracle_error: OracleFailurePolicy,
    /// Extra word scores merged over the built-in lexicon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexicon: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub report_dir: PathBuf,
    pub table_name: String,
    pub chart_name: String,
    pub on_conflict: ConflictMode,
    pub open_chart: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_dir: PathBuf::from("postmood-reports"),
            table_name: "posts_table.csv".to_string(),
            chart_name: "opinion_chart.svg".to_string(),
            on_conflict: ConflictMode::Rename,
            open_chart: true,
        }
    }
}

impl ReportConfig {
    pub fn table_path(&self) -> PathBuf {
        self.report_dir.join(&self.table_name)
    }

    pub fn chart_path(&self) -> PathBuf {
        self.report_dir.join(&self.chart_name)
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        fs::write(path, self.to_toml()?).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

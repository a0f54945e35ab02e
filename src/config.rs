//! Dashboard configuration.
//!
//! [`DashboardConfig`] bundles the options of every pipeline stage. Use [`Default`] for the
//! standard behavior, or load the serializable subset from JSON:
//!
//! ```rust
//! use upload_insights::config::DashboardConfig;
//!
//! # fn main() -> Result<(), upload_insights::ConfigError> {
//! let config = DashboardConfig::from_json_str(
//!     r#"{ "excluded_columns": ["ID", "RowNum"], "cache_tables": false }"#,
//! )?;
//! assert!(config.stats.is_excluded("RowNum"));
//! assert!(!config.cache_tables);
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::ingestion::{default_matchers, DocumentLimits, FormatMatcher, IngestionOptions};
use crate::processing::normalize::DEFAULT_SYNTHETIC_PATTERN;
use crate::processing::{StatsOptions, SyntheticColumnPattern};

/// Options for the whole upload → table → stats/chart pipeline.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub ingestion: IngestionOptions,
    pub synthetic_columns: SyntheticColumnPattern,
    pub stats: StatsOptions,
    /// Reuse the last normalized table while the same upload stays selected.
    pub cache_tables: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            ingestion: IngestionOptions::default(),
            synthetic_columns: SyntheticColumnPattern::default(),
            stats: StatsOptions::default(),
            cache_tables: true,
        }
    }
}

/// On-disk shape of [`DashboardConfig`]; every key is optional.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    matchers: Vec<FormatMatcher>,
    document_limits: DocumentLimits,
    synthetic_column_pattern: String,
    excluded_columns: Vec<String>,
    cache_tables: bool,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            matchers: default_matchers(),
            document_limits: DocumentLimits::default(),
            synthetic_column_pattern: DEFAULT_SYNTHETIC_PATTERN.to_string(),
            excluded_columns: StatsOptions::default().excluded_columns,
            cache_tables: true,
        }
    }
}

impl DashboardConfig {
    /// Parse a JSON configuration. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(json)?;
        Ok(Self {
            ingestion: IngestionOptions {
                matchers: file.matchers,
                document_limits: file.document_limits,
                ..Default::default()
            },
            synthetic_columns: SyntheticColumnPattern::new(&file.synthetic_column_pattern)?,
            stats: StatsOptions {
                excluded_columns: file.excluded_columns,
            },
            cache_tables: file.cache_tables,
        })
    }

    /// Read and parse a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

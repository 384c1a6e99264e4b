//! Configuration.
//!
//! [`SplitOptions`] drives the pipeline and is passed in explicitly.
//! [`AppConfig`] holds CLI defaults read from the environment (and `.env`);
//! the library itself never reads environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::emit::{ColumnFormatSpec, DEFAULT_EXTENSION};

/// Default prefix of the dated output directory.
pub const DEFAULT_DIR_PREFIX: &str = "Orders_";

/// Environment variable overriding [`DEFAULT_DIR_PREFIX`].
pub const ENV_DIR_PREFIX: &str = "ORDERS_DIR_PREFIX";

/// Environment variable setting the parent of the dated output directory.
pub const ENV_OUTPUT_ROOT: &str = "ORDERS_OUTPUT_ROOT";

/// Options for the splitting pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SplitOptions {
    /// CSV delimiter (auto-detect if `None`)
    pub delimiter: Option<char>,

    /// Artifact file extension
    pub extension: String,

    /// Column widths and number formats
    pub formats: ColumnFormatSpec,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            extension: DEFAULT_EXTENSION.to_string(),
            formats: ColumnFormatSpec::order_sheet(),
        }
    }
}

/// CLI defaults from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub dir_prefix: String,
    /// Parent of the dated directory; the CSV's own directory when `None`
    pub output_root: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dir_prefix: DEFAULT_DIR_PREFIX.to_string(),
            output_root: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment, loading `.env` first.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            dir_prefix: get(ENV_DIR_PREFIX).unwrap_or_else(|| DEFAULT_DIR_PREFIX.to_string()),
            output_root: get(ENV_OUTPUT_ROOT).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.dir_prefix, "Orders_");
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> =
            [(ENV_DIR_PREFIX, "Sales_"), (ENV_OUTPUT_ROOT, "/srv/exports")].into();
        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.dir_prefix, "Sales_");
        assert_eq!(config.output_root, Some(PathBuf::from("/srv/exports")));
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = AppConfig::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_split_options_partial_json() {
        let options: SplitOptions = serde_json::from_str(r#"{"delimiter":";"}"#).unwrap();
        assert_eq!(options.delimiter, Some(';'));
        assert_eq!(options.extension, "xlsx");
        assert_eq!(options.formats, ColumnFormatSpec::order_sheet());
    }
}

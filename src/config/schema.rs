use serde::{Deserialize, Serialize};

use crate::admin::StatusFilter;

pub const DEFAULT_TOP: usize = 10;
pub const DEFAULT_EXPORT_FILE: &str = "jtbd-hierarchy.json";

/// Contents of `config.yaml`. Every field is optional.
///
/// Example YAML:
/// ```yaml
/// default_round: "2025-1"
/// top: 15
/// status_filter: all
/// export_file: hierarchy.json
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Round used when a command takes `--round` and none is given (default: latest)
    #[serde(default)]
    pub default_round: Option<String>,

    /// Number of outcomes shown by `evolution` (default: 10)
    #[serde(default)]
    pub top: Option<usize>,

    /// Status filter for `hierarchy` (default: active)
    #[serde(default)]
    pub status_filter: Option<StatusFilter>,

    /// File written by `export` (default: jtbd-hierarchy.json)
    #[serde(default)]
    pub export_file: Option<String>,
}

impl Config {
    pub fn top(&self) -> usize {
        self.top.unwrap_or(DEFAULT_TOP)
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter.unwrap_or_default()
    }

    pub fn export_file(&self) -> &str {
        self.export_file.as_deref().unwrap_or(DEFAULT_EXPORT_FILE)
    }
}

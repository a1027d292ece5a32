//! Validator configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fields every run starts with: the run identifier and the incoming request.
pub const DEFAULT_INITIAL_FIELDS: [&str; 2] = ["run_id", "request"];

/// Suggested to dead-end nodes when no orphaned node could follow them.
pub const DEFAULT_TERMINAL_MARKER: &str = "__end__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Fields available before any node runs, on top of `run_id` and
    /// `request`, which are always seeded.
    pub initial_fields: Vec<String>,
    /// Report duplicate ids and references to unknown nodes.
    pub check_references: bool,
    /// Append `MISSING_OUTPUT_FIELD` and `UNUSED_OUTPUT_FIELD` warnings to
    /// the default pass.
    pub include_output_checks: bool,
    pub terminal_marker: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            initial_fields: DEFAULT_INITIAL_FIELDS.iter().map(|f| f.to_string()).collect(),
            check_references: true,
            include_output_checks: false,
            terminal_marker: DEFAULT_TERMINAL_MARKER.to_string(),
        }
    }
}

impl ValidatorConfig {
    /// Missing keys fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Config)
    }
}

//! Parse phase: JSON → workflow definition + graph construction.

pub mod graph;
pub mod types;

pub use graph::NodeGraph;
pub use types::*;

use crate::error::{Error, Result};

/// Deserialize a workflow JSON string into a `WorkflowDefinition`.
pub fn parse(json: &str) -> Result<WorkflowDefinition> {
    serde_json::from_str::<WorkflowDefinition>(json).map_err(Error::Parse)
}

/// Deserialize from an already decoded JSON value.
pub fn from_value(value: serde_json::Value) -> Result<WorkflowDefinition> {
    serde_json::from_value(value).map_err(Error::Parse)
}

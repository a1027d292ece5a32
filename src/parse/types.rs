//! Workflow definition types.
//!
//! These types are the serde target for the workflow JSON shared with the
//! editor and the server-side validator. Field names are snake_case on the
//! wire; node type tags are kebab-case.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// TOP-LEVEL WORKFLOW
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub id: String,
    pub title: String,
    /// Id of the node execution starts from.
    pub entry_point: String,
    pub nodes: Vec<NodeDefinition>,
    pub edges: Vec<EdgeDefinition>,
    #[serde(default)]
    pub status: WorkflowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_handling: Option<ErrorHandling>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_config: Option<RetryConfig>,
}

impl WorkflowDefinition {
    pub fn node(&self, id: &str) -> Option<&NodeDefinition> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    Draft,
    InvalidDraft,
    Published,
    Archived,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Draft => "draft",
            WorkflowStatus::InvalidDraft => "invalid_draft",
            WorkflowStatus::Published => "published",
            WorkflowStatus::Archived => "archived",
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, WorkflowStatus::Draft | WorkflowStatus::InvalidDraft)
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorHandling {
    Stop,
    Continue,
    ContinueWithError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    #[serde(default)]
    pub backoff_ms: u64,
}

// =============================================================================
// EDGES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl EdgeDefinition {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        EdgeDefinition {
            source: source.into(),
            target: target.into(),
            label: None,
        }
    }
}

// =============================================================================
// NODES
// =============================================================================

/// Node type tag. Unknown tags round-trip as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    LlmAgent,
    PeerAgent,
    Conditional,
    Script,
    #[serde(untagged)]
    Custom(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::LlmAgent => "llm-agent",
            NodeType::PeerAgent => "peer-agent",
            NodeType::Conditional => "conditional",
            NodeType::Script => "script",
            NodeType::Custom(tag) => tag,
        }
    }

    /// Agent and script nodes hand their result to the next step through an
    /// output field and are expected to declare one.
    pub fn requires_output_field(&self) -> bool {
        matches!(
            self,
            NodeType::LlmAgent | NodeType::PeerAgent | NodeType::Script
        )
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration key listing the fields a node consumes.
pub const INPUT_FIELDS_KEY: &str = "input_fields";
/// Configuration key naming the field a node produces.
pub const OUTPUT_FIELD_KEY: &str = "output_field";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl NodeDefinition {
    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        let id = id.into();
        NodeDefinition {
            label: id.clone(),
            id,
            node_type,
            config: Map::new(),
        }
    }

    /// Fields listed under `input_fields`, in declared order. Non-string
    /// entries are ignored.
    pub fn input_fields(&self) -> Vec<&str> {
        match self.config.get(INPUT_FIELDS_KEY) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .filter(|f| !f.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The field this node produces, if it declares a non-empty one.
    pub fn output_field(&self) -> Option<&str> {
        self.config
            .get(OUTPUT_FIELD_KEY)
            .and_then(Value::as_str)
            .filter(|f| !f.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_tags() {
        let t: NodeType = serde_json::from_str("\"llm-agent\"").unwrap();
        assert_eq!(t, NodeType::LlmAgent);
        let t: NodeType = serde_json::from_str("\"webhook\"").unwrap();
        assert_eq!(t, NodeType::Custom("webhook".into()));
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"webhook\"");
    }

    #[test]
    fn config_accessors() {
        let node: NodeDefinition = serde_json::from_value(serde_json::json!({
            "id": "a",
            "type": "script",
            "config": { "input_fields": ["x", 3, "", "y"], "output_field": "z" }
        }))
        .unwrap();
        assert_eq!(node.input_fields(), vec!["x", "y"]);
        assert_eq!(node.output_field(), Some("z"));
        assert_eq!(node.label, "");
    }

    #[test]
    fn blank_output_field_is_absent() {
        let mut node = NodeDefinition::new("a", NodeType::LlmAgent);
        node.config
            .insert(OUTPUT_FIELD_KEY.into(), Value::String("  ".into()));
        assert_eq!(node.output_field(), None);
    }

    #[test]
    fn status_defaults_to_draft() {
        let wf: WorkflowDefinition = serde_json::from_value(serde_json::json!({
            "id": "wf", "title": "t", "entry_point": "a", "nodes": [], "edges": []
        }))
        .unwrap();
        assert_eq!(wf.status, WorkflowStatus::Draft);
        assert!(wf.error_handling.is_none());
    }
}

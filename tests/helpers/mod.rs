use serde_json::{Map, Value, json};
use workflow_validator::parse::*;

// =============================================================================
// Workflow builders
// =============================================================================

/// Workflow with the given entry point, nodes and edges; draft status.
pub fn workflow_with(
    entry_point: &str,
    nodes: Vec<NodeDefinition>,
    edges: Vec<EdgeDefinition>,
) -> WorkflowDefinition {
    WorkflowDefinition {
        id: "test-wf".into(),
        title: "Test Workflow".into(),
        entry_point: entry_point.into(),
        nodes,
        edges,
        status: WorkflowStatus::Draft,
        error_handling: None,
        retry_config: None,
    }
}

/// Conditional nodes with no configuration, wired by `edges`.
pub fn plain_workflow(entry_point: &str, ids: &[&str], edges: &[(&str, &str)]) -> WorkflowDefinition {
    workflow_with(
        entry_point,
        ids.iter().map(|id| conditional(id)).collect(),
        edges.iter().map(|(s, t)| edge(s, t)).collect(),
    )
}

/// `k` conditional nodes n0 → n1 → … → n{k-1} → n0.
pub fn ring(k: usize) -> WorkflowDefinition {
    let ids: Vec<String> = (0..k).map(|i| format!("n{i}")).collect();
    let nodes = ids.iter().map(|id| conditional(id)).collect();
    let edges = (0..k).map(|i| edge(&ids[i], &ids[(i + 1) % k])).collect();
    workflow_with(&ids[0], nodes, edges)
}

// =============================================================================
// Node builders
// =============================================================================

pub fn node(id: &str, node_type: NodeType, config: Value) -> NodeDefinition {
    let mut n = NodeDefinition::new(id, node_type);
    n.config = object(config);
    n
}

pub fn conditional(id: &str) -> NodeDefinition {
    NodeDefinition::new(id, NodeType::Conditional)
}

pub fn agent(id: &str, output_field: &str) -> NodeDefinition {
    node(id, NodeType::LlmAgent, json!({ "output_field": output_field }))
}

pub fn consumer(id: &str, input_fields: &[&str]) -> NodeDefinition {
    node(id, NodeType::Script, json!({ "input_fields": input_fields }))
}

pub fn edge(source: &str, target: &str) -> EdgeDefinition {
    EdgeDefinition::new(source, target)
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => panic!("node config must be an object, got {other}"),
    }
}

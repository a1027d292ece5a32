//! Reference integrity: duplicate node ids, unknown entry point, edges that
//! name undeclared nodes.

use std::collections::HashMap;

use crate::parse::graph::NodeGraph;
use crate::parse::types::WorkflowDefinition;
use crate::validate::diagnostic::{Diagnostic, DiagnosticContext};

/// Run all reference checks. Returns nothing for well-formed input.
pub fn validate_references(workflow: &WorkflowDefinition, graph: &NodeGraph<'_>) -> Vec<Diagnostic> {
    let mut errors = Vec::new();

    duplicate_node_ids(workflow, &mut errors);
    entry_point_exists(workflow, graph, &mut errors);
    edges_reference_existing_nodes(workflow, graph, &mut errors);

    errors
}

fn duplicate_node_ids(workflow: &WorkflowDefinition, errors: &mut Vec<Diagnostic>) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for node in &workflow.nodes {
        *counts.entry(node.id.as_str()).or_insert(0) += 1;
    }

    // Report in order of first declaration.
    for node in &workflow.nodes {
        let id = node.id.as_str();
        if let Some(occurrences) = counts.remove(id) {
            if occurrences > 1 {
                errors.push(Diagnostic::new(
                    DiagnosticContext::DuplicateNodeId { occurrences },
                    format!("Node id '{}' is declared {} times", id, occurrences),
                    [id],
                ));
            }
        }
    }
}

fn entry_point_exists(
    workflow: &WorkflowDefinition,
    graph: &NodeGraph<'_>,
    errors: &mut Vec<Diagnostic>,
) {
    if graph.contains(&workflow.entry_point) {
        return;
    }
    errors.push(Diagnostic::new(
        DiagnosticContext::InvalidEntryPoint {
            entry_point: workflow.entry_point.clone(),
        },
        format!(
            "Entry point '{}' does not reference a node in this workflow",
            workflow.entry_point
        ),
        [workflow.entry_point.as_str()],
    ));
}

fn edges_reference_existing_nodes(
    workflow: &WorkflowDefinition,
    graph: &NodeGraph<'_>,
    errors: &mut Vec<Diagnostic>,
) {
    for (index, edge) in workflow.edges.iter().enumerate() {
        for endpoint in [&edge.source, &edge.target] {
            if graph.contains(endpoint) {
                continue;
            }
            errors.push(Diagnostic::new(
                DiagnosticContext::InvalidEdgeReference {
                    edge_index: index,
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                },
                format!(
                    "Edge {} ({} -> {}) references unknown node '{}'",
                    index, edge.source, edge.target, endpoint
                ),
                [endpoint.as_str()],
            ));
        }
    }
}

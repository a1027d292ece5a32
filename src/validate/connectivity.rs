//! Connectivity analysis: dangling nodes and islands unreachable from the
//! entry point.

use std::collections::HashSet;

use petgraph::visit::Bfs;

use crate::parse::graph::NodeGraph;
use crate::validate::diagnostic::{Diagnostic, DiagnosticContext};

/// `NO_INCOMING_EDGE` / `NO_OUTGOING_EDGE` warnings, node by node in declared
/// order, incoming before outgoing.
pub fn find_dangling_nodes(
    graph: &NodeGraph<'_>,
    entry_point: &str,
    terminal_marker: &str,
) -> Vec<Diagnostic> {
    let mut warnings = Vec::new();

    for id in graph.node_ids() {
        if graph.in_degree(id) == 0 && id != entry_point {
            let suggestions = incoming_suggestions(graph, id, entry_point);
            warnings.push(Diagnostic::new(
                DiagnosticContext::NoIncomingEdge {
                    connection_suggestions: (!suggestions.is_empty()).then_some(suggestions),
                },
                format!("Node '{}' has no incoming edges and may never execute", id),
                [id],
            ));
        }

        if graph.out_degree(id) == 0 {
            let mut suggestions = orphaned_nodes(graph, entry_point)
                .filter(|other| *other != id)
                .map(str::to_string)
                .collect::<Vec<_>>();
            if suggestions.is_empty() {
                suggestions.push(terminal_marker.to_string());
            }
            warnings.push(Diagnostic::new(
                DiagnosticContext::NoOutgoingEdge {
                    connection_suggestions: Some(suggestions),
                },
                format!(
                    "Node '{}' has no outgoing edges; confirm it is an intended terminal node",
                    id
                ),
                [id],
            ));
        }
    }

    warnings
}

/// Nodes that could feed `id`: the entry point, then every node still looking
/// for a next step.
fn incoming_suggestions(graph: &NodeGraph<'_>, id: &str, entry_point: &str) -> Vec<String> {
    let mut suggestions = Vec::new();
    if graph.contains(entry_point) && entry_point != id {
        suggestions.push(entry_point.to_string());
    }
    for other in graph.node_ids() {
        if other != id && other != entry_point && graph.out_degree(other) == 0 {
            suggestions.push(other.to_string());
        }
    }
    suggestions
}

/// In-degree 0 and not the entry point.
fn orphaned_nodes<'g, 'a>(
    graph: &'g NodeGraph<'a>,
    entry_point: &'g str,
) -> impl Iterator<Item = &'a str> + 'g {
    graph
        .node_ids()
        .filter(move |id| *id != entry_point && graph.in_degree(id) == 0)
}

/// Boolean variant of `find_dangling_nodes` for live checks.
pub fn has_dangling_nodes(graph: &NodeGraph<'_>, entry_point: &str) -> bool {
    graph
        .node_ids()
        .any(|id| graph.out_degree(id) == 0 || (graph.in_degree(id) == 0 && id != entry_point))
}

/// Nodes a forward traversal from the entry point never reaches, in declared
/// order. Every node is unreachable when the entry point is unknown.
pub fn find_unreachable_nodes<'a>(graph: &NodeGraph<'a>, entry_point: &str) -> Vec<&'a str> {
    let reachable = reachable_from(graph, entry_point);
    graph
        .node_ids()
        .filter(|id| !reachable.contains(id))
        .collect()
}

fn reachable_from<'a>(graph: &NodeGraph<'a>, entry_point: &str) -> HashSet<&'a str> {
    let mut reachable = HashSet::new();
    let Some(&start) = graph.node_indices.get(entry_point) else {
        return reachable;
    };
    let mut bfs = Bfs::new(&graph.graph, start);
    while let Some(nx) = bfs.next(&graph.graph) {
        reachable.insert(graph.graph[nx]);
    }
    reachable
}

/// Group unreachable nodes into clusters connected by edges in either
/// direction, staying inside the unreachable set. Clusters are ordered by
/// their earliest declared node and list members in declared order.
pub fn find_isolated_subgraphs(graph: &NodeGraph<'_>, entry_point: &str) -> Vec<Vec<String>> {
    let unreachable = find_unreachable_nodes(graph, entry_point);
    let candidates: HashSet<&str> = unreachable.iter().copied().collect();
    let mut assigned: HashSet<&str> = HashSet::with_capacity(unreachable.len());
    let mut clusters = Vec::new();

    for &seed in &unreachable {
        if !assigned.insert(seed) {
            continue;
        }
        let mut members = vec![seed];
        let mut stack = vec![seed];
        while let Some(id) = stack.pop() {
            let neighbours = graph
                .successors(id)
                .iter()
                .chain(graph.predecessors(id).iter());
            for &next in neighbours {
                if candidates.contains(next) && assigned.insert(next) {
                    members.push(next);
                    stack.push(next);
                }
            }
        }
        members.sort_by_key(|id| graph.position(id));
        clusters.push(members.into_iter().map(str::to_string).collect());
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::types::{EdgeDefinition, NodeDefinition, NodeType, WorkflowDefinition};
    use crate::validate::diagnostic::DiagnosticCode;

    fn workflow(entry: &str, nodes: &[&str], edges: &[(&str, &str)]) -> WorkflowDefinition {
        WorkflowDefinition {
            id: "wf".into(),
            title: "Test".into(),
            entry_point: entry.into(),
            nodes: nodes
                .iter()
                .map(|id| NodeDefinition::new(*id, NodeType::Conditional))
                .collect(),
            edges: edges
                .iter()
                .map(|(s, t)| EdgeDefinition::new(*s, *t))
                .collect(),
            status: Default::default(),
            error_handling: None,
            retry_config: None,
        }
    }

    fn suggestions(d: &Diagnostic) -> Option<&Vec<String>> {
        match &d.context {
            DiagnosticContext::NoIncomingEdge {
                connection_suggestions,
            }
            | DiagnosticContext::NoOutgoingEdge {
                connection_suggestions,
            } => connection_suggestions.as_ref(),
            _ => None,
        }
    }

    #[test]
    fn entry_is_exempt_from_incoming_only() {
        let wf = workflow("a", &["a"], &[]);
        let graph = NodeGraph::build(&wf);
        let warnings = find_dangling_nodes(&graph, "a", "__end__");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, DiagnosticCode::NoOutgoingEdge);
        assert_eq!(suggestions(&warnings[0]), Some(&vec!["__end__".to_string()]));
    }

    #[test]
    fn orphan_suggestions() {
        let wf = workflow("a", &["a", "b", "c", "d"], &[("a", "b")]);
        let graph = NodeGraph::build(&wf);
        let warnings = find_dangling_nodes(&graph, "a", "__end__");
        let summary: Vec<(DiagnosticCode, &str, Vec<String>)> = warnings
            .iter()
            .map(|w| (w.code, w.node_ids[0].as_str(), suggestions(w).cloned().unwrap_or_default()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (DiagnosticCode::NoOutgoingEdge, "b", vec!["c".into(), "d".into()]),
                (DiagnosticCode::NoIncomingEdge, "c", vec!["a".into(), "b".into(), "d".into()]),
                (DiagnosticCode::NoOutgoingEdge, "c", vec!["d".into()]),
                (DiagnosticCode::NoIncomingEdge, "d", vec!["a".into(), "b".into(), "c".into()]),
                (DiagnosticCode::NoOutgoingEdge, "d", vec!["c".into()]),
            ]
        );
    }

    #[test]
    fn unknown_entry_omits_empty_suggestions() {
        let wf = workflow("ghost", &["a", "b"], &[("a", "b")]);
        let graph = NodeGraph::build(&wf);
        let warnings = find_dangling_nodes(&graph, "ghost", "__end__");
        // a: no incoming, and b is its only out-degree-0 peer.
        assert_eq!(warnings[0].code, DiagnosticCode::NoIncomingEdge);
        assert_eq!(suggestions(&warnings[0]), Some(&vec!["b".to_string()]));

        // b loops on itself, so nothing is left to feed a.
        let looped = workflow("ghost", &["a", "b"], &[("a", "b"), ("b", "b")]);
        let graph = NodeGraph::build(&looped);
        let warnings = find_dangling_nodes(&graph, "ghost", "__end__");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, DiagnosticCode::NoIncomingEdge);
        assert_eq!(warnings[0].node_ids, vec!["a"]);
        assert_eq!(suggestions(&warnings[0]), None);
        assert_eq!(
            serde_json::to_value(&warnings[0].context).unwrap(),
            serde_json::json!({})
        );
    }

    #[test]
    fn islands_are_grouped() {
        let wf = workflow(
            "a",
            &["a", "b", "x", "y", "z", "solo"],
            &[("a", "b"), ("y", "x"), ("z", "y")],
        );
        let graph = NodeGraph::build(&wf);
        assert_eq!(find_unreachable_nodes(&graph, "a"), vec!["x", "y", "z", "solo"]);
        assert_eq!(
            find_isolated_subgraphs(&graph, "a"),
            vec![
                vec!["x".to_string(), "y".to_string(), "z".to_string()],
                vec!["solo".to_string()],
            ]
        );
    }

    #[test]
    fn unknown_entry_makes_everything_unreachable() {
        let wf = workflow("ghost", &["a", "b"], &[("a", "b")]);
        let graph = NodeGraph::build(&wf);
        assert_eq!(find_isolated_subgraphs(&graph, "ghost"), vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn dangling_fast_path() {
        let ring = workflow("a", &["a", "b"], &[("a", "b"), ("b", "a")]);
        assert!(!has_dangling_nodes(&NodeGraph::build(&ring), "a"));

        let chain = workflow("a", &["a", "b"], &[("a", "b")]);
        assert!(has_dangling_nodes(&NodeGraph::build(&chain), "a"));
    }
}

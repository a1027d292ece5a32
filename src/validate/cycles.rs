//! Cycle detection with path reconstruction.
//!
//! Depth-first search driven by an explicit frame stack, so deep graphs cannot
//! overflow the call stack. The frame stack doubles as the current DFS path:
//! when a successor is found on it, the slice from that successor to the top
//! is the cycle.

use std::collections::HashSet;

use crate::parse::graph::NodeGraph;
use crate::validate::diagnostic::{Diagnostic, DiagnosticContext};

/// A DFS frame: the node and the index of the next successor to explore.
struct Frame<'a> {
    node: &'a str,
    next: usize,
}

/// Report one `CIRCULAR_DEPENDENCY` error per back edge found.
///
/// Roots are tried in declared node order and successors in edge order, so
/// output is deterministic. Every graph with a cycle yields at least one
/// report. Overlapping cycles closed by different back edges are reported
/// separately even when they share nodes, so two reports may cover the same
/// node set; cycles reached only through an already visited node are not
/// enumerated.
pub fn detect_cycles(graph: &NodeGraph<'_>) -> Vec<Diagnostic> {
    find_cycle_paths(graph)
        .into_iter()
        .map(|path| circular_dependency(&path))
        .collect()
}

/// Closed cycle paths (first node repeated at the end) in discovery order.
pub fn find_cycle_paths<'a>(graph: &NodeGraph<'a>) -> Vec<Vec<&'a str>> {
    let mut cycles = Vec::new();
    let mut visited: HashSet<&str> = HashSet::with_capacity(graph.node_count());
    let mut on_stack: HashSet<&str> = HashSet::new();
    let mut stack: Vec<Frame<'a>> = Vec::new();

    for root in graph.node_ids() {
        if !visited.insert(root) {
            continue;
        }
        on_stack.insert(root);
        stack.push(Frame { node: root, next: 0 });

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            let Some(&successor) = graph.successors(node).get(frame.next) else {
                on_stack.remove(node);
                stack.pop();
                continue;
            };
            frame.next += 1;

            if on_stack.contains(successor) {
                if let Some(start) = stack.iter().position(|f| f.node == successor) {
                    let mut path: Vec<&str> = stack[start..].iter().map(|f| f.node).collect();
                    path.push(successor);
                    cycles.push(path);
                }
            } else if visited.insert(successor) {
                on_stack.insert(successor);
                stack.push(Frame {
                    node: successor,
                    next: 0,
                });
            }
        }
    }

    cycles
}

fn circular_dependency(path: &[&str]) -> Diagnostic {
    let cycle_path: Vec<String> = path.iter().map(|id| id.to_string()).collect();
    let members = &path[..path.len().saturating_sub(1)];
    Diagnostic::new(
        DiagnosticContext::CircularDependency {
            cycle_path: cycle_path.clone(),
        },
        format!("Circular dependency detected: {}", cycle_path.join(" -> ")),
        members.iter().copied(),
    )
}

/// Boolean variant for live checks; no paths are built.
pub fn has_cycle(graph: &NodeGraph<'_>) -> bool {
    graph.has_cycle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::types::{EdgeDefinition, NodeDefinition, NodeType, WorkflowDefinition};

    fn workflow(nodes: &[&str], edges: &[(&str, &str)]) -> WorkflowDefinition {
        WorkflowDefinition {
            id: "wf".into(),
            title: "Test".into(),
            entry_point: nodes.first().map(|n| n.to_string()).unwrap_or_default(),
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

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let wf = workflow(&["a", "b", "c"], &[("a", "b"), ("a", "c"), ("b", "c")]);
        let graph = NodeGraph::build(&wf);
        assert!(detect_cycles(&graph).is_empty());
        assert!(!has_cycle(&graph));
    }

    #[test]
    fn cycle_behind_a_prefix() {
        let wf = workflow(
            &["start", "a", "b", "c"],
            &[("start", "a"), ("a", "b"), ("b", "c"), ("c", "a")],
        );
        let graph = NodeGraph::build(&wf);
        assert_eq!(find_cycle_paths(&graph), vec![vec!["a", "b", "c", "a"]]);
    }

    #[test]
    fn self_loop() {
        let wf = workflow(&["a"], &[("a", "a")]);
        let graph = NodeGraph::build(&wf);
        let errors = detect_cycles(&graph);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].node_ids, vec!["a"]);
        assert_eq!(
            errors[0].context,
            DiagnosticContext::CircularDependency {
                cycle_path: vec!["a".into(), "a".into()]
            }
        );
    }

    #[test]
    fn two_disjoint_cycles_both_reported() {
        let wf = workflow(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "a"), ("c", "d"), ("d", "c")],
        );
        let graph = NodeGraph::build(&wf);
        assert_eq!(
            find_cycle_paths(&graph),
            vec![vec!["a", "b", "a"], vec!["c", "d", "c"]]
        );
    }

    #[test]
    fn overlapping_rings_report_each_back_edge() {
        let wf = workflow(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "a"), ("b", "c"), ("c", "a")],
        );
        let graph = NodeGraph::build(&wf);
        assert_eq!(
            find_cycle_paths(&graph),
            vec![vec!["a", "b", "a"], vec!["a", "b", "c", "a"]]
        );
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let ids: Vec<String> = (0..20_000).map(|i| format!("n{i}")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let mut edges: Vec<(&str, &str)> = id_refs.windows(2).map(|w| (w[0], w[1])).collect();
        edges.push((id_refs[id_refs.len() - 1], id_refs[0]));
        let wf = workflow(&id_refs, &edges);
        let graph = NodeGraph::build(&wf);
        let paths = find_cycle_paths(&graph);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 20_001);
    }
}

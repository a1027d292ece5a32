//! Field-flow validation.
//!
//! Walks the graph in topological order while tracking which fields have been
//! produced so far, and flags nodes that consume a field nothing upstream
//! produces. Cyclic graphs are skipped here: the cycle detector already owns
//! that root cause.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet};

use serde::Serialize;

use crate::config::DEFAULT_INITIAL_FIELDS;
use crate::parse::graph::NodeGraph;
use crate::validate::diagnostic::{Diagnostic, DiagnosticContext};
use crate::validate::extract::{FieldExtractor, required_fields};

/// Fields available at the current point of the walk.
#[derive(Debug, Clone)]
pub struct FieldTracker {
    available: BTreeSet<String>,
}

impl FieldTracker {
    /// `run_id` and `request` are always seeded; `initial_fields` adds to them.
    pub fn new<S: AsRef<str>>(initial_fields: &[S]) -> Self {
        let available = DEFAULT_INITIAL_FIELDS
            .iter()
            .map(|f| f.to_string())
            .chain(initial_fields.iter().map(|f| f.as_ref().to_string()))
            .collect();
        FieldTracker { available }
    }

    pub fn is_available(&self, field: &str) -> bool {
        self.available.contains(field)
    }

    /// Sorted.
    pub fn available_fields(&self) -> Vec<String> {
        self.available.iter().cloned().collect()
    }

    pub fn record_output(&mut self, field: &str) {
        self.available.insert(field.to_string());
    }
}

/// Kahn's algorithm; among ready nodes the earliest declared goes first.
/// Returns `None` when the graph has a cycle.
pub fn topological_order<'a>(graph: &NodeGraph<'a>) -> Option<Vec<&'a str>> {
    let mut remaining: HashMap<&str, usize> = graph
        .node_ids()
        .map(|id| (id, graph.in_degree(id)))
        .collect();
    let mut ready: BinaryHeap<Reverse<usize>> = graph
        .order
        .iter()
        .enumerate()
        .filter(|(_, id)| graph.in_degree(id) == 0)
        .map(|(pos, _)| Reverse(pos))
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse(pos)) = ready.pop() {
        let id = graph.order[pos];
        order.push(id);
        for &next in graph.successors(id) {
            let Some(count) = remaining.get_mut(next) else {
                continue;
            };
            *count -= 1;
            if *count == 0 {
                if let Some(next_pos) = graph.position(next) {
                    ready.push(Reverse(next_pos));
                }
            }
        }
    }

    (order.len() == graph.node_count()).then_some(order)
}

/// Emit `MISSING_FIELD_REFERENCE` for every required field that is not yet
/// available when its node is reached.
pub fn validate_field_flow<S, E>(
    graph: &NodeGraph<'_>,
    initial_fields: &[S],
    extractor: &E,
) -> Vec<Diagnostic>
where
    S: AsRef<str>,
    E: FieldExtractor + ?Sized,
{
    let Some(order) = topological_order(graph) else {
        return Vec::new();
    };

    let mut errors = Vec::new();
    let mut tracker = FieldTracker::new(initial_fields);

    for id in order {
        let Some(node) = graph.node(id) else { continue };

        for field in required_fields(node, extractor) {
            if tracker.is_available(&field) {
                continue;
            }
            let available = tracker.available_fields();
            errors.push(Diagnostic::new(
                DiagnosticContext::MissingFieldReference {
                    field: field.clone(),
                    available_fields: available.clone(),
                    upstream_node_ids: upstream_node_ids(graph, id),
                },
                format!(
                    "Node '{}' requires field '{}', but it is not produced upstream. \
                     Available fields: {}",
                    id,
                    field,
                    available.join(", ")
                ),
                [id],
            ));
        }

        if let Some(output) = node.output_field() {
            tracker.record_output(output);
        }
    }

    errors
}

/// Boolean variant of `validate_field_flow`; stops at the first miss.
pub fn has_missing_fields<S, E>(graph: &NodeGraph<'_>, initial_fields: &[S], extractor: &E) -> bool
where
    S: AsRef<str>,
    E: FieldExtractor + ?Sized,
{
    let Some(order) = topological_order(graph) else {
        return false;
    };
    let mut tracker = FieldTracker::new(initial_fields);
    for id in order {
        let Some(node) = graph.node(id) else { continue };
        if required_fields(node, extractor)
            .iter()
            .any(|f| !tracker.is_available(f))
        {
            return true;
        }
        if let Some(output) = node.output_field() {
            tracker.record_output(output);
        }
    }
    false
}

/// Direct predecessors, de-duplicated, in edge order.
fn upstream_node_ids(graph: &NodeGraph<'_>, id: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    graph
        .predecessors(id)
        .iter()
        .filter(|p| seen.insert(**p))
        .map(|p| p.to_string())
        .collect()
}

/// Fields available immediately before `target` runs (sorted). `None` when
/// the graph is cyclic or `target` is not a node.
pub fn available_fields_before<S: AsRef<str>>(
    graph: &NodeGraph<'_>,
    target: &str,
    initial_fields: &[S],
) -> Option<Vec<String>> {
    if !graph.contains(target) {
        return None;
    }
    let order = topological_order(graph)?;
    let mut tracker = FieldTracker::new(initial_fields);
    for id in order {
        if id == target {
            break;
        }
        if let Some(output) = graph.node(id).and_then(|n| n.output_field()) {
            tracker.record_output(output);
        }
    }
    Some(tracker.available_fields())
}

/// `UNUSED_OUTPUT_FIELD` for declared outputs that no node reachable from the
/// producer requires.
pub fn find_unused_output_fields<E>(graph: &NodeGraph<'_>, extractor: &E) -> Vec<Diagnostic>
where
    E: FieldExtractor + ?Sized,
{
    let produced: HashSet<&str> = graph
        .node_ids()
        .filter_map(|id| graph.node(id)?.output_field())
        .collect();
    // Only produced fields can be consumed.
    let requirements: HashMap<&str, Vec<String>> = graph
        .node_ids()
        .filter_map(|id| {
            let node = graph.node(id)?;
            let fields = required_fields(node, extractor)
                .into_iter()
                .filter(|f| produced.contains(f.as_str()))
                .collect();
            Some((id, fields))
        })
        .collect();

    let downstream = match topological_order(graph) {
        Some(order) => downstream_requirements(graph, &order, &requirements),
        None => graph
            .node_ids()
            .map(|id| {
                let fields = descendants(graph, id)
                    .into_iter()
                    .filter_map(|d| requirements.get(d))
                    .flatten()
                    .cloned()
                    .collect();
                (id, fields)
            })
            .collect(),
    };

    let mut warnings = Vec::new();
    for id in graph.node_ids() {
        let Some(field) = graph.node(id).and_then(|n| n.output_field()) else {
            continue;
        };
        let consumed = downstream
            .get(id)
            .is_some_and(|fields| fields.contains(field));
        if !consumed {
            warnings.push(Diagnostic::new(
                DiagnosticContext::UnusedOutputField {
                    field: field.to_string(),
                },
                format!(
                    "Output field '{}' of node '{}' is never consumed downstream",
                    field, id
                ),
                [id],
            ));
        }
    }
    warnings
}

/// Fields required anywhere below each node, folded in one pass over the
/// reversed topological order.
fn downstream_requirements<'a>(
    graph: &NodeGraph<'a>,
    order: &[&'a str],
    requirements: &HashMap<&str, Vec<String>>,
) -> HashMap<&'a str, HashSet<String>> {
    let mut below: HashMap<&'a str, HashSet<String>> = HashMap::with_capacity(order.len());
    for &id in order.iter().rev() {
        let mut fields = HashSet::new();
        for &next in graph.successors(id) {
            if let Some(required) = requirements.get(next) {
                fields.extend(required.iter().cloned());
            }
            if let Some(further) = below.get(next) {
                fields.extend(further.iter().cloned());
            }
        }
        below.insert(id, fields);
    }
    below
}

/// `MISSING_OUTPUT_FIELD` for agent and script nodes without an output field.
pub fn find_missing_output_fields(graph: &NodeGraph<'_>) -> Vec<Diagnostic> {
    graph
        .node_ids()
        .filter_map(|id| graph.node(id))
        .filter(|node| node.node_type.requires_output_field() && node.output_field().is_none())
        .map(|node| {
            Diagnostic::new(
                DiagnosticContext::MissingOutputField {
                    node_type: node.node_type.clone(),
                },
                format!(
                    "Node '{}' of type '{}' does not declare an output field",
                    node.id, node.node_type
                ),
                [node.id.as_str()],
            )
        })
        .collect()
}

/// Where a field comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "node_id", rename_all = "snake_case")]
pub enum FieldSource {
    /// Seeded before any node runs.
    Initial,
    /// First producer in topological order.
    Node(String),
    Undefined,
}

pub fn resolve_field_source<S: AsRef<str>>(
    graph: &NodeGraph<'_>,
    field: &str,
    initial_fields: &[S],
) -> FieldSource {
    let seeded = DEFAULT_INITIAL_FIELDS.iter().any(|f| *f == field);
    if seeded || initial_fields.iter().any(|f| f.as_ref() == field) {
        return FieldSource::Initial;
    }
    let order = topological_order(graph).unwrap_or_else(|| graph.order.clone());
    order
        .into_iter()
        .find(|id| graph.node(id).and_then(|n| n.output_field()) == Some(field))
        .map(|id| FieldSource::Node(id.to_string()))
        .unwrap_or(FieldSource::Undefined)
}

/// Nodes reachable from `start` through at least one edge.
fn descendants<'a>(graph: &NodeGraph<'a>, start: &str) -> Vec<&'a str> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&'a str> = graph.successors(start).to_vec();
    let mut out = Vec::new();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        out.push(id);
        stack.extend_from_slice(graph.successors(id));
    }
    out
}

//! Indexed adjacency view over a `WorkflowDefinition`.
//!
//! Rebuilt for every validation call; borrows ids and nodes from the
//! definition. Adjacency lists keep edge declaration order so traversals are
//! reproducible, and a petgraph mirror backs reachability and the boolean
//! cycle check.

use std::collections::HashMap;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};

use super::types::{NodeDefinition, WorkflowDefinition};

pub struct NodeGraph<'a> {
    /// Node ids in declared order, first declaration only.
    pub order: Vec<&'a str>,
    pub nodes: HashMap<&'a str, &'a NodeDefinition>,
    pub forward: HashMap<&'a str, Vec<&'a str>>,
    pub reverse: HashMap<&'a str, Vec<&'a str>>,
    pub in_degree: HashMap<&'a str, usize>,
    pub out_degree: HashMap<&'a str, usize>,
    pub graph: DiGraph<&'a str, Option<&'a str>>,
    pub node_indices: HashMap<&'a str, NodeIndex>,
}

impl<'a> NodeGraph<'a> {
    /// Index nodes, then edges. Edges with an endpoint that is not a declared
    /// node are left out; reference checks report them.
    pub fn build(workflow: &'a WorkflowDefinition) -> Self {
        let mut order = Vec::with_capacity(workflow.nodes.len());
        let mut nodes = HashMap::with_capacity(workflow.nodes.len());
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::with_capacity(workflow.nodes.len());
        let mut in_degree = HashMap::with_capacity(workflow.nodes.len());
        let mut out_degree = HashMap::with_capacity(workflow.nodes.len());

        for node in &workflow.nodes {
            let id = node.id.as_str();
            if nodes.contains_key(id) {
                continue;
            }
            nodes.insert(id, node);
            order.push(id);
            node_indices.insert(id, graph.add_node(id));
            in_degree.insert(id, 0);
            out_degree.insert(id, 0);
        }

        let mut forward: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut reverse: HashMap<&str, Vec<&str>> = HashMap::new();

        for edge in &workflow.edges {
            let source = edge.source.as_str();
            let target = edge.target.as_str();
            let (Some(&s), Some(&t)) = (node_indices.get(source), node_indices.get(target))
            else {
                continue;
            };
            graph.add_edge(s, t, edge.label.as_deref());
            forward.entry(source).or_default().push(target);
            reverse.entry(target).or_default().push(source);
            *out_degree.entry(source).or_insert(0) += 1;
            *in_degree.entry(target).or_insert(0) += 1;
        }

        NodeGraph {
            order,
            nodes,
            forward,
            reverse,
            in_degree,
            out_degree,
            graph,
            node_indices,
        }
    }

    pub fn node(&self, id: &str) -> Option<&'a NodeDefinition> {
        self.nodes.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Node ids in declared order.
    pub fn node_ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.order.iter().copied()
    }

    /// Declared position of a node, used to break ties deterministically.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.node_indices.get(id).map(|idx| idx.index())
    }

    pub fn successors(&self, id: &str) -> &[&'a str] {
        self.forward.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn predecessors(&self, id: &str) -> &[&'a str] {
        self.reverse.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.in_degree.get(id).copied().unwrap_or(0)
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.out_degree.get(id).copied().unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Number of edges between known nodes.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Boolean cycle check for live validation; self-loops count.
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }
}

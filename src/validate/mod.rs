//! Workflow validation.
//!
//! `Validator` composes the individual analyses into one pass over a
//! `WorkflowDefinition`:
//!
//! 1. reference integrity (duplicate ids, unknown entry point and edge ends)
//! 2. cycle detection
//! 3. field flow
//! 4. connectivity
//! 5. output-field checks, when enabled in the config
//!
//! Diagnostics are concatenated in that order. Every call builds and drops
//! its own `NodeGraph`, so a validator can be shared freely.

pub mod connectivity;
pub mod cycles;
pub mod diagnostic;
pub mod extract;
pub mod fields;
pub mod references;
pub mod result;

pub use diagnostic::{
    Diagnostic, DiagnosticCode, DiagnosticContext, Severity, ValidationError, ValidationWarning,
};
pub use extract::{FieldExtractor, NoTemplateFields, TemplateFieldExtractor};
pub use fields::FieldSource;
pub use result::{ValidationResult, ValidationSummary};

use crate::config::ValidatorConfig;
use crate::parse::graph::NodeGraph;
use crate::parse::types::WorkflowDefinition;

#[derive(Debug, Clone, Default)]
pub struct Validator<E = TemplateFieldExtractor> {
    config: ValidatorConfig,
    extractor: E,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: FieldExtractor> Validator<E> {
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Swap the placeholder extraction rule.
    pub fn with_extractor<F: FieldExtractor>(self, extractor: F) -> Validator<F> {
        Validator {
            config: self.config,
            extractor,
        }
    }

    /// Full validation pass.
    #[tracing::instrument(
        name = "validate_workflow",
        skip_all,
        fields(workflow_id = %workflow.id, nodes = workflow.nodes.len(), edges = workflow.edges.len())
    )]
    pub fn validate(&self, workflow: &WorkflowDefinition) -> ValidationResult {
        let graph = NodeGraph::build(workflow);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.config.check_references {
            errors.extend(references::validate_references(workflow, &graph));
        }
        errors.extend(cycles::detect_cycles(&graph));
        errors.extend(fields::validate_field_flow(
            &graph,
            &self.config.initial_fields,
            &self.extractor,
        ));
        warnings.extend(connectivity::find_dangling_nodes(
            &graph,
            &workflow.entry_point,
            &self.config.terminal_marker,
        ));
        if self.config.include_output_checks {
            warnings.extend(fields::find_missing_output_fields(&graph));
            warnings.extend(fields::find_unused_output_fields(&graph, &self.extractor));
        }

        let result = ValidationResult::new(errors, warnings);
        tracing::debug!(
            valid = result.valid,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "workflow validated"
        );
        result
    }

    /// Same verdict as `validate(..).valid` without building diagnostics.
    pub fn is_valid(&self, workflow: &WorkflowDefinition) -> bool {
        let graph = NodeGraph::build(workflow);
        if self.config.check_references && has_reference_errors(workflow, &graph) {
            return false;
        }
        if graph.has_cycle() {
            return false;
        }
        !fields::has_missing_fields(&graph, &self.config.initial_fields, &self.extractor)
    }

    pub fn summarize(&self, workflow: &WorkflowDefinition) -> ValidationSummary {
        self.validate(workflow).summary()
    }

    /// Clusters of nodes unreachable from the entry point.
    pub fn isolated_subgraphs(&self, workflow: &WorkflowDefinition) -> Vec<Vec<String>> {
        let graph = NodeGraph::build(workflow);
        connectivity::find_isolated_subgraphs(&graph, &workflow.entry_point)
    }

    /// Fields available just before `node_id` runs; `None` for cyclic graphs
    /// or unknown nodes.
    pub fn available_fields_before(
        &self,
        workflow: &WorkflowDefinition,
        node_id: &str,
    ) -> Option<Vec<String>> {
        let graph = NodeGraph::build(workflow);
        fields::available_fields_before(&graph, node_id, &self.config.initial_fields)
    }

    pub fn resolve_field_source(&self, workflow: &WorkflowDefinition, field: &str) -> FieldSource {
        let graph = NodeGraph::build(workflow);
        fields::resolve_field_source(&graph, field, &self.config.initial_fields)
    }

    /// `MISSING_OUTPUT_FIELD` then `UNUSED_OUTPUT_FIELD` warnings, regardless
    /// of `include_output_checks`.
    pub fn output_field_warnings(&self, workflow: &WorkflowDefinition) -> Vec<Diagnostic> {
        let graph = NodeGraph::build(workflow);
        let mut warnings = fields::find_missing_output_fields(&graph);
        warnings.extend(fields::find_unused_output_fields(&graph, &self.extractor));
        warnings
    }
}

fn has_reference_errors(workflow: &WorkflowDefinition, graph: &NodeGraph<'_>) -> bool {
    graph.node_count() != workflow.nodes.len()
        || !graph.contains(&workflow.entry_point)
        || workflow
            .edges
            .iter()
            .any(|e| !graph.contains(&e.source) || !graph.contains(&e.target))
}

/// Validate with the default configuration and template extractor.
pub fn validate_workflow(workflow: &WorkflowDefinition) -> ValidationResult {
    Validator::new().validate(workflow)
}

/// Boolean fast path of `validate_workflow`.
pub fn is_valid(workflow: &WorkflowDefinition) -> bool {
    Validator::new().is_valid(workflow)
}

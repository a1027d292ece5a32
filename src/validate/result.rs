//! Aggregated validation outcome and the views the editor renders from it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::validate::diagnostic::{Diagnostic, DiagnosticCode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// True iff `errors` is empty; warnings never affect validity.
    pub valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub has_cycles: bool,
    pub has_missing_fields: bool,
    pub has_dangling_nodes: bool,
    pub has_reference_errors: bool,
    pub has_output_field_issues: bool,
}

impl ValidationResult {
    pub fn new(errors: Vec<Diagnostic>, warnings: Vec<Diagnostic>) -> Self {
        ValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Errors first, then warnings.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter())
    }

    pub fn has_code(&self, code: DiagnosticCode) -> bool {
        self.diagnostics().any(|d| d.code == code)
    }

    pub fn with_code(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.diagnostics().filter(|d| d.code == code).collect()
    }

    /// Diagnostics grouped by implicated node id, for per-node badges. A
    /// diagnostic naming several nodes appears under each of them.
    pub fn by_node(&self) -> BTreeMap<&str, Vec<&Diagnostic>> {
        let mut grouped: BTreeMap<&str, Vec<&Diagnostic>> = BTreeMap::new();
        for diagnostic in self.diagnostics() {
            for id in &diagnostic.node_ids {
                let entry = grouped.entry(id.as_str()).or_default();
                // node_ids may repeat an id.
                if !entry.iter().any(|d| std::ptr::eq(*d, diagnostic)) {
                    entry.push(diagnostic);
                }
            }
        }
        grouped
    }

    pub fn for_node(&self, node_id: &str) -> Vec<&Diagnostic> {
        self.diagnostics().filter(|d| d.involves(node_id)).collect()
    }

    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary {
            valid: self.valid,
            error_count: self.errors.len(),
            warning_count: self.warnings.len(),
            has_cycles: self.has_code(DiagnosticCode::CircularDependency),
            has_missing_fields: self.has_code(DiagnosticCode::MissingFieldReference),
            has_dangling_nodes: self.has_code(DiagnosticCode::NoIncomingEdge)
                || self.has_code(DiagnosticCode::NoOutgoingEdge),
            has_reference_errors: self.diagnostics().any(|d| d.code.is_reference_error()),
            has_output_field_issues: self.has_code(DiagnosticCode::UnusedOutputField)
                || self.has_code(DiagnosticCode::MissingOutputField),
        }
    }
}

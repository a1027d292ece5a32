//! Diagnostic codes, severities and per-code context payloads.
//!
//! The serialized shape `{code, message, severity, node_ids, context}` is the
//! contract shared with the server-side validator. `context` carries a
//! different payload per code; it is modelled as one enum variant per code so
//! the payload can never disagree with the code it belongs to.

use serde::Serialize;

use crate::parse::types::NodeType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Errors
    /// One per back edge met during the search; overlapping cycles can each
    /// get their own report.
    CircularDependency,
    MissingFieldReference,
    InvalidEntryPoint,
    InvalidEdgeReference,
    DuplicateNodeId,
    /// Reserved: needs a node configuration schema validator.
    InvalidNodeConfig,
    /// Reserved.
    MissingRequiredField,

    // Warnings
    NoOutgoingEdge,
    NoIncomingEdge,
    UnusedOutputField,
    MissingOutputField,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::CircularDependency => "CIRCULAR_DEPENDENCY",
            DiagnosticCode::MissingFieldReference => "MISSING_FIELD_REFERENCE",
            DiagnosticCode::InvalidEntryPoint => "INVALID_ENTRY_POINT",
            DiagnosticCode::InvalidEdgeReference => "INVALID_EDGE_REFERENCE",
            DiagnosticCode::DuplicateNodeId => "DUPLICATE_NODE_ID",
            DiagnosticCode::InvalidNodeConfig => "INVALID_NODE_CONFIG",
            DiagnosticCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            DiagnosticCode::NoOutgoingEdge => "NO_OUTGOING_EDGE",
            DiagnosticCode::NoIncomingEdge => "NO_INCOMING_EDGE",
            DiagnosticCode::UnusedOutputField => "UNUSED_OUTPUT_FIELD",
            DiagnosticCode::MissingOutputField => "MISSING_OUTPUT_FIELD",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticCode::CircularDependency
            | DiagnosticCode::MissingFieldReference
            | DiagnosticCode::InvalidEntryPoint
            | DiagnosticCode::InvalidEdgeReference
            | DiagnosticCode::DuplicateNodeId
            | DiagnosticCode::InvalidNodeConfig
            | DiagnosticCode::MissingRequiredField => Severity::Error,
            DiagnosticCode::NoOutgoingEdge
            | DiagnosticCode::NoIncomingEdge
            | DiagnosticCode::UnusedOutputField
            | DiagnosticCode::MissingOutputField => Severity::Warning,
        }
    }

    pub fn is_reference_error(&self) -> bool {
        matches!(
            self,
            DiagnosticCode::InvalidEntryPoint
                | DiagnosticCode::InvalidEdgeReference
                | DiagnosticCode::DuplicateNodeId
        )
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Code-specific payload. Serialized without a tag; the sibling `code` field
/// identifies the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DiagnosticContext {
    CircularDependency {
        /// Closed path: the first node is repeated at the end.
        cycle_path: Vec<String>,
    },
    MissingFieldReference {
        field: String,
        /// Sorted.
        available_fields: Vec<String>,
        upstream_node_ids: Vec<String>,
    },
    NoIncomingEdge {
        #[serde(skip_serializing_if = "Option::is_none")]
        connection_suggestions: Option<Vec<String>>,
    },
    NoOutgoingEdge {
        #[serde(skip_serializing_if = "Option::is_none")]
        connection_suggestions: Option<Vec<String>>,
    },
    UnusedOutputField {
        field: String,
    },
    MissingOutputField {
        node_type: NodeType,
    },
    InvalidEntryPoint {
        entry_point: String,
    },
    InvalidEdgeReference {
        edge_index: usize,
        source: String,
        target: String,
    },
    DuplicateNodeId {
        occurrences: usize,
    },
}

impl DiagnosticContext {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            DiagnosticContext::CircularDependency { .. } => DiagnosticCode::CircularDependency,
            DiagnosticContext::MissingFieldReference { .. } => {
                DiagnosticCode::MissingFieldReference
            }
            DiagnosticContext::NoIncomingEdge { .. } => DiagnosticCode::NoIncomingEdge,
            DiagnosticContext::NoOutgoingEdge { .. } => DiagnosticCode::NoOutgoingEdge,
            DiagnosticContext::UnusedOutputField { .. } => DiagnosticCode::UnusedOutputField,
            DiagnosticContext::MissingOutputField { .. } => DiagnosticCode::MissingOutputField,
            DiagnosticContext::InvalidEntryPoint { .. } => DiagnosticCode::InvalidEntryPoint,
            DiagnosticContext::InvalidEdgeReference { .. } => DiagnosticCode::InvalidEdgeReference,
            DiagnosticContext::DuplicateNodeId { .. } => DiagnosticCode::DuplicateNodeId,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub severity: Severity,
    /// Implicated nodes; never empty.
    pub node_ids: Vec<String>,
    pub context: DiagnosticContext,
}

pub type ValidationError = Diagnostic;
pub type ValidationWarning = Diagnostic;

impl Diagnostic {
    /// Code and severity are derived from the context variant.
    pub fn new<I, S>(context: DiagnosticContext, message: impl Into<String>, node_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let code = context.code();
        Diagnostic {
            code,
            message: message.into(),
            severity: code.severity(),
            node_ids: node_ids.into_iter().map(Into::into).collect(),
            context,
        }
    }

    pub fn involves(&self, node_id: &str) -> bool {
        self.node_ids.iter().any(|id| id == node_id)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

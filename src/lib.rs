//! Static validation for declarative workflow graphs.
//!
//! Catches cycles, fields consumed before anything produces them, and nodes
//! that dangle or can never be reached, before a workflow runs or is
//! published.
//!
//! ```
//! use workflow_validator::{parse, validate};
//!
//! let workflow = parse::parse(r#"{
//!     "id": "wf", "title": "Hello", "entry_point": "greet",
//!     "nodes": [{ "id": "greet", "type": "llm-agent",
//!                 "config": { "prompt": "Say hi to {{request.name}}", "output_field": "greeting" } }],
//!     "edges": []
//! }"#).unwrap();
//!
//! let result = validate::validate_workflow(&workflow);
//! assert!(result.valid);
//! assert_eq!(result.warnings.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod parse;
pub mod publish;
pub mod validate;
pub mod wasm;

pub use config::ValidatorConfig;
pub use error::{Error, Result};
pub use parse::{NodeGraph, WorkflowDefinition};
pub use validate::{Diagnostic, DiagnosticCode, ValidationResult, Validator, validate_workflow};

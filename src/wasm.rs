//! WASM entry points for the browser editor.
//!
//! Every function takes the workflow as JSON. Decoding failures come back as
//! `{ "status": "parse_error", "code", "message" }` instead of throwing.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::parse::types::WorkflowDefinition;
use crate::validate::Validator;

/// Full validation. Returns `{ status: "ok", result: ValidationResult }`.
#[wasm_bindgen]
pub fn validate_workflow(json: &str) -> JsValue {
    to_js(&with_workflow(json, |workflow| Validator::new().validate(workflow)))
}

/// Boolean fast path for live checks while editing. Unparseable input is
/// reported as invalid.
#[wasm_bindgen]
pub fn is_workflow_valid(json: &str) -> bool {
    crate::parse::parse(json)
        .map(|workflow| Validator::new().is_valid(&workflow))
        .unwrap_or(false)
}

/// Counts and per-category flags for status badges.
#[wasm_bindgen]
pub fn summarize_workflow(json: &str) -> JsValue {
    to_js(&with_workflow(json, |workflow| Validator::new().summarize(workflow)))
}

/// Clusters of nodes unreachable from the entry point.
#[wasm_bindgen]
pub fn isolated_subgraphs(json: &str) -> JsValue {
    to_js(&with_workflow(json, |workflow| {
        Validator::new().isolated_subgraphs(workflow)
    }))
}

fn with_workflow<T, F>(json: &str, f: F) -> Response<T>
where
    F: FnOnce(&WorkflowDefinition) -> T,
{
    match crate::parse::parse(json) {
        Ok(workflow) => Response::Ok {
            result: f(&workflow),
        },
        Err(e) => Response::ParseError {
            code: e.code(),
            message: e.to_string(),
        },
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Response<T> {
    Ok { result: T },
    ParseError { code: &'static str, message: String },
}

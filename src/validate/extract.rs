//! Field references embedded in free-form node configuration.
//!
//! The placeholder syntax belongs to the node templates, not to the graph
//! algorithms, so extraction sits behind the `FieldExtractor` trait.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::parse::types::{INPUT_FIELDS_KEY, NodeDefinition, OUTPUT_FIELD_KEY};

/// Given a node's configuration, return the field names it references.
pub trait FieldExtractor {
    fn referenced_fields(&self, config: &Map<String, Value>) -> BTreeSet<String>;
}

impl<F> FieldExtractor for F
where
    F: Fn(&Map<String, Value>) -> BTreeSet<String>,
{
    fn referenced_fields(&self, config: &Map<String, Value>) -> BTreeSet<String> {
        self(config)
    }
}

/// Finds `{{field}}` and `{{field.path}}` placeholders in every string value
/// of the configuration and returns the root `field` of each. Roots are ASCII
/// letters, digits, `_` and `-`; anything else is left as literal text.
///
/// `input_fields` and `output_field` are declarations, not templates, and are
/// skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateFieldExtractor;

impl FieldExtractor for TemplateFieldExtractor {
    fn referenced_fields(&self, config: &Map<String, Value>) -> BTreeSet<String> {
        let mut fields = BTreeSet::new();
        for (key, value) in config {
            if key == INPUT_FIELDS_KEY || key == OUTPUT_FIELD_KEY {
                continue;
            }
            collect_from_value(value, &mut fields);
        }
        fields
    }
}

/// Only `input_fields` declarations count.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTemplateFields;

impl FieldExtractor for NoTemplateFields {
    fn referenced_fields(&self, _config: &Map<String, Value>) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

fn collect_from_value(value: &Value, fields: &mut BTreeSet<String>) {
    match value {
        Value::String(s) => collect_placeholders(s, fields),
        Value::Array(items) => {
            for item in items {
                collect_from_value(item, fields);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                collect_from_value(item, fields);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn collect_placeholders(input: &str, fields: &mut BTreeSet<String>) {
    let mut remaining = input;

    while let Some(start) = remaining.find("{{") {
        let after_open = &remaining[start + 2..];
        let Some(end) = after_open.find("}}") else {
            // Unterminated placeholder; the rest is literal text.
            return;
        };
        if let Some(field) = root_segment(&after_open[..end]) {
            fields.insert(field.to_string());
        }
        remaining = &after_open[end + 2..];
    }
}

fn root_segment(inner: &str) -> Option<&str> {
    let trimmed = inner.trim();
    let root = match trimmed.find('.') {
        Some(pos) => &trimmed[..pos],
        None => trimmed,
    };
    let valid = !root.is_empty()
        && root
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid.then_some(root)
}

/// Fields a node needs before it can run: its `input_fields` in declared
/// order, then template references, without duplicates.
pub fn required_fields<E>(node: &NodeDefinition, extractor: &E) -> Vec<String>
where
    E: FieldExtractor + ?Sized,
{
    let mut required: Vec<String> = Vec::new();
    for field in node.input_fields() {
        if !required.iter().any(|f| f == field) {
            required.push(field.to_string());
        }
    }
    for field in extractor.referenced_fields(&node.config) {
        if !required.contains(&field) {
            required.push(field);
        }
    }
    required
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn plain_placeholders() {
        let cfg = config(json!({ "prompt": "Summarise {{ticket}} for {{ customer }}" }));
        let fields = TemplateFieldExtractor.referenced_fields(&cfg);
        assert_eq!(fields.into_iter().collect::<Vec<_>>(), vec!["customer", "ticket"]);
    }

    #[test]
    fn dotted_paths_use_root() {
        let cfg = config(json!({ "url": "https://api/{{request.body.id}}" }));
        let fields = TemplateFieldExtractor.referenced_fields(&cfg);
        assert!(fields.contains("request"));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn nested_values_and_declarations() {
        let cfg = config(json!({
            "input_fields": ["{{ignored}}"],
            "output_field": "{{also_ignored}}",
            "messages": [{ "role": "user", "content": "{{question}}" }],
            "retries": 3
        }));
        let fields = TemplateFieldExtractor.referenced_fields(&cfg);
        assert_eq!(fields.into_iter().collect::<Vec<_>>(), vec!["question"]);
    }

    #[test]
    fn malformed_placeholders_are_ignored() {
        let cfg = config(json!({ "a": "{{}} {{ has space }} {{café}} {{open", "b": "{{ok}}" }));
        let fields = TemplateFieldExtractor.referenced_fields(&cfg);
        assert_eq!(fields.into_iter().collect::<Vec<_>>(), vec!["ok"]);
    }

    #[test]
    fn closures_are_extractors() {
        let extractor = |_: &Map<String, Value>| BTreeSet::from(["score".to_string()]);
        let node = NodeDefinition::new("n", crate::parse::types::NodeType::Conditional);
        assert_eq!(required_fields(&node, &extractor), vec!["score"]);
    }

    #[test]
    fn required_fields_order() {
        let mut node = NodeDefinition::new("n", crate::parse::types::NodeType::Script);
        node.config = config(json!({
            "input_fields": ["b", "a", "b"],
            "code": "{{c}} + {{a}}"
        }));
        assert_eq!(
            required_fields(&node, &TemplateFieldExtractor),
            vec!["b", "a", "c"]
        );
        assert_eq!(required_fields(&node, &NoTemplateFields), vec!["b", "a"]);
    }
}

//! # Schema Validation & Canonical Serialization
//!
//! Coerces raw model output or structured candidates into a registered
//! schema, with descriptive per-field problems so a failed attempt can be
//! replayed to the model. Also renders validated payloads in a canonical
//! text form (schema field order, stable key order) so downstream prompts
//! are byte-identical across runs given the same upstream state.

use serde_json::Value;

use super::{FieldKind, Schema};
use crate::error::PipelineError;

/// Pull a JSON object out of raw model output.
///
/// Accepts a bare JSON document, a fenced ```json block, or the first
/// brace-balanced object embedded in surrounding prose - models wrap
/// structured answers in all three shapes.
pub fn extract_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Some(value);
        }
    }

    if let Some(fenced) = extract_fenced_block(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(fenced.trim()) {
            if value.is_object() {
                return Some(value);
            }
        }
    }

    extract_balanced_object(trimmed)
        .and_then(|chunk| serde_json::from_str::<Value>(chunk).ok())
        .filter(Value::is_object)
}

fn extract_fenced_block(raw: &str) -> Option<&str> {
    let start = raw.find("```")?;
    let after_fence = &raw[start + 3..];
    // Skip an optional language tag on the fence line
    let body_start = after_fence.find('\n')?;
    let body = &after_fence[body_start + 1..];
    let end = body.find("```")?;
    Some(&body[..end])
}

/// First `{...}` span with balanced braces, ignoring braces inside string
/// literals.
fn extract_balanced_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let bytes = raw.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Validate a structured candidate against a schema.
///
/// All problems are collected before failing so the retry prompt can name
/// every violation at once. Enum membership is a case-sensitive exact
/// match; extra keys are tolerated.
pub fn validate(value: &Value, schema: &Schema) -> Result<(), PipelineError> {
    let object = match value.as_object() {
        Some(object) => object,
        None => {
            return Err(validation_error(
                schema,
                vec!["expected a JSON object".to_string()],
            ))
        }
    };

    let mut problems = Vec::new();
    for field in schema.fields {
        let entry = object.get(field.name);
        match entry {
            None | Some(Value::Null) => {
                if field.required {
                    problems.push(format!("missing required field '{}'", field.name));
                }
            }
            Some(found) => check_field(field.name, field.kind, found, &mut problems),
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(validation_error(schema, problems))
    }
}

fn check_field(name: &str, kind: FieldKind, value: &Value, problems: &mut Vec<String>) {
    match kind {
        FieldKind::Text => {
            if !value.is_string() {
                problems.push(format!("field '{}' must be a string", name));
            }
        }
        FieldKind::Enum(allowed) => match value.as_str() {
            Some(text) if allowed.contains(&text) => {}
            Some(text) => problems.push(format!(
                "field '{}' has value '{}' which is not one of [{}]",
                name,
                text,
                allowed.join(", ")
            )),
            None => problems.push(format!("field '{}' must be a string", name)),
        },
        FieldKind::TextList { non_empty } => match value.as_array() {
            Some(items) => {
                if non_empty && items.is_empty() {
                    problems.push(format!("field '{}' must not be empty", name));
                }
                if items.iter().any(|item| !item.is_string()) {
                    problems.push(format!("field '{}' must contain only strings", name));
                }
            }
            None => problems.push(format!("field '{}' must be a list of strings", name)),
        },
    }
}

fn validation_error(schema: &Schema, problems: Vec<String>) -> PipelineError {
    PipelineError::SchemaValidation {
        schema: schema.name.to_string(),
        problems: problems.join("; "),
    }
}

/// Coerce free text into a validated structured record.
pub fn coerce_text(raw: &str, schema: &Schema) -> Result<Value, PipelineError> {
    let value = extract_json(raw).ok_or_else(|| {
        validation_error(schema, vec!["no JSON object found in output".to_string()])
    })?;
    validate(&value, schema)?;
    Ok(value)
}

/// Render a payload deterministically: schema fields first in declaration
/// order, then any extra keys lexicographically; nested objects always in
/// lexicographic key order.
pub fn canonical_string(value: &Value, schema: Option<&Schema>) -> String {
    let mut out = String::new();
    write_canonical(value, schema, &mut out);
    out
}

fn write_canonical(value: &Value, schema: Option<&Schema>, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut ordered: Vec<&String> = Vec::with_capacity(map.len());
            if let Some(schema) = schema {
                for field in schema.fields {
                    if let Some(key) = map.keys().find(|k| k.as_str() == field.name) {
                        ordered.push(key);
                    }
                }
            }
            let mut extras: Vec<&String> = map
                .keys()
                .filter(|k| !ordered.iter().any(|seen| seen == k))
                .collect();
            extras.sort();
            ordered.extend(extras);

            out.push('{');
            for (index, key) in ordered.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push_str(": ");
                write_canonical(&map[key.as_str()], None, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_canonical(item, None, out);
            }
            out.push(']');
        }
        leaf => out.push_str(&leaf.to_string()),
    }
}

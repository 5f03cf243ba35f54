//! Validation of model output.
//!
//! The provider constrains output to the response schema, but nothing guarantees it. Anything
//! that does not parse into a non-empty list of well-formed alerts is rejected here so the
//! analyzer can retry instead of passing malformed alerts through.

use serde_json::Value;

use crate::analyzer::ModelError;
use crate::types::{Alert, AlertKind};

/// Parse and validate raw model text into alerts.
///
/// # Errors
/// - `ModelError::MalformedResponse` if the text is not a JSON array of objects,
/// - `ModelError::SchemaViolation` if the array is empty, a `type` is not one of the five model
///   labels, or a `finding` is blank.
pub fn parse_alerts(raw: &str) -> Result<Vec<Alert>, ModelError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;

    let items = value
        .as_array()
        .ok_or_else(|| ModelError::MalformedResponse("expected a JSON array".into()))?;

    if items.is_empty() {
        return Err(ModelError::SchemaViolation("empty alert list".into()));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_alert(index, item))
        .collect()
}

fn parse_alert(index: usize, item: &Value) -> Result<Alert, ModelError> {
    let label = item
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ModelError::SchemaViolation(format!("alert {index} has no type")))?;

    let kind: AlertKind = serde_json::from_value(Value::String(label.to_string())).map_err(|_| {
        ModelError::SchemaViolation(format!("alert {index} has unknown type {label:?}"))
    })?;

    if !kind.is_model_kind() {
        return Err(ModelError::SchemaViolation(format!(
            "alert {index} uses reserved type {kind}"
        )));
    }

    let finding = item
        .get("finding")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    if finding.is_empty() {
        return Err(ModelError::SchemaViolation(format!(
            "alert {index} has an empty finding"
        )));
    }

    Ok(Alert::new(kind, finding))
}

/// Models sometimes wrap JSON in a markdown fence despite the mime type.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

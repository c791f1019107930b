//! Parse provider output into a typed field map

use crate::error::ExtractorError;
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use std::str::FromStr;
use tally_domain::{FieldMap, FieldName, FieldValue};
use tracing::warn;

/// Parse a provider's JSON answer into a field map.
///
/// The answer must be a single JSON object, optionally wrapped in a Markdown
/// code block. Strings stay verbatim, integers become `Integer`, other numbers
/// become exact `Decimal`s and `null` becomes `Absent`. Nested arrays and
/// objects are skipped. An answer that yields no fields is an error.
pub fn parse_field_response(response: &str) -> Result<FieldMap, ExtractorError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(json_str)?;

    let object = json.as_object().ok_or_else(|| {
        ExtractorError::ExtractionFailed("Expected a JSON object of fields".to_string())
    })?;

    let mut fields = FieldMap::new();
    for (key, value) in object {
        let name = FieldName::new(key);
        if name.as_str().is_empty() {
            warn!("Skipping field with blank name");
            continue;
        }
        match json_field_value(value) {
            Some(value) => {
                fields.insert(name, value);
            }
            None => warn!("Skipping field '{}': nested values are not supported", name),
        }
    }

    if fields.is_empty() {
        return Err(ExtractorError::ExtractionFailed(
            "Provider returned no fields".to_string(),
        ));
    }
    Ok(fields)
}

/// Extract the JSON object from a response, handling markdown code blocks
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let mut trimmed = response.trim();

    if trimmed.starts_with("```") {
        // Drop the opening fence line (```json or ```) and the closing fence
        trimmed = match trimmed.find('\n') {
            Some(newline) => &trimmed[newline + 1..],
            None => {
                return Err(ExtractorError::ExtractionFailed("Empty code block".to_string()));
            }
        };
        trimmed = trimmed.trim_end().trim_end_matches("```").trim();
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(trimmed);
    }

    // Some models prefix the object with a sentence
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&trimmed[start..=end]),
        _ => Err(ExtractorError::ExtractionFailed(
            "Response contains no JSON object".to_string(),
        )),
    }
}

/// Convert one JSON scalar to a field value.
///
/// Numbers are typed from their JSON text, so non-integers keep every digit
/// as a `Decimal`. Returns `None` for arrays and objects.
pub fn json_field_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Null => Some(FieldValue::Absent),
        Value::Bool(b) => Some(FieldValue::Boolean(*b)),
        Value::String(s) => Some(FieldValue::Text(s.clone())),
        Value::Number(n) => Some(number_value(n)),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn number_value(n: &Number) -> FieldValue {
    if let Some(i) = n.as_i64() {
        return FieldValue::Integer(i);
    }
    let repr = n.to_string();
    match Decimal::from_str(&repr).or_else(|_| Decimal::from_scientific(&repr)) {
        Ok(d) => FieldValue::Decimal(d),
        // Out of Decimal range: keep the number as written
        Err(_) => FieldValue::Text(repr),
    }
}

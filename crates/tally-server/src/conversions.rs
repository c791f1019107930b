//! JSON conversions for field maps and reports
//!
//! Response bodies keep field order and report values verbatim. Numbers stay
//! numbers, dates become ISO strings and absent values become `null`.

use serde_json::{Map, Number, Value};
use std::str::FromStr;
use tally_domain::value::DATE_FORMAT;
use tally_domain::{DiscrepancyReport, FieldMap, FieldValue};
use tally_extractor::json_field_value;
use tally_reconciler::ReconciliationOutcome;

/// Convert one field value to JSON
pub fn value_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => Value::String(s.clone()),
        FieldValue::Integer(n) => Value::from(*n),
        FieldValue::Decimal(d) => {
            let exact = d.to_string();
            match Number::from_str(&exact) {
                Ok(n) => Value::Number(n),
                Err(_) => Value::String(exact),
            }
        }
        FieldValue::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
        FieldValue::Boolean(b) => Value::Bool(*b),
        FieldValue::Absent => Value::Null,
    }
}

/// Convert a field map to a JSON object in field order
pub fn fields_to_json(fields: &FieldMap) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.to_string(), value_to_json(value)))
        .collect()
}

/// Convert a report to `{field: {"extracted": .., "canonical": ..}}`
pub fn report_to_json(report: &DiscrepancyReport) -> Map<String, Value> {
    report
        .iter()
        .map(|(name, entry)| {
            let mut pair = Map::new();
            pair.insert("extracted".to_string(), value_to_json(&entry.extracted));
            pair.insert("canonical".to_string(), value_to_json(&entry.canonical));
            (name.to_string(), Value::Object(pair))
        })
        .collect()
}

/// Response body for a reconciled document
pub fn outcome_to_json(outcome: &ReconciliationOutcome) -> Value {
    let mut body = Map::new();
    body.insert(
        "extracted_data".to_string(),
        Value::Object(fields_to_json(outcome.extraction.fields())),
    );
    body.insert(
        "database_data".to_string(),
        Value::Object(fields_to_json(outcome.canonical.fields())),
    );
    body.insert(
        "discrepancies".to_string(),
        Value::Object(report_to_json(&outcome.report)),
    );
    Value::Object(body)
}

/// Convert one JSON value to a field value.
///
/// Returns `None` for arrays and objects.
pub fn json_to_value(value: &Value) -> Option<FieldValue> {
    json_field_value(value)
}

/// Convert a JSON object to a field map
///
/// # Errors
///
/// Names the first field whose value is nested
pub fn json_to_fields(object: &Map<String, Value>) -> Result<FieldMap, String> {
    let mut fields = FieldMap::new();
    for (name, value) in object {
        let value = json_to_value(value)
            .ok_or_else(|| format!("Field '{}' must be a scalar or null", name))?;
        fields.insert(name.as_str(), value);
    }
    Ok(fields)
}

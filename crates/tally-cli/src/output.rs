//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use colored::{Color, Colorize};
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use tally_domain::{CanonicalRecord, DiscrepancyReport, ExtractionResult, FieldMap};
use tally_reconciler::ReconciliationOutcome;
use tally_server::conversions::{fields_to_json, outcome_to_json, report_to_json};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format an extraction.
    pub fn format_extraction(&self, extraction: &ExtractionResult) -> Result<String> {
        let provenance = extraction.provenance();
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "document": extraction.document().digest,
                "model": provenance.model,
                "extraction_id": provenance.extraction_id.to_string(),
                "fields": fields_to_json(extraction.fields()),
            }))?),
            OutputFormat::Table => {
                let header = self.info(&format!(
                    "{} fields from document {} ({})",
                    extraction.fields().len(),
                    extraction.document().short(),
                    provenance.model
                ));
                Ok(format!("{}\n{}", header, self.fields_table(extraction.fields())))
            }
        }
    }

    /// Format a canonical record.
    pub fn format_record(&self, record: &CanonicalRecord) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "identity": record.identity(),
                "source": record.source(),
                "fields": fields_to_json(record.fields()),
            }))?),
            OutputFormat::Table => {
                let header = self.info(&format!(
                    "Record '{}' from {}",
                    record.identity(),
                    record.source()
                ));
                Ok(format!("{}\n{}", header, self.fields_table(record.fields())))
            }
        }
    }

    /// Format a discrepancy report.
    pub fn format_report(&self, report: &DiscrepancyReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "discrepancies": report_to_json(report),
            }))?),
            OutputFormat::Table => Ok(self.report_table(report)),
        }
    }

    /// Format the result of a full check.
    pub fn format_outcome(&self, outcome: &ReconciliationOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&outcome_to_json(outcome))?),
            OutputFormat::Table => {
                let header = self.info(&format!(
                    "Checked '{}' against {} ({} fields extracted)",
                    outcome.canonical.identity(),
                    outcome.canonical.source(),
                    outcome.extraction.fields().len()
                ));
                Ok(format!("{}\n{}", header, self.report_table(&outcome.report)))
            }
        }
    }

    fn fields_table(&self, fields: &FieldMap) -> String {
        if fields.is_empty() {
            return self.warning("No fields.");
        }

        let mut builder = Builder::default();
        builder.push_record(["Field", "Value", "Type"]);
        for (name, value) in fields.iter() {
            builder.push_record([name.to_string(), value.to_string(), value.type_name().to_string()]);
        }
        self.render(builder)
    }

    fn report_table(&self, report: &DiscrepancyReport) -> String {
        if report.is_empty() {
            return self.success("No discrepancies.");
        }

        let mut builder = Builder::default();
        builder.push_record(["Field", "Extracted", "Canonical"]);
        for (name, entry) in report.iter() {
            builder.push_record([
                name.to_string(),
                entry.extracted.to_string(),
                entry.canonical.to_string(),
            ]);
        }
        let summary = self.warning(&format!("{} discrepancy(ies)", report.len()));
        format!("{}\n{}", self.render(builder), summary)
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.paint(&format!("✓ {}", message), Color::Green)
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.paint(&format!("✗ {}", message), Color::Red)
    }

    /// Format a failed command for stderr, naming its error kind when it has one.
    pub fn format_error(&self, err: &CliError) -> String {
        match err.kind() {
            Some(kind) => self.error(&format!("Error [{}]: {}", kind.code(), err)),
            None => self.error(&format!("Error: {}", err)),
        }
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.paint(&format!("ℹ {}", message), Color::Blue)
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.paint(&format!("⚠ {}", message), Color::Yellow)
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color_enabled {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Parse a JSON document into an object, for `diff` inputs.
pub fn parse_object(contents: &str) -> Result<serde_json::Map<String, Value>> {
    match serde_json::from_str::<Value>(contents)? {
        Value::Object(object) => Ok(object),
        other => Err(CliError::InvalidInput(format!(
            "expected a JSON object, found {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_domain::{DiscrepancyEntry, FieldName, FieldValue};

    fn report() -> DiscrepancyReport {
        let mut report = DiscrepancyReport::new();
        report.push(
            FieldName::new("Equity (in millions)"),
            DiscrepancyEntry::new(FieldValue::Integer(666), FieldValue::Integer(600)),
        );
        report
    }

    #[test]
    fn test_report_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_report(&report()).unwrap();
        assert!(output.contains("Extracted"));
        assert!(output.contains("Equity (in millions)"));
        assert!(output.contains("666"));
        assert!(output.contains("1 discrepancy(ies)"));
    }

    #[test]
    fn test_report_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_report(&report()).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["discrepancies"]["Equity (in millions)"]["extracted"], 666);
        assert_eq!(value["discrepancies"]["Equity (in millions)"]["canonical"], 600);
    }

    #[test]
    fn test_empty_report() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_report(&DiscrepancyReport::new()).unwrap();
        assert_eq!(output, "✓ No discrepancies.");
    }

    #[test]
    fn test_record_table_shows_absent() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let fields: FieldMap = vec![
            ("Company Name", FieldValue::text("HealthInc")),
            ("CEO", FieldValue::Absent),
        ]
        .into_iter()
        .collect();
        let record = CanonicalRecord::new("HealthInc", fields, "memory");

        let output = formatter.format_record(&record).unwrap();
        assert!(output.contains("Record 'HealthInc' from memory"));
        assert!(output.contains("(absent)"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.error("test"), "✗ test");
    }

    #[test]
    fn test_format_error() {
        let formatter = Formatter::new(OutputFormat::Table, false);

        let lookup = CliError::InvalidInput("identity must not be blank".to_string());
        assert_eq!(
            formatter.format_error(&lookup),
            "✗ Error [malformed_input]: Invalid input: identity must not be blank"
        );

        let config = CliError::Config("bad".to_string());
        assert_eq!(
            formatter.format_error(&config),
            "✗ Error: Configuration error: bad"
        );
    }

    #[test]
    fn test_parse_object() {
        assert!(parse_object(r#"{"Company Name": "HealthInc"}"#).is_ok());
        assert!(matches!(
            parse_object("[1, 2]"),
            Err(crate::error::CliError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_object("not json"),
            Err(crate::error::CliError::Serialization(_))
        ));
    }
}

//! Prompt construction for field extraction

use serde_json::{json, Map, Value};
use tally_domain::field::FieldName;

/// Builds prompts asking the provider for a single JSON object of fields
pub struct PromptBuilder<'a> {
    text: &'a str,
    vocabulary: &'a [FieldName],
    document_name: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder over document text and a field vocabulary
    pub fn new(text: &'a str, vocabulary: &'a [FieldName]) -> Self {
        Self {
            text,
            vocabulary,
            document_name: None,
        }
    }

    /// Mention the source file name in the prompt
    pub fn with_document_name(mut self, name: Option<&'a str>) -> Self {
        self.document_name = name;
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str("Fields to extract:\n");
        for name in self.vocabulary {
            prompt.push_str(&format!("- {}\n", name));
        }
        prompt.push('\n');

        if let Some(name) = self.document_name {
            prompt.push_str(&format!("Document: {}\n", name));
        }
        prompt.push_str("Document text:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n---\n\n");

        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }

    /// JSON schema constraining the provider's answer to the vocabulary
    pub fn schema(&self) -> String {
        let mut properties = Map::new();
        for name in self.vocabulary {
            properties.insert(
                name.as_str().to_string(),
                json!({ "type": ["string", "number", "boolean", "null"] }),
            );
        }
        let required: Vec<Value> = self
            .vocabulary
            .first()
            .map(|identity| vec![Value::String(identity.as_str().to_string())])
            .unwrap_or_default();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
        .to_string()
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You extract reported figures from a company's financial filing.

Read the document text and return the value reported for each field listed below.

Guidelines:
1. Use the field names exactly as listed as JSON keys
2. Report numbers as JSON numbers without currency symbols or thousands separators
3. Keep amounts in the unit the field name states (e.g. "in millions")
4. Use null for a field the document does not report
5. Do not invent values and do not add fields that are not listed
6. Text values (names, industries, locations) are copied as written"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Respond with a single JSON object and nothing else.
Example:
{"Company Name": "HealthInc", "Market Capitalization": 3000, "Equity (in millions)": 666}"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> Vec<FieldName> {
        vec![
            FieldName::new("Company Name"),
            FieldName::new("Equity (in millions)"),
        ]
    }

    #[test]
    fn test_prompt_lists_fields_in_order() {
        let fields = vocabulary();
        let prompt = PromptBuilder::new("HealthInc reports equity of 666", &fields).build();

        let company = prompt.find("- Company Name").unwrap();
        let equity = prompt.find("- Equity (in millions)").unwrap();
        assert!(company < equity);
        assert!(prompt.contains("HealthInc reports equity of 666"));
        assert!(prompt.contains("single JSON object"));
    }

    #[test]
    fn test_prompt_with_document_name() {
        let fields = vocabulary();
        let prompt = PromptBuilder::new("text", &fields)
            .with_document_name(Some("healthinc.pdf"))
            .build();
        assert!(prompt.contains("Document: healthinc.pdf"));
    }

    #[test]
    fn test_schema_requires_identity() {
        let fields = vocabulary();
        let schema: Value = serde_json::from_str(&PromptBuilder::new("t", &fields).schema()).unwrap();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["Company Name"]));
        assert!(schema["properties"]["Equity (in millions)"].is_object());
    }
}

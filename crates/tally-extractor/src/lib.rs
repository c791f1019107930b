//! Tally Extractor
//!
//! Turns a financial filing into a typed field map using a model provider.
//!
//! # Overview
//!
//! The Extractor is the only component that knows anything about document
//! formats. It resolves a document reference, sniffs the format, pulls the
//! text layer, asks the provider for a JSON object of fields and parses that
//! answer into a [`FieldMap`](tally_domain::FieldMap).
//!
//! # Architecture
//!
//! ```text
//! DocumentRef → bytes → format sniff → text → prompt → provider → FieldMap
//! ```
//!
//! # Key Features
//!
//! - **Typed output**: integers, exact decimals, booleans and text, never floats
//! - **Distinct failures**: not found, unsupported format, extraction failed
//! - **Timeouts**: the provider call is the only blocking step and is bounded
//! - **Content-keyed cache**: optional memoization by SHA-256 of document bytes
//!
//! # Example Usage
//!
//! ```no_run
//! use tally_extractor::{Extractor, ExtractorConfig};
//! use tally_domain::DocumentRef;
//! use tally_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = MockProvider::new(r#"{"Company Name": "HealthInc", "Equity (in millions)": 666}"#);
//! let extractor = Extractor::new(provider, ExtractorConfig::default())?;
//!
//! let result = extractor.extract(&DocumentRef::path("assets/healthinc.pdf")).await?;
//! println!("Extracted {} fields", result.fields().len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod document;
mod error;
mod extractor;
mod parser;
mod prompt;


pub use cache::ExtractionCache;
pub use config::ExtractorConfig;
pub use document::{content_digest, DocumentFormat};
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use parser::{json_field_value, parse_field_response};

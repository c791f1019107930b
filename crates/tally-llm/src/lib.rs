//! Tally Model Provider Layer
//!
//! Pluggable implementations of the `LlmProvider` trait from `tally-domain`.
//! The extractor hands a provider the document text and a field vocabulary and
//! expects a single JSON object back.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `HttpProvider`: Ollama-compatible `/api/generate` endpoint
//!
//! Provider credentials are opaque [`ProviderCredential`] values supplied at
//! construction. They are never printed or logged.
//!
//! # Examples
//!
//! ```
//! use tally_llm::MockProvider;
//! use tally_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new(r#"{"Company Name": "HealthInc"}"#);
//! let result = provider.generate("test prompt").unwrap();
//! assert!(result.contains("HealthInc"));
//! ```

#![warn(missing_docs)]

pub mod credential;
pub mod http;
mod mock;

use thiserror::Error;

pub use credential::ProviderCredential;
pub use http::HttpProvider;
pub use mock::MockProvider;

/// Errors that can occur during provider operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The provider rejected the credential
    #[error("Provider rejected credentials (HTTP {0})")]
    Unauthorized(u16),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

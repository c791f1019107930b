//! HTTP Provider Implementation
//!
//! Talks to an Ollama-compatible `/api/generate` endpoint, optionally behind a
//! gateway that expects a bearer credential.
//!
//! # Features
//!
//! - Async HTTP communication via `reqwest`
//! - JSON-schema constrained output (`format` field) for structured calls
//! - Deterministic sampling (temperature 0)
//! - Single attempt per call: retries belong to the caller, so a transient
//!   failure is never mistaken for an empty answer
//!
//! # Examples
//!
//! ```no_run
//! use tally_llm::{HttpProvider, ProviderCredential};
//!
//! let provider = HttpProvider::new("http://localhost:11434", "llama3.1")
//!     .unwrap()
//!     .with_credential(ProviderCredential::new("token"));
//! ```

use crate::credential::ProviderCredential;
use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tally_domain::traits::LlmProvider as LlmProviderTrait;
use tracing::debug;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default per-request HTTP timeout (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Provider backed by an Ollama-compatible HTTP API
pub struct HttpProvider {
    endpoint: String,
    model: String,
    credential: Option<ProviderCredential>,
    client: reqwest::Client,
}

/// Request body for the generate API
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<serde_json::Value>,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Response from the generate API
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl HttpProvider {
    /// Create a new provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with a specific HTTP timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            credential: None,
            client,
        })
    }

    /// Attach a credential, sent as a bearer token
    pub fn with_credential(mut self, credential: ProviderCredential) -> Self {
        if !credential.is_empty() {
            self.credential = Some(credential);
        }
        self
    }

    /// API base URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Generate text, optionally constrained by a JSON schema
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The endpoint is unreachable
    /// - The credential is rejected
    /// - The model is not available
    /// - The response format is invalid
    pub async fn generate_async(
        &self,
        prompt: &str,
        format: Option<serde_json::Value>,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);

        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format,
            options: GenerateOptions { temperature: 0.0 },
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(credential) = &self.credential {
            request = request.bearer_auth(credential.expose());
        }

        debug!("POST {} (model {}, prompt {} chars)", url, self.model, prompt.len());

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            let parsed = response
                .json::<GenerateResponse>()
                .await
                .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
            return Ok(parsed.response);
        }

        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Err(LlmError::Unauthorized(status.as_u16()))
            }
            reqwest::StatusCode::NOT_FOUND => Err(LlmError::ModelNotAvailable(self.model.clone())),
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(LlmError::RateLimitExceeded),
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)))
            }
        }
    }
}

/// Drive a future to completion from synchronous code.
///
/// Inside a Tokio blocking task this reuses the ambient runtime; outside any
/// runtime a throwaway current-thread runtime is built. Must not be called
/// from an async task directly.
fn block_on<F: Future>(fut: F) -> Result<F::Output, LlmError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Ok(handle.block_on(fut)),
        Err(_) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?;
            Ok(runtime.block_on(fut))
        }
    }
}

impl LlmProviderTrait for HttpProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        block_on(self.generate_async(prompt, None))?
    }

    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error> {
        let format = match serde_json::from_str::<serde_json::Value>(schema) {
            Ok(value) => value,
            Err(_) => serde_json::Value::String("json".to_string()),
        };
        block_on(self.generate_async(prompt, Some(format)))?
    }
}

//! Scripted provider for tests
//!
//! Answers come from a per-prompt script with a fallback for everything else.
//! Clones share the script and the call log, so a test can keep a handle on a
//! provider it moved into an extractor.

use crate::LlmError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tally_domain::traits::LlmProvider;

/// What the provider does for a prompt
#[derive(Debug, Clone)]
enum Scripted {
    Answer(String),
    Failure,
}

impl Scripted {
    fn play(&self) -> Result<String, LlmError> {
        match self {
            Scripted::Answer(answer) => Ok(answer.clone()),
            Scripted::Failure => Err(LlmError::Other("Mock error".to_string())),
        }
    }
}

/// Mock provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
///
/// # Examples
///
/// ```
/// use tally_llm::MockProvider;
/// use tally_domain::traits::LlmProvider;
///
/// // Simple fixed response
/// let provider = MockProvider::new("{}");
/// assert_eq!(provider.generate("any prompt").unwrap(), "{}");
///
/// // Prompt-specific responses
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// assert_eq!(provider.generate("prompt1").unwrap(), "response1");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
    fallback: Scripted,
    script: Arc<Mutex<HashMap<String, Scripted>>>,
    calls: Arc<AtomicUsize>,
    last_schema: Arc<Mutex<Option<String>>>,
    delay: Option<Duration>,
}

/// Lock a mutex, recovering the data if a panicking test poisoned it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a provider that answers every prompt with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self::scripted(Scripted::Answer(response.into()))
    }

    /// Create a provider that fails every call
    pub fn failing() -> Self {
        Self::scripted(Scripted::Failure)
    }

    fn scripted(fallback: Scripted) -> Self {
        Self {
            model: "mock".to_string(),
            fallback,
            script: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            last_schema: Arc::new(Mutex::new(None)),
            delay: None,
        }
    }

    /// Report a different model name
    pub fn with_model_name(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Block before answering, to exercise caller timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer `prompt` with `response`
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.script).insert(prompt.into(), Scripted::Answer(response.into()));
    }

    /// Fail whenever `prompt` is sent
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        lock(&self.script).insert(prompt.into(), Scripted::Failure);
    }

    /// Number of calls so far, across all clones
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    /// Schema passed to the most recent structured call
    pub fn last_schema(&self) -> Option<String> {
        lock(&self.last_schema).clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let scripted = lock(&self.script).get(prompt).cloned();
        scripted.unwrap_or_else(|| self.fallback.clone()).play()
    }

    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error> {
        *lock(&self.last_schema) = Some(schema.to_string());
        self.generate(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_answer() {
        let provider = MockProvider::new(r#"{"Company Name": "HealthInc"}"#);
        assert_eq!(
            provider.generate("any prompt").unwrap(),
            r#"{"Company Name": "HealthInc"}"#
        );
        assert_eq!(provider.model_name(), "mock");
    }

    #[test]
    fn test_scripted_answers() {
        let mut provider = MockProvider::default();
        provider.add_response("filing A", r#"{"Company Name": "HealthInc"}"#);
        provider.add_error("filing B");

        assert!(provider.generate("filing A").unwrap().contains("HealthInc"));
        assert!(matches!(provider.generate("filing B"), Err(LlmError::Other(_))));
        assert_eq!(provider.generate("filing C").unwrap(), "{}");
    }

    #[test]
    fn test_scripted_answer_overrides_failing_fallback() {
        let mut provider = MockProvider::failing();
        provider.add_response("known", "{}");

        assert!(provider.generate("known").is_ok());
        assert!(provider.generate("unknown").is_err());
    }

    #[test]
    fn test_call_count() {
        let provider = MockProvider::failing();
        assert_eq!(provider.call_count(), 0);

        assert!(provider.generate("one").is_err());
        assert!(provider.generate("two").is_err());
        assert_eq!(provider.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_records_schema() {
        let provider = MockProvider::new("{}");
        assert!(provider.last_schema().is_none());

        provider.generate_structured("prompt", r#"{"type":"object"}"#).unwrap();
        assert_eq!(provider.last_schema().as_deref(), Some(r#"{"type":"object"}"#));
    }

    #[test]
    fn test_clone_shares_state() {
        let original = MockProvider::new("{}").with_model_name("fixture-model");
        let clone = original.clone();

        original.generate("prompt").unwrap();

        assert_eq!(clone.call_count(), 1);
        assert_eq!(clone.model_name(), "fixture-model");
    }
}

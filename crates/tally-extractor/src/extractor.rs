//! Main extractor implementation

use crate::cache::ExtractionCache;
use crate::config::ExtractorConfig;
use crate::document::{content_digest, document_text, load_bytes, DocumentFormat};
use crate::error::ExtractorError;
use crate::parser::parse_field_response;
use crate::prompt::PromptBuilder;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tally_domain::field::FieldName;
use tally_domain::traits::{FieldExtractor, LlmProvider};
use tally_domain::{DocumentId, DocumentRef, ExtractionResult};
use tracing::{debug, info, warn};

/// Field extractor backed by a model provider
///
/// The extractor:
/// 1. Resolves the document reference and sniffs its format
/// 2. Pulls the text layer
/// 3. Prompts the provider for the configured field vocabulary
/// 4. Parses the answer into a typed field map
pub struct Extractor<L> {
    provider: Arc<L>,
    config: ExtractorConfig,
    vocabulary: Vec<FieldName>,
    cache: Option<ExtractionCache>,
}

impl<L> Extractor<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a new extractor
    ///
    /// # Errors
    ///
    /// Returns `ExtractorError::Config` if the configuration is invalid
    pub fn new(provider: L, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        let vocabulary = config.vocabulary();
        let cache = (config.cache_capacity > 0).then(|| ExtractionCache::new(config.cache_capacity));

        Ok(Self {
            provider: Arc::new(provider),
            config,
            vocabulary,
            cache,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Name of the model behind the provider
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// The result cache, if enabled
    pub fn cache(&self) -> Option<&ExtractionCache> {
        self.cache.as_ref()
    }

    /// Extract a typed field map from a document
    ///
    /// # Errors
    ///
    /// - `DocumentNotFound` if the reference cannot be read
    /// - `UnsupportedFormat` if the content is neither PDF nor text
    /// - `ExtractionFailed` or `Timeout` if no field map could be produced
    pub async fn extract(&self, document: &DocumentRef) -> Result<ExtractionResult, ExtractorError> {
        let start = Instant::now();

        let data = load_bytes(document).await?;
        let byte_len = data.len();
        let format = DocumentFormat::sniff(&data).ok_or_else(|| {
            ExtractorError::UnsupportedFormat(
                "content is neither a PDF nor plain text".to_string(),
            )
        })?;

        let digest = content_digest(&data);
        let document_id = DocumentId::new(digest, document.display_name());

        if let Some(cache) = &self.cache {
            if let Some(fields) = cache.get(&document_id.digest, byte_len) {
                debug!("Cache hit for document {}", document_id.short());
                return Ok(ExtractionResult::new(
                    fields,
                    document_id,
                    self.provider.model_name(),
                    unix_now(),
                ));
            }
        }

        info!(
            "Extracting fields from {} document {} ({} bytes)",
            format,
            document_id.short(),
            byte_len
        );

        let text = tokio::task::spawn_blocking(move || document_text(format, &data))
            .await
            .map_err(|e| ExtractorError::ExtractionFailed(format!("Text layer task failed: {}", e)))??;

        let text_len = text.chars().count();
        if text_len > self.config.max_text_length {
            return Err(ExtractorError::ExtractionFailed(format!(
                "Document text too long: {} characters (max: {})",
                text_len, self.config.max_text_length
            )));
        }

        let builder =
            PromptBuilder::new(&text, &self.vocabulary).with_document_name(document_id.name.as_deref());
        let prompt = builder.build();
        let schema = builder.schema();
        debug!("Prompt is {} characters for {} text characters", prompt.len(), text_len);

        let response = self.call_provider(prompt, schema).await?;
        let fields = parse_field_response(&response)?;

        let missing = self
            .vocabulary
            .iter()
            .filter(|name| !fields.contains(name.as_str()))
            .count();
        if missing > 0 {
            debug!("Provider left {} vocabulary fields unanswered", missing);
        }

        if let Some(cache) = &self.cache {
            cache.insert(&document_id.digest, byte_len, fields.clone());
        }

        let result = ExtractionResult::new(
            fields,
            document_id,
            self.provider.model_name(),
            unix_now(),
        );

        info!(
            "Extracted {} fields from document {} in {:?}",
            result.fields().len(),
            result.document().short(),
            start.elapsed()
        );

        Ok(result)
    }

    /// Run the provider on a blocking task, bounded by the configured timeout
    async fn call_provider(&self, prompt: String, schema: String) -> Result<String, ExtractorError> {
        let provider = Arc::clone(&self.provider);
        let task = tokio::task::spawn_blocking(move || {
            provider
                .generate_structured(&prompt, &schema)
                .map_err(|e| e.to_string())
        });

        match tokio::time::timeout(self.config.extraction_timeout(), task).await {
            Ok(Ok(Ok(response))) => Ok(response),
            Ok(Ok(Err(e))) => {
                warn!("Provider call failed: {}", e);
                Err(ExtractorError::ExtractionFailed(format!("Provider error: {}", e)))
            }
            Ok(Err(e)) => Err(ExtractorError::ExtractionFailed(format!(
                "Provider task failed: {}",
                e
            ))),
            Err(_) => {
                warn!(
                    "Provider call exceeded {}s timeout",
                    self.config.extraction_timeout_secs
                );
                Err(ExtractorError::Timeout(self.config.extraction_timeout_secs))
            }
        }
    }
}

impl<L> FieldExtractor for Extractor<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    type Error = ExtractorError;

    fn extract(
        &self,
        document: &DocumentRef,
    ) -> impl Future<Output = Result<ExtractionResult, Self::Error>> + Send {
        Extractor::extract(self, document)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

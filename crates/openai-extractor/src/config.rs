use std::fmt::Debug;
use std::sync::Arc;

use backoff::backoff::{Backoff, Zero};

/// The extraction prompt used when the host does not supply one.
pub const DEFAULT_PROMPT: &str = "Please only recognize and extract the \
text or data from this image without interpreting, analyzing, or \
understanding the content. Do not output any additional information. \
Simply return the recognized text or data content.";

/// The model used when the host does not supply one.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// The base URL used when the host does not supply one.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// The total attempt bound used when the host does not supply one.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Factory producing a fresh retry-delay policy for one extraction
/// call.
///
/// The policy only controls the delay between attempts; the attempt
/// bound is always `max_retries`. A policy that returns `None` simply
/// means no further delay.
pub type RetryBackoff = Arc<dyn Fn() -> Box<dyn Backoff + Send> + Send + Sync>;

/// Builder for [`OcrConfig`].
#[derive(Clone)]
pub struct OcrConfigBuilder {
    api_key: String,
    model: Option<String>,
    base_url: Option<String>,
    prompt: Option<String>,
    max_retries: Option<u32>,
    retry_backoff: Option<RetryBackoff>,
}

impl OcrConfigBuilder {
    /// Creates a builder with the given API key.
    #[inline]
    pub fn with_api_key<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            model: None,
            base_url: None,
            prompt: None,
            max_retries: None,
            retry_backoff: None,
        }
    }

    /// Sets the vision model to extract text with.
    #[inline]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the extraction prompt.
    #[inline]
    pub fn with_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Sets the total attempt bound. Values below 1 are clamped to 1.
    #[inline]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Sets the retry-delay policy, given as a factory that yields a
    /// fresh policy for each extraction call.
    #[inline]
    pub fn with_retry_backoff(
        mut self,
        factory: impl Fn() -> Box<dyn Backoff + Send> + Send + Sync + 'static,
    ) -> Self {
        self.retry_backoff = Some(Arc::new(factory));
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> OcrConfig {
        OcrConfig {
            api_key: self.api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            prompt: self.prompt.unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES).max(1),
            retry_backoff: self
                .retry_backoff
                .unwrap_or_else(|| Arc::new(|| Box::new(Zero {}))),
        }
    }
}

impl Debug for OcrConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrConfigBuilder")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("prompt", &self.prompt)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

/// Configuration for the OpenAI-compatible extractor.
#[derive(Clone)]
pub struct OcrConfig {
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) prompt: String,
    pub(crate) max_retries: u32,
    pub(crate) retry_backoff: RetryBackoff,
}

impl Debug for OcrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("prompt", &self.prompt)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

use std::fmt::Debug;

use ocr_filter_openai_extractor::{
    DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_PROMPT,
};
use serde::{Deserialize, Serialize};

/// Host-recognized configuration options, keyed the way the host
/// spells them. Every field falls back to a default when the host
/// omits it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Ordering hint among sibling interceptors. Exposed to the host,
    /// never used internally.
    pub priority: i32,
    /// Base URL of the extraction endpoint.
    #[serde(rename = "OCR_Base_URL")]
    pub base_url: String,
    /// API key for the extraction endpoint.
    #[serde(rename = "OCR_API_KEY")]
    pub api_key: String,
    /// Total attempt bound for one extraction call.
    pub max_retries: u32,
    /// The extraction prompt.
    pub ocr_prompt: String,
    /// The vision model to extract text with.
    pub model_name: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            priority: 0,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            max_retries: DEFAULT_MAX_RETRIES,
            ocr_prompt: DEFAULT_PROMPT.to_string(),
            model_name: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("priority", &self.priority)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("max_retries", &self.max_retries)
            .field("ocr_prompt", &self.ocr_prompt)
            .field("model_name", &self.model_name)
            .finish()
    }
}

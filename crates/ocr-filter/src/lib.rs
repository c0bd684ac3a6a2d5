//! An inlet filter that replaces the first image of a chat
//! conversation with text extracted by a remote vision model.
//!
//! This crate wires the host-recognized configuration options into the
//! OpenAI-compatible extraction backend and the core filter, and
//! exposes the hook surface a pipeline host calls once per turn. Hosts
//! with their own extraction backend can depend on the member crates
//! directly instead.

#![deny(missing_docs)]

mod options;

pub use options::Options;

/// Re-exports of the [`ocr_filter_core`] crate.
pub mod core {
    pub use ocr_filter_core::*;
}

/// Re-exports of the [`ocr_filter_model`] crate.
pub mod model {
    pub use ocr_filter_model::*;
}

use ocr_filter_core::{Filter, FilterBuilder};
use ocr_filter_model::{ChatPayload, EventSink};
use ocr_filter_openai_extractor::{OcrConfigBuilder, OpenAiExtractor};
use serde_json::Value;

/// The assembled filter, exposing the hook surface the pipeline host
/// invokes once per turn.
pub struct OcrImageFilter {
    filter: Filter,
}

impl OcrImageFilter {
    /// Creates a filter from host-supplied options.
    pub fn new(options: Options) -> Self {
        let config = OcrConfigBuilder::with_api_key(options.api_key)
            .with_base_url(options.base_url)
            .with_model(options.model_name)
            .with_prompt(options.ocr_prompt)
            .with_max_retries(options.max_retries)
            .build();
        let filter =
            FilterBuilder::with_extractor(OpenAiExtractor::new(config))
                .with_priority(options.priority)
                .build();
        Self { filter }
    }

    /// Returns the ordering hint among sibling interceptors.
    #[inline]
    pub fn priority(&self) -> i32 {
        self.filter.priority()
    }

    /// Pre-call hook. See [`Filter::inlet`].
    ///
    /// `user` and `model_info` are accepted for hook-signature
    /// compatibility with the host and ignored.
    pub async fn inlet(
        &self,
        payload: ChatPayload,
        sink: &dyn EventSink,
        _user: Option<&Value>,
        _model_info: Option<&Value>,
    ) -> ChatPayload {
        self.filter.inlet(payload, sink).await
    }

    /// Post-call hook. See [`Filter::outlet`].
    pub async fn outlet(
        &self,
        payload: ChatPayload,
        sink: &dyn EventSink,
        _user: Option<&Value>,
        _model_info: Option<&Value>,
    ) -> ChatPayload {
        self.filter.outlet(payload, sink).await
    }
}

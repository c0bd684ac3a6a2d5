use async_trait::async_trait;

use crate::error::ExtractionError;
use crate::event::EventSink;

/// A backend that turns an image reference into extracted text.
///
/// Once the extractor is created, it should behave like a stateless
/// object: callers may share it across concurrent conversations, and
/// the extractor should be prepared for being dropped anytime, which
/// aborts whatever request is in flight.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extracts the text content of the referenced image.
    ///
    /// A status event is emitted on `sink` before the first network
    /// attempt, and another one after the final attempt has succeeded.
    /// Retries happen inside this call; the returned error is
    /// terminal and no event follows it.
    async fn extract(
        &self,
        image_url: &str,
        sink: &dyn EventSink,
    ) -> Result<String, ExtractionError>;
}

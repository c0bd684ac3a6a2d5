
use std::sync::Arc;

use ocr_filter_model::{ChatPayload, ContentPart, EventSink, TextExtractor};

use crate::scan;

/// [`Filter`] builder.
pub struct FilterBuilder {
    extractor: Arc<dyn TextExtractor>,
    priority: i32,
}

impl FilterBuilder {
    /// Creates a new builder with the specified extraction backend.
    #[inline]
    pub fn with_extractor<E: TextExtractor + 'static>(extractor: E) -> Self {
        Self::with_shared_extractor(Arc::new(extractor))
    }

    /// Like [`FilterBuilder::with_extractor`], for a backend that the
    /// caller keeps a handle to.
    #[inline]
    pub fn with_shared_extractor(extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            extractor,
            priority: 0,
        }
    }

    /// Sets the ordering hint exposed to the host.
    #[inline]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Builds the filter.
    #[inline]
    pub fn build(self) -> Filter {
        Filter {
            extractor: self.extractor,
            priority: self.priority,
        }
    }
}

/// The inlet coordinator.
///
/// Decides, once per incoming payload, what happens to the first image
/// of the conversation: substituted with extracted text on the first
/// exchange, silently dropped on later ones, or nothing at all when no
/// image is present. The filter is stateless across invocations and
/// can be shared between concurrent conversations.
pub struct Filter {
    extractor: Arc<dyn TextExtractor>,
    priority: i32,
}

impl Filter {
    /// Returns the ordering hint among sibling interceptors. The
    /// filter itself never consults it.
    #[inline]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Pre-call hook, invoked by the host before the primary model
    /// call.
    ///
    /// When the first exchange of the conversation carries an image,
    /// the image item is replaced in place with the text extracted
    /// from it, and progress is reported through `sink`. On later
    /// exchanges the image item is removed without any network call.
    /// An extraction failure is logged and the payload is returned
    /// exactly as received; it never aborts the host turn.
    ///
    /// Dropping the returned future aborts any in-flight extraction;
    /// the payload is only mutated after the extraction succeeded, so
    /// a cancelled call never leaves a partially retyped item behind.
    pub async fn inlet(
        &self,
        mut payload: ChatPayload,
        sink: &dyn EventSink,
    ) -> ChatPayload {
        let Some(location) = scan::find_first_image(&payload.messages) else {
            return payload;
        };

        if payload.rounds() >= 1 {
            // Only the first exchange pays the extraction cost; later
            // rounds drop stray images instead of re-processing them.
            trace!("dropping image past the first round: {:?}", location);
            if let Some(parts) =
                payload.messages[location.message_index].parts_mut()
            {
                parts.remove(location.content_index);
            }
            return payload;
        }

        match self.extractor.extract(&location.url, sink).await {
            Ok(text) => {
                trace!(
                    "substituting image at {:?} with {} chars of text",
                    location,
                    text.len()
                );
                if let Some(parts) =
                    payload.messages[location.message_index].parts_mut()
                {
                    parts[location.content_index] = ContentPart::text(text);
                }
            }
            Err(err) => {
                // Degrade to a pass-through: the model still sees the
                // original payload and the turn goes on.
                error!("image extraction failed: {err}");
            }
        }
        payload
    }

    /// Post-call hook, invoked by the host after the primary model
    /// call. Currently a pass-through, kept as the place for future
    /// post-processing.
    #[inline]
    pub async fn outlet(
        &self,
        payload: ChatPayload,
        _sink: &dyn EventSink,
    ) -> ChatPayload {
        payload
    }
}

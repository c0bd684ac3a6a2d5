use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A progress event forwarded to the host's observer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Event {
    /// A human-readable status update.
    Status(StatusData),
}

impl Event {
    /// Creates a status event.
    #[inline]
    pub fn status<S: Into<String>>(description: S, done: bool) -> Self {
        Event::Status(StatusData {
            description: description.into(),
            done,
        })
    }
}

/// The payload of an [`Event::Status`] event.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusData {
    /// Description shown to the user.
    pub description: String,
    /// Whether the described operation has finished.
    pub done: bool,
}

/// The notification sink supplied by the host.
///
/// Delivery is fire-and-forget from the filter's perspective, but every
/// `notify` call is awaited before the pipeline proceeds, so observers
/// see events in the order they were emitted.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Delivers one event to the observer.
    async fn notify(&self, event: Event);
}

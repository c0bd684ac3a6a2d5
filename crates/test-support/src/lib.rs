//! Local fakes of the extraction backend and the notification sink,
//! for testing purpose.

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Mutex;

use async_trait::async_trait;
use ocr_filter_model::{
    ErrorKind, Event, EventSink, ExtractionError, ExtractorError,
    TextExtractor,
};

/// The error a [`ScriptedExtractor`] fails with.
#[derive(Debug)]
pub struct Error {
    message: &'static str,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ExtractorError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        ErrorKind::Application
    }
}

/// A fake extraction backend driven by a script of outcomes.
///
/// Before using the extractor, push one outcome per expected
/// `extract` call. Each call consumes the front of the script and
/// mirrors the real backend's event protocol: a not-done status event
/// first, and a done status event only on success. Calls beyond the
/// end of the script fail.
///
/// # Note
///
/// This type is for testing only; it takes locks liberally and keeps
/// every request it has seen.
#[derive(Default)]
pub struct ScriptedExtractor {
    script: Mutex<VecDeque<Result<String, &'static str>>>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedExtractor {
    /// Appends a successful outcome yielding `text`.
    pub fn succeed_with<S: Into<String>>(&self, text: S) {
        self.script.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Appends a failing outcome.
    pub fn fail_with(&self, reason: &'static str) {
        self.script.lock().unwrap().push_back(Err(reason));
    }

    /// Returns the image references `extract` has been called with,
    /// in call order.
    pub fn extractions(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextExtractor for ScriptedExtractor {
    async fn extract(
        &self,
        image_url: &str,
        sink: &dyn EventSink,
    ) -> Result<String, ExtractionError> {
        self.seen.lock().unwrap().push(image_url.to_owned());
        let outcome = self.script.lock().unwrap().pop_front();

        sink.notify(Event::status("extracting text from the image", false))
            .await;
        match outcome {
            Some(Ok(text)) => {
                sink.notify(Event::status("text extracted", true)).await;
                Ok(text)
            }
            Some(Err(reason)) => {
                Err(ExtractionError::exhausted(1, Error { message: reason }))
            }
            None => Err(ExtractionError::exhausted(
                1,
                Error {
                    message: "script exhausted",
                },
            )),
        }
    }
}

/// A notification sink that records every event it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    /// Returns the events received so far, in delivery order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn notify(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

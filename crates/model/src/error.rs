use std::error::Error as StdError;
use std::fmt::{self, Display};

/// The kind of error a single extraction attempt failed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request could not be sent or completed.
    Transport,
    /// The endpoint answered, but not with a usable result.
    Application,
}

/// The error type for a single attempt against an extraction backend.
///
/// Attempt-level errors never escape the backend; they only surface as
/// the cause wrapped into a terminal [`ExtractionError`].
pub trait ExtractorError: StdError + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// Terminal extraction failure, produced once every retry attempt has
/// been exhausted.
#[derive(Debug)]
pub struct ExtractionError {
    attempts: u32,
    source: Box<dyn StdError + Send + Sync>,
}

impl ExtractionError {
    /// Creates an error wrapping the last attempt's failure.
    #[inline]
    pub fn exhausted(
        attempts: u32,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            attempts,
            source: Box::new(source),
        }
    }

    /// Returns how many attempts were made before giving up.
    #[inline]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "text extraction failed after {} attempt(s): {}",
            self.attempts, self.source
        )
    }
}

impl StdError for ExtractionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

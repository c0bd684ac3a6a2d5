//! A text-extraction backend for OpenAI-compatible vision APIs.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use async_trait::async_trait;
use ocr_filter_model::{
    ErrorKind, Event, EventSink, ExtractionError, ExtractorError,
    TextExtractor,
};
use reqwest::{Client, header};
use tokio::time::sleep;

pub use config::{
    DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_PROMPT,
    OcrConfig, OcrConfigBuilder, RetryBackoff,
};
use proto::ChatCompletionResponse;

/// Error type for a single attempt of [`OpenAiExtractor`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ExtractorError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Text extractor backed by an OpenAI-compatible
/// `/v1/chat/completions` endpoint.
#[derive(Clone, Debug)]
pub struct OpenAiExtractor {
    config: Arc<OcrConfig>,
}

impl OpenAiExtractor {
    /// Creates a new `OpenAiExtractor` with the given configuration.
    #[inline]
    pub fn new(config: OcrConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    async fn attempt(
        &self,
        client: &Client,
        url: &str,
        req: &proto::ChatCompletionRequest,
    ) -> Result<String, Error> {
        let resp = client
            .post(url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .json(req)
            .send()
            .await
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Transport))?;

        let resp = resp.error_for_status().map_err(|err| {
            Error::new(format!("{err}"), ErrorKind::Application)
        })?;
        let parsed: ChatCompletionResponse = resp.json().await.map_err(|err| {
            Error::new(format!("{err}"), ErrorKind::Application)
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                Error::new(
                    "response contains no extracted text",
                    ErrorKind::Application,
                )
            })
    }
}

#[async_trait]
impl TextExtractor for OpenAiExtractor {
    async fn extract(
        &self,
        image_url: &str,
        sink: &dyn EventSink,
    ) -> Result<String, ExtractionError> {
        sink.notify(Event::status("extracting text from the image", false))
            .await;

        let req = proto::create_request(image_url, &self.config);
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        // One session per extraction call; all attempts of this call
        // share it, other calls never do.
        let client = Client::new();
        let mut delays = (self.config.retry_backoff)();
        let max_attempts = self.config.max_retries;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match self.attempt(&client, &url, &req).await {
                Ok(text) => {
                    trace!("extraction succeeded on attempt {attempt}");
                    sink.notify(Event::status(
                        "text extracted, forwarding to the model",
                        true,
                    ))
                    .await;
                    return Ok(text);
                }
                Err(err) => err,
            };
            warn!("extraction attempt {attempt}/{max_attempts} failed: {err}");
            if attempt >= max_attempts {
                return Err(ExtractionError::exhausted(attempt, err));
            }
            if let Some(delay) = delays.next_backoff() {
                if !delay.is_zero() {
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use backoff::backoff::Backoff;
    use ocr_filter_test_support::RecordingSink;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    use super::*;

    fn test_config(server: &MockServer, max_retries: u32) -> OcrConfig {
        OcrConfigBuilder::with_api_key("test-key")
            .with_base_url(server.uri())
            .with_model("vision-test")
            .with_prompt("Read the image.")
            .with_max_retries(max_retries)
            .build()
    }

    fn success_body() -> serde_json::Value {
        json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Invoice #42" } }
            ]
        })
    }

    #[tokio::test]
    async fn test_success_first_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "vision-test",
                "messages": [
                    { "role": "system" },
                    {
                        "role": "user",
                        "content": [
                            { "type": "text", "text": "Read the image." },
                            {
                                "type": "image_url",
                                "image_url": { "url": "data:a", "detail": "high" }
                            }
                        ]
                    }
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(success_body()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let extractor = OpenAiExtractor::new(test_config(&server, 3));
        let sink = RecordingSink::default();
        let text = extractor.extract("data:a", &sink).await.unwrap();
        assert_eq!(text, "Invoice #42");

        let events = sink.events();
        assert_eq!(
            events,
            vec![
                Event::status("extracting text from the image", false),
                Event::status("text extracted, forwarding to the model", true),
            ]
        );
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(success_body()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let extractor = OpenAiExtractor::new(test_config(&server, 3));
        let sink = RecordingSink::default();
        let text = extractor.extract("data:a", &sink).await.unwrap();
        assert_eq!(text, "Invoice #42");
    }

    #[tokio::test]
    async fn test_exhausts_after_max_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let extractor = OpenAiExtractor::new(test_config(&server, 3));
        let sink = RecordingSink::default();
        let err = extractor.extract("data:a", &sink).await.unwrap_err();
        assert_eq!(err.attempts(), 3);

        // Nothing follows a terminal failure.
        assert_eq!(
            sink.events(),
            vec![Event::status("extracting text from the image", false)]
        );
    }

    #[tokio::test]
    async fn test_response_without_text_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "choices": [] })),
            )
            .expect(2)
            .mount(&server)
            .await;

        let extractor = OpenAiExtractor::new(test_config(&server, 2));
        let sink = RecordingSink::default();
        let err = extractor.extract("data:a", &sink).await.unwrap_err();
        assert_eq!(err.attempts(), 2);
    }

    struct LogSink {
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl EventSink for LogSink {
        async fn notify(&self, event: Event) {
            let Event::Status(data) = event;
            self.log
                .lock()
                .unwrap()
                .push(format!("status done={}", data.done));
        }
    }

    struct LogResponder {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Respond for LogResponder {
        fn respond(&self, _request: &Request) -> ResponseTemplate {
            self.log.lock().unwrap().push("attempt".to_owned());
            ResponseTemplate::new(200).set_body_json(success_body())
        }
    }

    #[tokio::test]
    async fn test_notification_ordering() {
        let server = MockServer::start().await;
        let log = Arc::new(Mutex::new(Vec::new()));
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(LogResponder {
                log: Arc::clone(&log),
            })
            .mount(&server)
            .await;

        let extractor = OpenAiExtractor::new(test_config(&server, 3));
        let sink = LogSink {
            log: Arc::clone(&log),
        };
        extractor.extract("data:a", &sink).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            ["status done=false", "attempt", "status done=true"]
        );
    }

    #[derive(Clone)]
    struct CountingBackoff {
        consulted: Arc<Mutex<u32>>,
    }

    impl Backoff for CountingBackoff {
        fn next_backoff(&mut self) -> Option<Duration> {
            *self.consulted.lock().unwrap() += 1;
            Some(Duration::ZERO)
        }
    }

    #[tokio::test]
    async fn test_retry_policy_consulted_between_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(success_body()),
            )
            .mount(&server)
            .await;

        let consulted = Arc::new(Mutex::new(0));
        let policy = CountingBackoff {
            consulted: Arc::clone(&consulted),
        };
        let config = OcrConfigBuilder::with_api_key("test-key")
            .with_base_url(server.uri())
            .with_max_retries(3)
            .with_retry_backoff(move || Box::new(policy.clone()))
            .build();

        let extractor = OpenAiExtractor::new(config);
        let sink = RecordingSink::default();
        extractor.extract("data:a", &sink).await.unwrap();

        // Once between each pair of consecutive attempts.
        assert_eq!(*consulted.lock().unwrap(), 2);
    }
}

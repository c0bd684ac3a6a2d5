use serde::{Deserialize, Serialize};

use crate::OcrConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System { content: Vec<ContentPart> },
    User { content: Vec<ContentPart> },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ImageUrl {
    url: String,
    detail: String,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    image_url: &str,
    config: &OcrConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: vec![
            Message::System {
                content: vec![ContentPart::Text {
                    text: config.prompt.clone(),
                }],
            },
            Message::User {
                content: vec![
                    ContentPart::Text {
                        text: config.prompt.clone(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_url.to_owned(),
                            // The extraction result is only as good as
                            // the input, so always request full fidelity.
                            detail: "high".to_owned(),
                        },
                    },
                ],
            },
        ],
    }
}

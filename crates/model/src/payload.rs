use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The request payload of one conversation turn.
///
/// Only the message list is interpreted by the filter. Every other
/// field the host put into the payload (model selection, sampling
/// parameters, stream flags, ...) is captured verbatim and written
/// back unchanged when the payload is serialized again.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatPayload {
    /// The conversation messages, in turn order.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Host fields that this filter does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatPayload {
    /// Creates a payload from a message list.
    #[inline]
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            extra: Map::new(),
        }
    }

    /// Returns the number of completed user/assistant exchanges,
    /// computed as `messages.len() / 2`.
    ///
    /// The first exchange of a conversation is still in flight while
    /// this is `0`.
    #[inline]
    pub fn rounds(&self) -> usize {
        self.messages.len() / 2
    }
}

/// A single message of the conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The speaker role, usually `"user"` or `"assistant"`. Unknown
    /// roles round-trip unchanged.
    pub role: String,
    /// The message content. Absent content stays absent when the
    /// message is serialized again.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    /// Message fields that this filter does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Creates a message with scalar text content.
    #[inline]
    pub fn with_text<R, T>(role: R, text: T) -> Self
    where
        R: Into<String>,
        T: Into<String>,
    {
        Self {
            role: role.into(),
            content: Some(MessageContent::Text(text.into())),
            extra: Map::new(),
        }
    }

    /// Creates a message with sequence-valued content.
    #[inline]
    pub fn with_parts<R: Into<String>>(role: R, parts: Vec<ContentPart>) -> Self {
        Self {
            role: role.into(),
            content: Some(MessageContent::Parts(parts)),
            extra: Map::new(),
        }
    }

    /// Returns the content parts if the content is sequence-valued.
    #[inline]
    pub fn parts(&self) -> Option<&[ContentPart]> {
        match &self.content {
            Some(MessageContent::Parts(parts)) => Some(parts),
            _ => None,
        }
    }

    /// Mutable variant of [`Message::parts`].
    #[inline]
    pub fn parts_mut(&mut self) -> Option<&mut Vec<ContentPart>> {
        match &mut self.content {
            Some(MessageContent::Parts(parts)) => Some(parts),
            _ => None,
        }
    }
}

/// The content of a [`Message`], which is either a scalar or an
/// ordered sequence of content items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain scalar text.
    Text(String),
    /// A sequence of content items.
    Parts(Vec<ContentPart>),
    /// A content shape this filter does not interpret.
    Other(Value),
}

/// One item of a sequence-valued message content, tagged by its
/// `type` field.
///
/// Replacing an item is a whole-variant operation: retyping an image
/// item to a text item can never leave image fields behind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// A text fragment.
    Text {
        /// The text.
        text: String,
    },
    /// An image reference.
    ImageUrl {
        /// The referenced image.
        image_url: ImageRef,
    },
    /// An item kind this filter does not interpret.
    #[serde(untagged)]
    Other(Value),
}

impl ContentPart {
    /// Creates a text item.
    #[inline]
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Creates an image item without a detail level.
    #[inline]
    pub fn image<S: Into<String>>(url: S) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageRef {
                url: url.into(),
                detail: None,
            },
        }
    }

    /// Returns the image URL if this is an image item.
    #[inline]
    pub fn image_url(&self) -> Option<&str> {
        match self {
            ContentPart::ImageUrl { image_url } => Some(&image_url.url),
            _ => None,
        }
    }
}

/// A reference to an image, by URL or data URI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// The image URL.
    pub url: String,
    /// The requested fidelity. Omitted when the host did not set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_mixed_content() {
        let payload: ChatPayload = serde_json::from_value(json!({
            "model": "some-model",
            "messages": [
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "What does this say?" },
                        {
                            "type": "image_url",
                            "image_url": { "url": "data:image/png;base64,AAAA" }
                        }
                    ]
                },
                { "role": "assistant", "content": "It says hello." }
            ]
        }))
        .unwrap();

        assert_eq!(payload.extra["model"], json!("some-model"));
        let parts = payload.messages[0].parts().unwrap();
        assert_eq!(parts[0], ContentPart::text("What does this say?"));
        assert_eq!(
            parts[1].image_url(),
            Some("data:image/png;base64,AAAA")
        );
        assert!(payload.messages[1].parts().is_none());
    }

    #[test]
    fn test_unknown_shapes_round_trip() {
        let raw = json!({
            "messages": [
                {
                    "role": "tool",
                    "name": "lookup",
                    "content": [
                        { "type": "input_audio", "input_audio": { "data": "…" } },
                        { "type": "text", "text": "transcript" }
                    ]
                }
            ],
            "temperature": 0.2,
            "stream": true
        });
        let payload: ChatPayload = serde_json::from_value(raw.clone()).unwrap();
        assert!(matches!(
            payload.messages[0].parts().unwrap()[0],
            ContentPart::Other(_)
        ));
        assert_eq!(serde_json::to_value(&payload).unwrap(), raw);
    }

    #[test]
    fn test_absent_content_round_trip() {
        let raw = json!({
            "messages": [{ "role": "assistant", "tool_calls": [] }]
        });
        let payload: ChatPayload = serde_json::from_value(raw.clone()).unwrap();
        assert!(payload.messages[0].content.is_none());
        assert_eq!(serde_json::to_value(&payload).unwrap(), raw);
    }

    #[test]
    fn test_image_detail_preserved() {
        let raw = json!({
            "messages": [
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "image_url",
                            "image_url": { "url": "https://example.com/a.png", "detail": "low" }
                        }
                    ]
                }
            ]
        });
        let payload: ChatPayload = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&payload).unwrap(), raw);
    }

    #[test]
    fn test_rounds() {
        let user = Message::with_text("user", "hi");
        let assistant = Message::with_text("assistant", "hello");
        assert_eq!(ChatPayload::with_messages(vec![user.clone()]).rounds(), 0);
        assert_eq!(
            ChatPayload::with_messages(vec![
                user.clone(),
                assistant.clone(),
                user.clone()
            ])
            .rounds(),
            1
        );
    }

    #[test]
    fn test_retype_drops_image_fields() {
        let mut message = Message::with_parts(
            "user",
            vec![ContentPart::image("https://example.com/a.png")],
        );
        let parts = message.parts_mut().unwrap();
        parts[0] = ContentPart::text("extracted");
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "role": "user",
                "content": [{ "type": "text", "text": "extracted" }]
            })
        );
    }
}

//! Locating the image reference inside a conversation.

use ocr_filter_model::Message;

/// The position of an image item inside a conversation, paired with
/// its URL.
///
/// A location is only valid against the exact message list it was
/// computed from; removing or retyping the referenced item invalidates
/// it. Compute it fresh, use it once, discard it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageLocation {
    /// Index of the containing message.
    pub message_index: usize,
    /// Index of the image item within the message content sequence.
    pub content_index: usize,
    /// The referenced image URL.
    pub url: String,
}

/// Returns the location of the first image item found in the message
/// list, or `None` if there is none.
///
/// Messages are scanned in turn order and content items in sequence
/// order. Only user messages with sequence-valued content are
/// considered; scalar content is skipped, not an error.
pub fn find_first_image(messages: &[Message]) -> Option<ImageLocation> {
    for (message_index, message) in messages.iter().enumerate() {
        if message.role != "user" {
            continue;
        }
        let Some(parts) = message.parts() else {
            continue;
        };
        for (content_index, part) in parts.iter().enumerate() {
            if let Some(url) = part.image_url() {
                return Some(ImageLocation {
                    message_index,
                    content_index,
                    url: url.to_owned(),
                });
            }
        }
    }
    None
}

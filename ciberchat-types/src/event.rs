//! Wire events carried in the `data:` lines of a send response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::MessageRecord;

/// One decoded stream frame. The JSON tag field is `type`.
///
/// ```text
/// data: {"type":"user_message","message":{"id":41,"content":"hola","sender":"user"}}
/// data: {"type":"assistant_start","message_id":42,"timestamp":"2025-03-01T10:00:00Z"}
/// data: {"type":"chunk","content":"Hel"}
/// data: {"type":"complete","chat_title_updated":"Saludos"}
/// data: [DONE]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// The server stored the user's message.
    UserMessage {
        /// The stored record, replacing the optimistic copy.
        message: MessageRecord,
    },
    /// The assistant began a reply.
    AssistantStart {
        /// Server id of the reply.
        #[serde(with = "crate::server_id")]
        message_id: String,
        /// When the reply was created.
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    /// A piece of reply text to append.
    Chunk {
        /// Text to append.
        content: String,
    },
    /// Discard the reply text streamed so far.
    Reset,
    /// The reply is finished.
    Complete {
        /// Set when the server renamed the chat while answering.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chat_title_updated: Option<TitleUpdate>,
    },
    /// A tag this client does not know. Ignored.
    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    /// The wire tag of this event.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserMessage { .. } => "user_message",
            Self::AssistantStart { .. } => "assistant_start",
            Self::Chunk { .. } => "chunk",
            Self::Reset => "reset",
            Self::Complete { .. } => "complete",
            Self::Unknown => "unknown",
        }
    }
}

/// How a `complete` event reports a chat rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TitleUpdate {
    /// The new title.
    Title(String),
    /// The title changed (when `true`); it must be fetched again.
    Flag(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> StreamEvent {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn decodes_assistant_start_with_numeric_id() {
        let event = decode(
            r#"{"type":"assistant_start","message_id":7,"timestamp":"2025-03-01T10:00:00Z"}"#,
        );
        match event {
            StreamEvent::AssistantStart { message_id, timestamp } => {
                assert_eq!(message_id, "7");
                assert!(timestamp.is_some());
            }
            other => panic!("expected AssistantStart, got {other:?}"),
        }
    }

    #[test]
    fn decodes_reset_with_empty_body() {
        assert_eq!(decode(r#"{"type":"reset"}"#), StreamEvent::Reset);
    }

    #[test]
    fn complete_title_is_optional() {
        assert_eq!(
            decode(r#"{"type":"complete"}"#),
            StreamEvent::Complete { chat_title_updated: None }
        );
        assert_eq!(
            decode(r#"{"type":"complete","chat_title_updated":"Debian"}"#),
            StreamEvent::Complete {
                chat_title_updated: Some(TitleUpdate::Title("Debian".into()))
            }
        );
        assert_eq!(
            decode(r#"{"type":"complete","chat_title_updated":true}"#),
            StreamEvent::Complete {
                chat_title_updated: Some(TitleUpdate::Flag(true))
            }
        );
    }

    #[test]
    fn unknown_tag_decodes_to_unknown() {
        assert_eq!(decode(r#"{"type":"typing","who":"assistant"}"#), StreamEvent::Unknown);
    }

    #[test]
    fn chunk_ignores_extra_fields() {
        assert_eq!(
            decode(r#"{"type":"chunk","content":"lo","index":3}"#),
            StreamEvent::Chunk { content: "lo".into() }
        );
    }

    #[test]
    fn missing_tag_is_an_error() {
        assert!(serde_json::from_str::<StreamEvent>(r#"{"content":"x"}"#).is_err());
    }
}

//! Conversation model and REST records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a chat on the server.
pub type ChatId = u64;

/// The role of a message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human user.
    User,
    /// The assistant answering the user.
    Assistant,
}

/// Identifier of a message in a conversation.
///
/// Messages sent from this client start with a provisional id and are
/// reconciled to the server-issued id once the server echoes them back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageId {
    /// Client-side id allocated before the server has confirmed the message.
    Provisional(u64),
    /// Server-issued id, normalised to its decimal text.
    Confirmed(String),
}

impl MessageId {
    /// Build a confirmed id from any server-issued value.
    #[must_use]
    pub fn confirmed(id: impl Into<String>) -> Self {
        Self::Confirmed(id.into())
    }

    /// Whether this id is still awaiting server confirmation.
    #[must_use]
    pub fn is_provisional(&self) -> bool {
        matches!(self, Self::Provisional(_))
    }

    /// The server id, if confirmed.
    #[must_use]
    pub fn as_confirmed(&self) -> Option<&str> {
        match self {
            Self::Confirmed(id) => Some(id),
            Self::Provisional(_) => None,
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provisional(n) => write!(f, "provisional-{n}"),
            Self::Confirmed(id) => f.write_str(id),
        }
    }
}

/// Whether an attachment has been accepted by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentState {
    /// A local file that has not been confirmed by the server yet.
    Pending,
    /// Confirmed by the server and retrievable at `url`.
    Resolved {
        /// Where the server serves the file from.
        url: String,
    },
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AttachmentRecord", into = "AttachmentRecord")]
pub struct Attachment {
    /// Original file name.
    pub filename: String,
    /// Declared MIME type (e.g. "application/pdf").
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Resolution state.
    pub state: AttachmentState,
}

impl Attachment {
    /// A local attachment not yet confirmed by the server.
    #[must_use]
    pub fn pending(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            size,
            state: AttachmentState::Pending,
        }
    }

    /// The server URL, once resolved.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match &self.state {
            AttachmentState::Resolved { url } => Some(url),
            AttachmentState::Pending => None,
        }
    }

    /// Whether the server has confirmed this attachment.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self.state, AttachmentState::Resolved { .. })
    }
}

/// Wire shape of an attachment: `{filename, content_type, size, url?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AttachmentRecord {
    filename: String,
    content_type: String,
    size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl From<AttachmentRecord> for Attachment {
    fn from(record: AttachmentRecord) -> Self {
        Self {
            filename: record.filename,
            content_type: record.content_type,
            size: record.size,
            state: match record.url {
                Some(url) => AttachmentState::Resolved { url },
                None => AttachmentState::Pending,
            },
        }
    }
}

impl From<Attachment> for AttachmentRecord {
    fn from(attachment: Attachment) -> Self {
        let url = attachment.url().map(str::to_owned);
        Self {
            filename: attachment.filename,
            content_type: attachment.content_type,
            size: attachment.size,
            url,
        }
    }
}

/// A message in a conversation transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Provisional or confirmed identifier.
    pub id: MessageId,
    /// Who wrote the message.
    pub role: Role,
    /// Text content. Grows while the message is streaming.
    pub content: String,
    /// Attached files.
    pub attachments: Vec<Attachment>,
    /// Server timestamp, once known.
    pub timestamp: Option<DateTime<Utc>>,
    /// Set while the assistant is still producing this message.
    pub streaming: bool,
    /// Set when delivery of this message failed.
    pub error: bool,
}

impl Message {
    /// An optimistic user message awaiting server confirmation.
    #[must_use]
    pub fn optimistic(
        provisional: u64,
        content: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            id: MessageId::Provisional(provisional),
            role: Role::User,
            content: content.into(),
            attachments,
            timestamp: Some(Utc::now()),
            streaming: false,
            error: false,
        }
    }

    /// An empty assistant message opened for streaming.
    #[must_use]
    pub fn open_assistant(id: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            id: MessageId::confirmed(id),
            role: Role::Assistant,
            content: String::new(),
            attachments: Vec::new(),
            timestamp,
            streaming: true,
            error: false,
        }
    }
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: MessageId::Confirmed(record.id),
            role: record.sender,
            content: record.content,
            attachments: record.attachments,
            timestamp: record.timestamp,
            streaming: false,
            error: false,
        }
    }
}

/// A message as returned by the REST API and the `user_message` stream event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Server id. Accepts JSON numbers or strings.
    #[serde(with = "crate::server_id")]
    pub id: String,
    /// Message text.
    pub content: String,
    /// Author role.
    pub sender: Role,
    /// Creation time.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Whether the user has seen this message.
    #[serde(default)]
    pub read: bool,
    /// Attached files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Number of characters kept by [`ChatSummary::preview`].
pub const PREVIEW_CHARS: usize = 50;

/// A chat as listed by `GET /api/chats/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    /// Chat id.
    pub id: ChatId,
    /// Display title.
    pub title: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time; the server orders chats by this, newest first.
    pub updated_at: DateTime<Utc>,
    /// Preview of the most recent message.
    #[serde(default)]
    pub last_message: String,
    /// Assistant messages the user has not read yet.
    #[serde(default)]
    pub unread_count: u32,
}

impl ChatSummary {
    /// Shorten `text` the way the chat list previews it: the first
    /// [`PREVIEW_CHARS`] characters, followed by `...` when cut.
    #[must_use]
    pub fn preview(text: &str) -> String {
        match text.char_indices().nth(PREVIEW_CHARS) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text.to_owned(),
        }
    }

    /// Record a new message in this chat's list entry.
    pub fn touch(&mut self, text: &str, at: DateTime<Utc>) {
        self.last_message = Self::preview(text);
        self.updated_at = at;
    }
}

/// Messages from one chat matching a search, as returned by
/// `GET /api/search/messages/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSearchHit {
    /// The chat the messages belong to.
    pub chat_id: ChatId,
    /// That chat's title.
    pub chat_title: String,
    /// Matching messages, newest first.
    pub messages: Vec<MessageRecord>,
}

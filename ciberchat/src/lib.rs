#![deny(missing_docs)]
//! # ciberchat umbrella crate
//!
//! Single import surface for the ciberchat client. The data model is always
//! available; the stream assembler and the HTTP client sit behind the
//! `stream` and `client` features, plus a `prelude` for the common path.

pub use ciberchat_types as types;

#[cfg(feature = "stream")]
pub use ciberchat_stream as stream;

#[cfg(feature = "client")]
pub use ciberchat_client as client;

/// Happy-path imports for sending messages and rendering a conversation.
pub mod prelude {
    pub use ciberchat_types::{
        Attachment, ChatId, ChatSummary, ClientError, Message, MessageId, MessageRecord, Role,
        StreamError, StreamEvent, TitleUpdate,
    };

    #[cfg(feature = "stream")]
    pub use ciberchat_stream::{
        Applied, AssemblerConfig, ConversationState, StreamAssembler, StreamOutcome,
    };

    #[cfg(feature = "client")]
    pub use ciberchat_client::{CancellationToken, ChatClient, ClientConfig, SendRequest};
}

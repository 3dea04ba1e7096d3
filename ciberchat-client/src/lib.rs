#![doc = include_str!("../README.md")]

pub mod chats;
pub mod client;
pub mod config;
pub(crate) mod error;
pub mod send;

pub use client::ChatClient;
pub use config::ClientConfig;
pub use send::SendRequest;

// Re-export the stream and model types for convenience
pub use ciberchat_stream::{AssemblerConfig, ConversationState, StreamOutcome};
pub use ciberchat_types::{ChatSummary, ClientError, MessageRecord};
pub use tokio_util::sync::CancellationToken;

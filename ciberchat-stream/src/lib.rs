#![doc = include_str!("../README.md")]

pub mod assembler;
pub mod config;
pub mod decoder;
pub mod state;
pub mod wasm;

pub use assembler::{StreamAssembler, StreamOutcome, event_stream};
pub use config::AssemblerConfig;
pub use decoder::{DONE_SENTINEL, Frame, FrameDecoder};
pub use state::{Applied, ConversationState};
pub use wasm::*;

// Re-export ciberchat-types for convenience
pub use ciberchat_types::{StreamError, StreamEvent};

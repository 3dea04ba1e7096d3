#![doc = include_str!("../README.md")]

pub mod error;
pub mod event;
pub(crate) mod server_id;
pub mod types;

pub use error::*;
pub use event::*;
pub use types::*;

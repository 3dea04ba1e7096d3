//! WASM compatibility shims.
//!
//! On native targets, these are aliases for `Send`.
//! On wasm32, the bounds are removed since wasm32 is single-threaded and
//! browser response bodies are not `Send`.

use std::pin::Pin;

use futures::Stream;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::*;

    /// Marker trait equivalent to `Send` on native, unconditional on WASM.
    pub trait WasmCompatSend: Send {}
    impl<T: Send> WasmCompatSend for T {}

    /// A boxed stream that is `Send` on native and unbound on WASM.
    pub type WasmBoxedStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;
}

#[cfg(target_arch = "wasm32")]
mod wasm_impl {
    use super::*;

    /// Marker trait equivalent to `Send` on native, unconditional on WASM.
    pub trait WasmCompatSend {}
    impl<T> WasmCompatSend for T {}

    /// A boxed stream that is `Send` on native and unbound on WASM.
    pub type WasmBoxedStream<'a, T> = Pin<Box<dyn Stream<Item = T> + 'a>>;
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::*;

#[cfg(target_arch = "wasm32")]
pub use wasm_impl::*;

//! Configuration for the stream assembler.

/// Static configuration for a [`StreamAssembler`](crate::StreamAssembler).
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Longest line the decoder buffers. Longer lines are dropped and the
    /// decoder resynchronises on the next newline.
    pub max_line_bytes: usize,

    /// Treat a body that ends without `[DONE]` as an error instead of a
    /// normal completion.
    pub strict_termination: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: 1024 * 1024,
            strict_termination: false,
        }
    }
}

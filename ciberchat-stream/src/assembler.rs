//! Drives a response body through the decoder into a [`ConversationState`].

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use ciberchat_types::{StreamError, StreamEvent};

use crate::config::AssemblerConfig;
use crate::decoder::{Frame, FrameDecoder};
use crate::state::{Applied, ConversationState};
use crate::wasm::{WasmBoxedStream, WasmCompatSend};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// How a stream ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The `[DONE]` sentinel arrived.
    Completed,
    /// The body ended without `[DONE]`. Treated as completion, but the reply
    /// may have been cut short.
    Truncated,
    /// The cancellation token fired. Buffered input was dropped unapplied.
    Cancelled,
}

/// Applies the events of one response body to a conversation, in arrival
/// order.
///
/// One assembler may drive any number of streams; each [`run`](Self::run)
/// owns a fresh decoder.
#[derive(Debug, Clone, Default)]
pub struct StreamAssembler {
    config: AssemblerConfig,
}

impl StreamAssembler {
    /// Create an assembler with the given configuration.
    #[must_use]
    pub fn new(config: AssemblerConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Read `body` to the end, applying every decoded event to `state`.
    ///
    /// Stops at `[DONE]`, at the end of the body, or when `cancel` fires.
    /// A transport error flags the pending exchange as failed and is
    /// returned. Nothing is retried.
    pub async fn run<S, B, E>(
        &self,
        body: S,
        state: &mut ConversationState,
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome, StreamError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<BoxError>,
    {
        let mut body = std::pin::pin!(body);
        let mut decoder = FrameDecoder::new(&self.config);

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Ok(Self::abandon(state, &decoder));
                }
                next = body.next() => next,
            };

            match next {
                Some(Ok(bytes)) => {
                    for frame in decoder.feed(bytes.as_ref()) {
                        if cancel.is_cancelled() {
                            return Ok(Self::abandon(state, &decoder));
                        }
                        if Self::apply_frame(state, frame) {
                            tracing::debug!(
                                applied = state.events_applied(),
                                skipped = decoder.skipped(),
                                "stream completed"
                            );
                            return Ok(StreamOutcome::Completed);
                        }
                    }
                }
                Some(Err(e)) => {
                    let source: BoxError = e.into();
                    tracing::warn!(error = %source, "stream read failed");
                    state.mark_failed();
                    return Err(StreamError::Transport(source));
                }
                None => break,
            }
        }

        if let Some(frame) = decoder.finish() {
            if Self::apply_frame(state, frame) {
                return Ok(StreamOutcome::Completed);
            }
        }

        if self.config.strict_termination {
            tracing::warn!("stream ended without [DONE]");
            state.mark_failed();
            return Err(StreamError::Truncated);
        }

        tracing::warn!(
            open = state.is_streaming(),
            "stream ended without [DONE], treating as complete"
        );
        state.seal_open();
        Ok(StreamOutcome::Truncated)
    }

    /// Apply one frame. Returns `true` once the stream is done.
    fn apply_frame(state: &mut ConversationState, frame: Frame) -> bool {
        match frame {
            Frame::Event(event) => {
                if state.apply(event) == Applied::Ignored {
                    tracing::debug!("stream event had no effect");
                }
                false
            }
            Frame::Done => {
                state.seal_open();
                true
            }
        }
    }

    fn abandon(state: &mut ConversationState, decoder: &FrameDecoder) -> StreamOutcome {
        tracing::debug!(
            buffered = decoder.buffered(),
            "stream cancelled, discarding partial state"
        );
        state.discard_open();
        state.abandon_pending();
        StreamOutcome::Cancelled
    }
}

/// Decode a response body into a stream of events without applying them.
///
/// For callers that keep their own state. The stream ends after `[DONE]`,
/// at the end of the body, or after yielding a transport error.
pub fn event_stream<S, B, E>(
    body: S,
    config: AssemblerConfig,
) -> WasmBoxedStream<'static, Result<StreamEvent, StreamError>>
where
    S: Stream<Item = Result<B, E>> + WasmCompatSend + 'static,
    B: AsRef<[u8]> + WasmCompatSend + 'static,
    E: Into<BoxError> + WasmCompatSend + 'static,
{
    Box::pin(async_stream::stream! {
        let mut decoder = FrameDecoder::new(&config);
        let mut body = std::pin::pin!(body);

        while let Some(chunk) = body.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield Err(StreamError::Transport(e.into()));
                    return;
                }
            };

            for frame in decoder.feed(bytes.as_ref()) {
                match frame {
                    Frame::Event(event) => yield Ok(event),
                    Frame::Done => return,
                }
            }
        }

        if let Some(Frame::Event(event)) = decoder.finish() {
            yield Ok(event);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciberchat_types::MessageId;

    fn body(parts: &[&str]) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + use<> {
        let parts: Vec<_> = parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        futures::stream::iter(parts)
    }

    const HELLO: &str = "data: {\"type\":\"assistant_start\",\"message_id\":7}\n\n\
        data: {\"type\":\"chunk\",\"content\":\"Hel\"}\n\n\
        data: {\"type\":\"chunk\",\"content\":\"lo\"}\n\n\
        data: {\"type\":\"complete\"}\n\n\
        data: [DONE]\n\n";

    #[tokio::test]
    async fn assembles_hello() {
        let mut state = ConversationState::new();
        let outcome = StreamAssembler::default()
            .run(body(&[HELLO]), &mut state, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome, StreamOutcome::Completed);
        assert_eq!(state.messages().len(), 1);
        let msg = &state.messages()[0];
        assert_eq!(msg.id, MessageId::confirmed("7"));
        assert_eq!(msg.content, "Hello");
        assert!(!msg.streaming);
    }

    #[tokio::test]
    async fn missing_done_is_truncated_and_sealed() {
        let mut state = ConversationState::new();
        let outcome = StreamAssembler::default()
            .run(
                body(&[
                    "data: {\"type\":\"assistant_start\",\"message_id\":1}\n",
                    "data: {\"type\":\"chunk\",\"content\":\"cut\"}",
                ]),
                &mut state,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome, StreamOutcome::Truncated);
        assert_eq!(state.messages()[0].content, "cut");
        assert!(!state.is_streaming());
        assert!(!state.messages()[0].error);
    }

    #[tokio::test]
    async fn strict_termination_reports_truncation() {
        let assembler = StreamAssembler::new(AssemblerConfig {
            strict_termination: true,
            ..AssemblerConfig::default()
        });
        let mut state = ConversationState::new();
        state.push_optimistic("hola", vec![]);
        let err = assembler
            .run(body(&[""]), &mut state, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StreamError::Truncated));
        assert!(state.messages()[0].error);
    }

    #[tokio::test]
    async fn transport_error_flags_pending_message() {
        let mut state = ConversationState::new();
        state.push_optimistic("hola", vec![]);
        let parts: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"data: {\"type\":\"assistant_start\",\"message_id\":2}\n".to_vec()),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let err = StreamAssembler::default()
            .run(futures::stream::iter(parts), &mut state, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StreamError::Transport(_)));
        assert_eq!(state.messages().len(), 2);
        assert!(state.messages().iter().all(|m| m.error));
        assert!(!state.is_streaming());
    }

    #[tokio::test]
    async fn cancelled_token_applies_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut state = ConversationState::new();
        let outcome = StreamAssembler::default()
            .run(body(&[HELLO]), &mut state, &cancel)
            .await
            .unwrap();

        assert_eq!(outcome, StreamOutcome::Cancelled);
        assert!(state.messages().is_empty());
    }

    #[tokio::test]
    async fn cancel_releases_pending_optimistic_message() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut state = ConversationState::new();
        let provisional = state.push_optimistic("hola", vec![]);
        let outcome = StreamAssembler::default()
            .run(body(&[HELLO]), &mut state, &cancel)
            .await
            .unwrap();

        assert_eq!(outcome, StreamOutcome::Cancelled);
        assert_eq!(state.pending(), None);
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.messages()[0].id, provisional);
        assert!(!state.messages()[0].error);
    }

    #[tokio::test]
    async fn cancel_mid_stream_discards_open_reply() {
        let cancel = CancellationToken::new();
        let (tx, rx) = futures::channel::mpsc::unbounded::<Result<Vec<u8>, std::io::Error>>();
        let partial = concat!(
            "data: {\"type\":\"assistant_start\",\"message_id\":3}\n\n",
            "data: {\"type\":\"chunk\",\"content\":\"par\"}\n\n",
            "data: {\"type\":\"chu",
        );
        tx.unbounded_send(Ok(partial.as_bytes().to_vec())).unwrap();

        let mut state = ConversationState::new();
        let assembler = StreamAssembler::default();
        let canceller = cancel.clone();
        let (outcome, ()) = tokio::join!(assembler.run(rx, &mut state, &cancel), async move {
            tokio::task::yield_now().await;
            canceller.cancel();
            drop(tx);
        });

        assert_eq!(outcome.unwrap(), StreamOutcome::Cancelled);
        assert!(state.messages().is_empty());
        assert!(!state.is_streaming());
    }

    #[tokio::test]
    async fn event_stream_yields_until_done() {
        let body = body(&[HELLO, "data: {\"type\":\"reset\"}\n"]);
        let events: Vec<_> = event_stream(body, AssemblerConfig::default())
            .collect()
            .await;
        let events: Vec<StreamEvent> = events.into_iter().map(Result::unwrap).collect();
        assert_eq!(events.len(), 4);
        assert_eq!(events[3].kind(), "complete");
    }
}

//! Sending a message and streaming the reply into a conversation.

use ciberchat_stream::{ConversationState, StreamOutcome};
use ciberchat_types::{Attachment, ChatId, ClientError};
use reqwest::Method;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::client::ChatClient;
use crate::error::{map_http_status, map_reqwest_error};

/// A message to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendRequest {
    /// Message text. Must not be blank.
    pub content: String,
    /// Files already uploaded for this message.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl SendRequest {
    /// A text-only message.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            attachments: Vec::new(),
        }
    }

    /// Attach a file.
    #[must_use]
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

impl ChatClient {
    /// Send a message to `chat_id` and stream the reply into `state`.
    ///
    /// The message is added to `state` optimistically before the request
    /// goes out, then reconciled by the server's `user_message` event. If
    /// the request or the stream fails, the optimistic message stays in the
    /// transcript flagged as errored and the error is returned. Nothing is
    /// retried.
    ///
    /// `cancel` abandons the send: the open reply and any buffered input
    /// are discarded and [`StreamOutcome::Cancelled`] is returned. An
    /// optimistic message the server has not confirmed yet stays in the
    /// transcript with its provisional id and is no longer pending; the
    /// caller decides whether to drop or resend it.
    pub async fn send_message(
        &self,
        chat_id: ChatId,
        state: &mut ConversationState,
        request: SendRequest,
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome, ClientError> {
        if request.content.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "message content cannot be empty".into(),
            ));
        }
        if state.is_streaming() {
            return Err(ClientError::InvalidRequest(
                "a reply is still streaming in this conversation".into(),
            ));
        }

        let url = self.api_url(&format!("/chats/{chat_id}/messages/"));
        let provisional =
            state.push_optimistic(request.content.clone(), request.attachments.clone());
        tracing::debug!(url = %url, provisional = %provisional, "sending message");

        let pending = self
            .request(Method::POST, &url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&request)
            .send();

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(provisional = %provisional, "send cancelled before response");
                state.abandon_pending();
                return Ok(StreamOutcome::Cancelled);
            }
            response = pending => response,
        };

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                state.mark_failed();
                return Err(map_reqwest_error(e, None));
            }
        };

        let status = response.status();
        if !status.is_success() {
            state.mark_failed();
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_status(status, &body));
        }

        let outcome = self
            .assembler
            .run(response.bytes_stream(), state, cancel)
            .await?;
        tracing::debug!(?outcome, events = state.events_applied(), "reply stream ended");

        if outcome != StreamOutcome::Cancelled && state.title_is_stale() {
            self.refresh_title(chat_id, state).await;
        }
        Ok(outcome)
    }

    /// Fetch the chat title after the server reported a rename without it.
    async fn refresh_title(&self, chat_id: ChatId, state: &mut ConversationState) {
        match self.get_chat(chat_id).await {
            Ok(chat) => state.set_title(chat.title),
            Err(e) => tracing::warn!(error = %e, chat_id, "could not refresh chat title"),
        }
    }
}

//! Conversation state and the reducer that applies stream events to it.

use std::collections::HashMap;

use ciberchat_types::{
    Attachment, Message, MessageId, MessageRecord, Role, StreamEvent, TitleUpdate,
};

/// Whether applying an event changed the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// State changed.
    Changed,
    /// The event was a no-op (duplicate, out of order, or unknown).
    Ignored,
}

impl Applied {
    fn from_changed(changed: bool) -> Self {
        if changed { Self::Changed } else { Self::Ignored }
    }
}

/// The transcript of one conversation.
///
/// Wire events only reach it through [`apply`](Self::apply); the send path
/// adds the optimistic user message through [`push_optimistic`](Self::push_optimistic).
/// At most one assistant message is open at a time.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
    title: Option<String>,
    title_stale: bool,
    /// Index of the open assistant message.
    open: Option<usize>,
    /// Provisional id of the optimistic message awaiting `user_message`.
    pending: Option<u64>,
    resolved: HashMap<u64, String>,
    next_provisional: u64,
    events_applied: u64,
}

impl ConversationState {
    /// An empty conversation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A conversation seeded with history fetched from the REST API.
    #[must_use]
    pub fn from_history(records: impl IntoIterator<Item = MessageRecord>) -> Self {
        Self {
            messages: records.into_iter().map(Message::from).collect(),
            ..Self::default()
        }
    }

    /// Set the conversation title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Messages in transcript order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The conversation title, if known.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Replace the title and clear the stale flag.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
        self.title_stale = false;
    }

    /// Whether the server reported a rename without the new title.
    #[must_use]
    pub fn title_is_stale(&self) -> bool {
        self.title_stale
    }

    /// Whether an assistant reply is still streaming. Input should stay
    /// disabled while this holds.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.open.is_some()
    }

    /// The assistant message currently receiving chunks.
    #[must_use]
    pub fn open_message(&self) -> Option<&Message> {
        self.open.map(|i| &self.messages[i])
    }

    /// Provisional id of the sent message still awaiting confirmation.
    #[must_use]
    pub fn pending(&self) -> Option<MessageId> {
        self.pending.map(MessageId::Provisional)
    }

    /// The confirmed id a provisional id was reconciled to.
    #[must_use]
    pub fn resolve(&self, provisional: u64) -> Option<&str> {
        self.resolved.get(&provisional).map(String::as_str)
    }

    /// Look a message up by id. Provisional ids that have been reconciled
    /// find the confirmed message.
    #[must_use]
    pub fn find(&self, id: &MessageId) -> Option<&Message> {
        let id = match id {
            MessageId::Provisional(p) => match self.resolved.get(p) {
                Some(confirmed) => MessageId::Confirmed(confirmed.clone()),
                None => id.clone(),
            },
            MessageId::Confirmed(_) => id.clone(),
        };
        self.messages.iter().find(|m| m.id == id)
    }

    /// Number of events that changed state.
    #[must_use]
    pub fn events_applied(&self) -> u64 {
        self.events_applied
    }

    /// Append a user message before the server has seen it.
    ///
    /// Returns its provisional id. The message is reconciled by the next
    /// `user_message` event.
    pub fn push_optimistic(
        &mut self,
        content: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> MessageId {
        if let Some(previous) = self.pending {
            tracing::debug!(previous, "replacing unconfirmed optimistic message");
        }
        self.next_provisional += 1;
        let provisional = self.next_provisional;
        self.messages
            .push(Message::optimistic(provisional, content, attachments));
        self.pending = Some(provisional);
        MessageId::Provisional(provisional)
    }

    /// Apply one wire event.
    pub fn apply(&mut self, event: StreamEvent) -> Applied {
        let kind = event.kind();
        let applied = match event {
            StreamEvent::UserMessage { message } => self.confirm_user_message(message),
            StreamEvent::AssistantStart {
                message_id,
                timestamp,
            } => {
                if self.contains_confirmed(&message_id) {
                    Applied::Ignored
                } else {
                    self.seal_open();
                    self.messages
                        .push(Message::open_assistant(message_id, timestamp));
                    self.open = Some(self.messages.len() - 1);
                    Applied::Changed
                }
            }
            StreamEvent::Chunk { content } => match self.open {
                Some(i) if !content.is_empty() => {
                    self.messages[i].content.push_str(&content);
                    Applied::Changed
                }
                _ => Applied::Ignored,
            },
            StreamEvent::Reset => match self.open {
                Some(i) if !self.messages[i].content.is_empty() => {
                    self.messages[i].content.clear();
                    Applied::Changed
                }
                _ => Applied::Ignored,
            },
            StreamEvent::Complete { chat_title_updated } => {
                let sealed = self.seal_open();
                let renamed = match chat_title_updated {
                    Some(TitleUpdate::Title(title))
                        if self.title.as_deref() != Some(title.as_str()) =>
                    {
                        self.set_title(title);
                        true
                    }
                    Some(TitleUpdate::Flag(true)) if !self.title_stale => {
                        self.title_stale = true;
                        true
                    }
                    _ => false,
                };
                Applied::from_changed(sealed || renamed)
            }
            StreamEvent::Unknown => Applied::Ignored,
        };

        if applied == Applied::Changed {
            self.events_applied += 1;
        }
        tracing::trace!(event = kind, ?applied, "applied stream event");
        applied
    }

    fn confirm_user_message(&mut self, record: MessageRecord) -> Applied {
        if self.contains_confirmed(&record.id) {
            return Applied::Ignored;
        }

        let slot = self.pending.and_then(|p| {
            self.messages
                .iter()
                .position(|m| m.id == MessageId::Provisional(p))
                .map(|i| (p, i))
        });
        match slot {
            Some((provisional, i)) if record.sender == Role::User => {
                self.resolved.insert(provisional, record.id.clone());
                self.messages[i] = Message::from(record);
                self.pending = None;
            }
            _ => self.messages.push(Message::from(record)),
        }
        Applied::Changed
    }

    fn contains_confirmed(&self, id: &str) -> bool {
        self.messages.iter().any(|m| m.id.as_confirmed() == Some(id))
    }

    /// Close the open assistant message, keeping its content.
    ///
    /// Returns whether a message was open.
    pub fn seal_open(&mut self) -> bool {
        match self.open.take() {
            Some(i) => {
                self.messages[i].streaming = false;
                true
            }
            None => false,
        }
    }

    /// Drop the open assistant message and its partial content.
    pub fn discard_open(&mut self) -> Option<Message> {
        self.open.take().map(|i| self.messages.remove(i))
    }

    /// Stop waiting for the server to confirm the pending optimistic message.
    ///
    /// The message stays in the transcript with its provisional id and no
    /// error flag; a later `user_message` is appended rather than reconciled
    /// against it.
    pub fn abandon_pending(&mut self) -> Option<MessageId> {
        self.pending.take().map(MessageId::Provisional)
    }

    /// Record that the exchange failed.
    ///
    /// The unconfirmed optimistic message, if any, is flagged errored but kept.
    /// An open assistant message is sealed and flagged errored too.
    pub fn mark_failed(&mut self) {
        if let Some(p) = self.pending.take() {
            let id = MessageId::Provisional(p);
            if let Some(msg) = self.messages.iter_mut().find(|m| m.id == id) {
                msg.error = true;
            }
        }
        if let Some(i) = self.open.take() {
            let msg = &mut self.messages[i];
            msg.streaming = false;
            msg.error = true;
        }
    }
}

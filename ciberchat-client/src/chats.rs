//! Chat and message history endpoints.

use ciberchat_types::{ChatId, ChatSearchHit, ChatSummary, ClientError, MessageRecord};
use reqwest::Method;
use serde_json::json;

use crate::client::ChatClient;

impl ChatClient {
    /// List the user's chats, most recently updated first.
    ///
    /// `search` matches chat titles and message content.
    pub async fn list_chats(&self, search: Option<&str>) -> Result<Vec<ChatSummary>, ClientError> {
        let url = self.api_url("/chats/");
        tracing::debug!(url = %url, search = ?search, "listing chats");

        let mut builder = self.request(Method::GET, &url);
        if let Some(query) = search.filter(|q| !q.is_empty()) {
            builder = builder.query(&[("search", query)]);
        }
        self.execute_json(builder).await
    }

    /// Create a chat. Without a title the server names it "Nuevo chat".
    pub async fn create_chat(&self, title: Option<&str>) -> Result<ChatSummary, ClientError> {
        let url = self.api_url("/chats/");
        tracing::debug!(url = %url, "creating chat");

        let body = match title {
            Some(title) => json!({ "title": title }),
            None => json!({}),
        };
        self.execute_json(self.request(Method::POST, &url).json(&body))
            .await
    }

    /// Fetch one chat.
    pub async fn get_chat(&self, chat_id: ChatId) -> Result<ChatSummary, ClientError> {
        let url = self.api_url(&format!("/chats/{chat_id}/"));
        self.execute_json(self.request(Method::GET, &url)).await
    }

    /// Rename a chat.
    pub async fn rename_chat(
        &self,
        chat_id: ChatId,
        title: &str,
    ) -> Result<ChatSummary, ClientError> {
        if title.trim().is_empty() {
            return Err(ClientError::InvalidRequest("chat title cannot be empty".into()));
        }
        let url = self.api_url(&format!("/chats/{chat_id}/"));
        tracing::debug!(url = %url, "renaming chat");

        self.execute_json(
            self.request(Method::PUT, &url)
                .json(&json!({ "title": title })),
        )
        .await
    }

    /// Delete a chat and its messages.
    pub async fn delete_chat(&self, chat_id: ChatId) -> Result<(), ClientError> {
        let url = self.api_url(&format!("/chats/{chat_id}/"));
        tracing::debug!(url = %url, "deleting chat");
        self.execute_empty(self.request(Method::DELETE, &url)).await
    }

    /// Fetch a chat's messages in order. The server marks the assistant's
    /// messages as read as a side effect.
    pub async fn list_messages(
        &self,
        chat_id: ChatId,
        search: Option<&str>,
    ) -> Result<Vec<MessageRecord>, ClientError> {
        let url = self.api_url(&format!("/chats/{chat_id}/messages/"));
        let mut builder = self.request(Method::GET, &url);
        if let Some(query) = search.filter(|q| !q.is_empty()) {
            builder = builder.query(&[("search", query)]);
        }
        self.execute_json(builder).await
    }

    /// Search messages across all chats, grouped by chat.
    pub async fn search_messages(&self, query: &str) -> Result<Vec<ChatSearchHit>, ClientError> {
        if query.trim().is_empty() {
            return Err(ClientError::InvalidRequest("search query cannot be empty".into()));
        }
        let url = self.api_url("/search/messages/");
        tracing::debug!(url = %url, "searching messages");
        self.execute_json(self.request(Method::GET, &url).query(&[("q", query)]))
            .await
    }
}

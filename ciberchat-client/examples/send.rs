//! Send one message and print the streamed reply.
//!
//! Set CIBERCHAT_BASE_URL, CIBERCHAT_SESSION_COOKIE and CIBERCHAT_CSRF_TOKEN
//! in your environment and run:
//!   cargo run --example send -p ciberchat-client -- "¿Cómo instalo Gentoo?"

use ciberchat_client::{CancellationToken, ChatClient, ConversationState, SendRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let text = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Hola".to_string());

    let client = ChatClient::from_env();

    let chat = match client.list_chats(None).await?.into_iter().next() {
        Some(chat) => chat,
        None => client.create_chat(None).await?,
    };
    println!("Chat {}: {}", chat.id, chat.title);

    let history = client.list_messages(chat.id, None).await?;
    let mut state = ConversationState::from_history(history).with_title(chat.title);

    let outcome = client
        .send_message(chat.id, &mut state, SendRequest::text(text), &CancellationToken::new())
        .await?;

    for message in state.messages().iter().rev().take(2).rev() {
        println!("[{:?} {}] {}", message.role, message.id, message.content);
    }
    println!("Stream ended: {outcome:?}, title: {}", state.title().unwrap_or(""));

    Ok(())
}

use ciberchat_types::*;

#[test]
fn chat_summary_parses_list_entry() {
    let json = r#"{
        "id": 3,
        "title": "Nuevo chat",
        "created_at": "2025-03-01T09:00:00+00:00",
        "updated_at": "2025-03-01T10:30:00.250000+00:00",
        "last_message": "Esta es una respuesta automática...",
        "unread_count": 1
    }"#;
    let chat: ChatSummary = serde_json::from_str(json).unwrap();
    assert_eq!(chat.id, 3);
    assert_eq!(chat.title, "Nuevo chat");
    assert_eq!(chat.unread_count, 1);
    assert!(chat.updated_at > chat.created_at);
}

#[test]
fn chat_summary_touch_updates_preview() {
    let json = r#"{"id":1,"title":"t","created_at":"2025-03-01T09:00:00Z","updated_at":"2025-03-01T09:00:00Z"}"#;
    let mut chat: ChatSummary = serde_json::from_str(json).unwrap();
    assert_eq!(chat.last_message, "");

    let later = chat.updated_at + chrono::Duration::minutes(5);
    chat.touch(&"a".repeat(80), later);
    assert_eq!(chat.last_message.len(), PREVIEW_CHARS + 3);
    assert_eq!(chat.updated_at, later);
}

#[test]
fn search_hit_groups_messages() {
    let json = r#"[{
        "chat_id": 2,
        "chat_title": "Gentoo",
        "messages": [
            {"id": 9, "content": "emerge --sync", "sender": "assistant", "timestamp": "2025-03-01T10:00:00Z"},
            {"id": 8, "content": "¿Cómo actualizo?", "sender": "user", "timestamp": "2025-03-01T09:59:00Z"}
        ]
    }]"#;
    let hits: Vec<ChatSearchHit> = serde_json::from_str(json).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].chat_title, "Gentoo");
    assert_eq!(hits[0].messages[0].sender, Role::Assistant);
    assert!(!hits[0].messages[0].read);
}

#[test]
fn optimistic_message_is_provisional_user_message() {
    let msg = Message::optimistic(1, "hola", vec![Attachment::pending("a.png", "image/png", 10)]);
    assert!(msg.id.is_provisional());
    assert_eq!(msg.role, Role::User);
    assert!(!msg.streaming);
    assert!(!msg.attachments[0].is_resolved());
}

#[test]
fn open_assistant_message_is_streaming_and_empty() {
    let msg = Message::open_assistant("7", None);
    assert_eq!(msg.id, MessageId::confirmed("7"));
    assert_eq!(msg.role, Role::Assistant);
    assert!(msg.streaming);
    assert!(msg.content.is_empty());
}

#[test]
fn message_record_serializes_id_as_string() {
    let record = MessageRecord {
        id: "5".into(),
        content: "x".into(),
        sender: Role::User,
        timestamp: None,
        read: false,
        attachments: vec![],
    };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["id"], "5");
    assert_eq!(json["sender"], "user");
    assert!(json.get("attachments").is_none());
}

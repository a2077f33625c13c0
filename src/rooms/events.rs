//! The websocket event surface.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::msg::Message;

/// Server → client events. `new_message` goes to the conversation room
/// (both participants, sender included); `new_message_notification` goes
/// only to the recipient's personal channel so senders are never
/// notified about their own sends.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    NewMessage {
        message: Message,
    },
    NewMessageNotification {
        message: Message,
    },
    MessageReadStatus {
        message_id: Uuid,
        read_at: i64,
    },
    UserTyping {
        user_id: Uuid,
        is_typing: bool,
    },
    NewMatch {
        match_id: Uuid,
        counterpart_id: Uuid,
        message: String,
        action_url: String,
    },
    NewLike {
        counterpart_id: Uuid,
        message: String,
    },
}

/// Client → server events.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom { other_id: Uuid },
    LeaveRoom { other_id: Uuid },
    TypingStart { recipient_id: Uuid },
    TypingStop { recipient_id: Uuid },
    MessageRead { message_id: Uuid, sender_id: Uuid },
}

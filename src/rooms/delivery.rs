//! Server half of the message protocol.
//!
//! Invariants kept here: a message is persisted before anything is
//! broadcast; the sender is only ever told about their send through the
//! room echo, never the notification channel; read receipts flip at
//! most once.

use anyhow::anyhow;
use uuid::Uuid;

use crate::appresult::AppResult;
use crate::clock::{now_ms, now_unix};
use crate::error::CoreError;
use crate::matches::store;
use crate::notify::{Notification, NotificationKind};
use crate::AppState;

use super::events::ServerEvent;
use super::msg::{self, Message};

pub async fn send_message(
    state: &AppState,
    sender: Uuid,
    recipient: Uuid,
    content: String,
    kind: Option<String>,
) -> AppResult<Message> {
    if content.trim().is_empty() {
        return Err(anyhow!("empty message").into());
    }

    let record = store::mutual_between(&state.db_pool, sender, recipient)
        .await?
        .ok_or(CoreError::MatchRequired(sender, recipient))?;

    let message = Message {
        id: Uuid::now_v7(),
        match_id: record.id,
        sender_id: sender,
        recipient_id: recipient,
        content,
        kind: kind.unwrap_or_else(|| "text".to_string()),
        is_read: false,
        read_at: None,
        sent_at: now_ms(),
    };

    // Persistence happens-before broadcast: once any client sees the
    // authoritative message, a reconnect fetch will also find it.
    msg::insert(&state.db_pool, &message).await?;
    store::touch_interaction(&state.db_pool, record.id, now_unix()).await?;

    state
        .router
        .emit_room(sender, recipient, ServerEvent::NewMessage { message: message.clone() })
        .await;
    state
        .router
        .emit_personal(
            recipient,
            ServerEvent::NewMessageNotification { message: message.clone() },
        )
        .await;
    state.notifier.record(Notification {
        user_id: recipient,
        kind: NotificationKind::NewMessage,
        body: message.content.clone(),
    });

    Ok(message)
}

/// Idempotent read receipt: flips the flag at most once and tells the
/// sender's personal channel when it does.
pub async fn mark_read(state: &AppState, reader: Uuid, message_id: Uuid) -> AppResult<()> {
    if let Some((sender, read_at)) =
        msg::mark_read(&state.db_pool, message_id, reader, now_ms()).await?
    {
        state
            .router
            .emit_personal(sender, ServerEvent::MessageReadStatus { message_id, read_at })
            .await;
    }

    Ok(())
}

/// The persisted transcript between the actor and a peer. This is also
/// the reconnect recovery path for broadcasts that were missed offline.
pub async fn conversation(
    state: &AppState,
    actor: Uuid,
    peer: Uuid,
) -> AppResult<Vec<Message>> {
    let record = store::mutual_between(&state.db_pool, actor, peer)
        .await?
        .ok_or(CoreError::MatchRequired(actor, peer))?;

    msg::conversation(&state.db_pool, record.id).await
}

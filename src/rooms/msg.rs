//! Message rows: insert, transcript fetch, read-flag transition.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::appresult::AppResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub kind: String,
    pub is_read: bool,
    pub read_at: Option<i64>,
    /// Unix milliseconds.
    pub sent_at: i64,
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: String,
    match_id: String,
    sender_id: String,
    recipient_id: String,
    content: String,
    kind: String,
    is_read: bool,
    read_at: Option<i64>,
    sent_at: i64,
}

impl MessageRow {
    fn into_message(self) -> AppResult<Message> {
        Ok(Message {
            id: Uuid::parse_str(&self.id)?,
            match_id: Uuid::parse_str(&self.match_id)?,
            sender_id: Uuid::parse_str(&self.sender_id)?,
            recipient_id: Uuid::parse_str(&self.recipient_id)?,
            content: self.content,
            kind: self.kind,
            is_read: self.is_read,
            read_at: self.read_at,
            sent_at: self.sent_at,
        })
    }
}

pub async fn insert(pool: &SqlitePool, message: &Message) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO messages (id,match_id,sender_id,recipient_id,content,kind,is_read,read_at,sent_at)
         VALUES (?,?,?,?,?,?,?,?,?)",
    )
    .bind(message.id.to_string())
    .bind(message.match_id.to_string())
    .bind(message.sender_id.to_string())
    .bind(message.recipient_id.to_string())
    .bind(&message.content)
    .bind(&message.kind)
    .bind(message.is_read)
    .bind(message.read_at)
    .bind(message.sent_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn conversation(pool: &SqlitePool, match_id: Uuid) -> AppResult<Vec<Message>> {
    let rows: Vec<MessageRow> = sqlx::query_as(
        "SELECT id,match_id,sender_id,recipient_id,content,kind,is_read,read_at,sent_at
         FROM messages WHERE match_id=? ORDER BY sent_at, id",
    )
    .bind(match_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(MessageRow::into_message).collect()
}

/// Flip the read flag iff the reader is the recipient and the message is
/// still unread. Returns the sender to notify, or `None` when nothing
/// changed (already read, wrong reader, unknown id), all of which are
/// quiet no-ops.
pub async fn mark_read(
    pool: &SqlitePool,
    message_id: Uuid,
    reader: Uuid,
    now_ms: i64,
) -> AppResult<Option<(Uuid, i64)>> {
    let row: Option<(String,)> = sqlx::query_as(
        "UPDATE messages SET is_read=1, read_at=?
         WHERE id=? AND recipient_id=? AND is_read=0
         RETURNING sender_id",
    )
    .bind(now_ms)
    .bind(message_id.to_string())
    .bind(reader.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some((sender,)) => Ok(Some((Uuid::parse_str(&sender)?, now_ms))),
        None => Ok(None),
    }
}

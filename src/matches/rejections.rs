//! One-directional rejection cooldowns.
//!
//! A rejection hides `target` from `actor`'s suggestions until
//! `expires_at`; it never affects what `target` sees. Expiry is lazy:
//! reads compare against the clock, nothing sweeps the table.

use std::collections::HashSet;

use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::appresult::AppResult;
use crate::error::CoreError;

pub const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Serialize)]
pub struct RejectionRecord {
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub expires_at: i64,
    pub is_active: bool,
    pub created_at: i64,
}

#[derive(sqlx::FromRow)]
struct RejectionRow {
    actor_id: String,
    target_id: String,
    expires_at: i64,
    is_active: bool,
    created_at: i64,
}

impl RejectionRow {
    fn into_record(self) -> AppResult<RejectionRecord> {
        Ok(RejectionRecord {
            actor_id: Uuid::parse_str(&self.actor_id)?,
            target_id: Uuid::parse_str(&self.target_id)?,
            expires_at: self.expires_at,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

/// Upsert keyed on `(actor, target)`; repeating a rejection refreshes
/// the window instead of stacking records.
pub async fn reject(
    pool: &SqlitePool,
    actor: Uuid,
    target: Uuid,
    duration_days: i64,
    now: i64,
) -> AppResult<RejectionRecord> {
    if actor == target {
        return Err(CoreError::InvalidIdentifier("cannot reject yourself".to_string()).into());
    }
    if duration_days <= 0 {
        return Err(
            CoreError::InvalidIdentifier(format!("cooldown of {duration_days} days")).into(),
        );
    }

    let row: RejectionRow = sqlx::query_as(
        "INSERT INTO rejections (actor_id,target_id,expires_at,is_active,created_at)
         VALUES (?,?,?,1,?)
         ON CONFLICT (actor_id,target_id) DO UPDATE SET
             expires_at = excluded.expires_at,
             is_active = 1
         RETURNING actor_id,target_id,expires_at,is_active,created_at",
    )
    .bind(actor.to_string())
    .bind(target.to_string())
    .bind(now + duration_days * SECONDS_PER_DAY)
    .bind(now)
    .fetch_one(pool)
    .await?;

    row.into_record()
}

/// Every target still blocked from the actor's point of view at `now`.
pub async fn active_blocks_for(
    pool: &SqlitePool,
    actor: Uuid,
    now: i64,
) -> AppResult<HashSet<Uuid>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT target_id FROM rejections WHERE actor_id=? AND is_active=1 AND expires_at > ?",
    )
    .bind(actor.to_string())
    .bind(now)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(|(t,)| Ok(Uuid::parse_str(&t)?)).collect()
}

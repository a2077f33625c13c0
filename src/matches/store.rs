//! Canonical pairwise match records.
//!
//! One row per unordered identity pair, enforced by the unique
//! `(user_lo, user_hi)` constraint. The like-upsert is a single
//! statement so concurrent likes from either direction cannot fork the
//! record; the mutual transition is a compare-and-set so the score is
//! written exactly once.

use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::appresult::AppResult;
use crate::error::CoreError;
use crate::scoring::Breakdown;

use super::pair::{CanonicalPair, PairSlot};

#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord {
    pub id: Uuid,
    pub user_lo: Uuid,
    pub user_hi: Uuid,
    pub liked_by_lo: bool,
    pub liked_by_hi: bool,
    pub is_mutual: bool,
    pub score: Option<i64>,
    pub labels: Vec<String>,
    pub breakdown: Option<Breakdown>,
    pub matched_at: Option<i64>,
    pub last_interaction: i64,
}

impl MatchRecord {
    pub fn counterpart_of(&self, id: Uuid) -> Uuid {
        if id == self.user_lo { self.user_hi } else { self.user_lo }
    }

    pub fn is_liked_by(&self, id: Uuid) -> bool {
        if id == self.user_lo {
            self.liked_by_lo
        } else {
            self.liked_by_hi
        }
    }
}

#[derive(sqlx::FromRow)]
struct MatchRow {
    id: String,
    user_lo: String,
    user_hi: String,
    liked_by_lo: bool,
    liked_by_hi: bool,
    is_mutual: bool,
    score: Option<i64>,
    labels: Option<String>,
    breakdown: Option<String>,
    matched_at: Option<i64>,
    last_interaction: i64,
}

impl MatchRow {
    fn into_record(self) -> AppResult<MatchRecord> {
        Ok(MatchRecord {
            id: Uuid::parse_str(&self.id)?,
            user_lo: Uuid::parse_str(&self.user_lo)?,
            user_hi: Uuid::parse_str(&self.user_hi)?,
            liked_by_lo: self.liked_by_lo,
            liked_by_hi: self.liked_by_hi,
            is_mutual: self.is_mutual,
            score: self.score,
            labels: match self.labels {
                Some(json) => serde_json::from_str(&json)?,
                None => Vec::new(),
            },
            breakdown: self.breakdown.as_deref().map(serde_json::from_str).transpose()?,
            matched_at: self.matched_at,
            last_interaction: self.last_interaction,
        })
    }
}

const MATCH_COLUMNS: &str = "id,user_lo,user_hi,liked_by_lo,liked_by_hi,is_mutual,\
     score,labels,breakdown,matched_at,last_interaction";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

/// Find-or-create the record for the pair and set the liker's flag.
/// Idempotent; repeat calls only refresh `last_interaction`. A lost
/// insert race against the unique constraint is retried once, then
/// surfaced as a transient conflict.
pub async fn record_like(
    pool: &SqlitePool,
    pair: &CanonicalPair,
    slot: PairSlot,
    now: i64,
) -> AppResult<MatchRecord> {
    let (like_lo, like_hi) = match slot {
        PairSlot::Lo => (true, false),
        PairSlot::Hi => (false, true),
    };
    let sql = format!(
        "INSERT INTO matches (id,user_lo,user_hi,liked_by_lo,liked_by_hi,last_interaction)
         VALUES (?,?,?,?,?,?)
         ON CONFLICT (user_lo,user_hi) DO UPDATE SET
             liked_by_lo = liked_by_lo OR excluded.liked_by_lo,
             liked_by_hi = liked_by_hi OR excluded.liked_by_hi,
             last_interaction = excluded.last_interaction
         RETURNING {MATCH_COLUMNS}"
    );

    let mut attempts = 0;
    loop {
        let result = sqlx::query_as::<_, MatchRow>(&sql)
            .bind(Uuid::now_v7().to_string())
            .bind(pair.lo.to_string())
            .bind(pair.hi.to_string())
            .bind(like_lo)
            .bind(like_hi)
            .bind(now)
            .fetch_one(pool)
            .await;

        match result {
            Ok(row) => return row.into_record(),
            Err(e) if is_unique_violation(&e) && attempts == 0 => {
                attempts += 1;
            }
            Err(e) if is_unique_violation(&e) => {
                return Err(CoreError::TransientConflict.into());
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Compare-and-set mutual transition. Returns true only for the caller
/// that actually flipped the flag; the score fields are immutable after.
pub async fn promote_to_mutual(
    pool: &SqlitePool,
    match_id: Uuid,
    score: Option<i64>,
    labels: &[String],
    breakdown: Option<&Breakdown>,
    now: i64,
) -> AppResult<bool> {
    let result = sqlx::query(
        "UPDATE matches
         SET is_mutual=1, matched_at=?, score=?, labels=?, breakdown=?, last_interaction=?
         WHERE id=? AND is_mutual=0",
    )
    .bind(now)
    .bind(score)
    .bind(serde_json::to_string(labels)?)
    .bind(breakdown.map(serde_json::to_string).transpose()?)
    .bind(now)
    .bind(match_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn find_by_pair(pool: &SqlitePool, pair: &CanonicalPair) -> AppResult<Option<MatchRecord>> {
    let row: Option<MatchRow> = sqlx::query_as(&format!(
        "SELECT {MATCH_COLUMNS} FROM matches WHERE user_lo=? AND user_hi=?"
    ))
    .bind(pair.lo.to_string())
    .bind(pair.hi.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(MatchRow::into_record).transpose()
}

/// The mutual record between two identities, if one exists.
pub async fn mutual_between(
    pool: &SqlitePool,
    a: Uuid,
    b: Uuid,
) -> AppResult<Option<MatchRecord>> {
    let (pair, _) = CanonicalPair::new(a, b)?;
    Ok(find_by_pair(pool, &pair).await?.filter(|m| m.is_mutual))
}

pub async fn mutual_partners_of(pool: &SqlitePool, user: Uuid) -> AppResult<Vec<Uuid>> {
    let id = user.to_string();
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT user_lo,user_hi FROM matches WHERE is_mutual=1 AND (user_lo=? OR user_hi=?)",
    )
    .bind(&id)
    .bind(&id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(lo, hi)| {
            let other = if lo == id { hi } else { lo };
            Ok(Uuid::parse_str(&other)?)
        })
        .collect()
}

/// Targets the user liked who have not answered back.
pub async fn liked_unreciprocated_by(pool: &SqlitePool, user: Uuid) -> AppResult<Vec<Uuid>> {
    let id = user.to_string();
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT user_hi FROM matches WHERE user_lo=? AND liked_by_lo=1 AND liked_by_hi=0
         UNION
         SELECT user_lo FROM matches WHERE user_hi=? AND liked_by_hi=1 AND liked_by_lo=0",
    )
    .bind(&id)
    .bind(&id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(|(other,)| Ok(Uuid::parse_str(&other)?)).collect()
}

pub async fn mutual_matches_for(pool: &SqlitePool, user: Uuid) -> AppResult<Vec<MatchRecord>> {
    let id = user.to_string();
    let rows: Vec<MatchRow> = sqlx::query_as(&format!(
        "SELECT {MATCH_COLUMNS} FROM matches
         WHERE is_mutual=1 AND (user_lo=? OR user_hi=?)
         ORDER BY last_interaction DESC"
    ))
    .bind(&id)
    .bind(&id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(MatchRow::into_record).collect()
}

pub async fn touch_interaction(pool: &SqlitePool, match_id: Uuid, now: i64) -> AppResult<()> {
    sqlx::query("UPDATE matches SET last_interaction=? WHERE id=?")
        .bind(now)
        .bind(match_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

//! Candidate generation, exclusion and ranking.

use std::collections::HashSet;

use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::appresult::AppResult;
use crate::error::CoreError;
use crate::profiles::{self, Profile};
use crate::scoring::{self, Breakdown};

use super::{rejections, store};

/// Candidates scoring below this never surface.
pub const MIN_SCORE: i64 = 40;

#[derive(Debug, Serialize)]
pub struct Suggestion {
    pub candidate_id: Uuid,
    pub profile: Profile,
    pub score: i64,
    pub labels: Vec<String>,
    pub breakdown: Breakdown,
}

/// Identities never shown to the actor: themself, settled matches,
/// unanswered outgoing likes, and active rejections. Incoming likes the
/// actor has not answered stay visible on purpose: that is how they get
/// answered.
async fn exclusion_set(pool: &SqlitePool, actor: Uuid, now: i64) -> AppResult<HashSet<Uuid>> {
    let mut excluded = HashSet::new();
    excluded.insert(actor);
    excluded.extend(store::mutual_partners_of(pool, actor).await?);
    excluded.extend(store::liked_unreciprocated_by(pool, actor).await?);
    excluded.extend(rejections::active_blocks_for(pool, actor, now).await?);

    Ok(excluded)
}

pub async fn suggestions_for(
    pool: &SqlitePool,
    actor_id: Uuid,
    limit: usize,
    now: i64,
) -> AppResult<Vec<Suggestion>> {
    let actor = profiles::fetch(pool, actor_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("profile {actor_id}")))?;
    if !actor.is_scorable() {
        return Err(CoreError::IncompleteProfile(actor_id).into());
    }

    let excluded = exclusion_set(pool, actor_id, now).await?;

    let mut ranked = Vec::new();
    for candidate in profiles::candidates_for(pool, &actor).await? {
        if excluded.contains(&candidate.user_id) {
            continue;
        }
        let Some(compat) = scoring::score(&actor, &candidate)? else {
            continue;
        };
        if compat.value < MIN_SCORE {
            continue;
        }

        ranked.push(Suggestion {
            candidate_id: candidate.user_id,
            score: compat.value,
            labels: compat.labels,
            breakdown: compat.breakdown,
            profile: candidate,
        });
    }

    // Total, stable order: score, then recency, then id, so repeated
    // calls over unchanged data page identically.
    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.profile.last_active_at.cmp(&a.profile.last_active_at))
            .then(a.candidate_id.cmp(&b.candidate_id))
    });
    ranked.truncate(limit);

    Ok(ranked)
}

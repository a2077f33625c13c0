//! The like state machine: none → one-sided → mutual.
//!
//! Mutual is terminal; later interactions only refresh timestamps.
//! Scoring is deferred until the mutual transition so one-sided likes
//! never pay for it, and the transition itself is a storage-level
//! compare-and-set, so exactly one caller computes and persists the
//! score and emits the match events.

use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::appresult::AppResult;
use crate::clock::now_unix;
use crate::error::CoreError;
use crate::notify::{Notification, NotificationKind};
use crate::profiles::{self, Profile};
use crate::rooms::events::ServerEvent;
use crate::scoring;

use super::pair::CanonicalPair;
use super::store::{self, MatchRecord};

#[derive(Debug)]
pub struct LikeOutcome {
    pub record: MatchRecord,
    pub is_mutual_match: bool,
}

async fn scorable_profile(state: &AppState, id: Uuid) -> AppResult<Profile> {
    let profile = profiles::fetch(&state.db_pool, id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("profile {id}")))?;
    if !profile.is_scorable() {
        return Err(CoreError::IncompleteProfile(id).into());
    }

    Ok(profile)
}

pub async fn like(state: &AppState, actor: Uuid, target: Uuid) -> AppResult<LikeOutcome> {
    let (pair, slot) = CanonicalPair::new(actor, target)?;
    let actor_profile = scorable_profile(state, actor).await?;
    let target_profile = scorable_profile(state, target).await?;

    // Pre-read so a repeated like from the same actor does not re-notify.
    // The upsert below stays the atomic part; at worst a racing first
    // like duplicates a notification, never a record.
    let actor_already_liked = store::find_by_pair(&state.db_pool, &pair)
        .await?
        .is_some_and(|m| m.is_liked_by(actor));

    let record = store::record_like(&state.db_pool, &pair, slot, now_unix()).await?;

    if record.liked_by_lo && record.liked_by_hi && !record.is_mutual {
        return mutual_transition(state, &pair, record, &actor_profile, &target_profile).await;
    }

    if !record.is_mutual && !actor_already_liked {
        let message = format!("{} sent you a like", actor_profile.display_name);
        state
            .router
            .emit_personal(target, ServerEvent::NewLike { counterpart_id: actor, message: message.clone() })
            .await;
        state.notifier.record(Notification {
            user_id: target,
            kind: NotificationKind::NewLike,
            body: message,
        });
    }

    let is_mutual_match = record.is_mutual;
    Ok(LikeOutcome { record, is_mutual_match })
}

async fn mutual_transition(
    state: &AppState,
    pair: &CanonicalPair,
    record: MatchRecord,
    actor_profile: &Profile,
    target_profile: &Profile,
) -> AppResult<LikeOutcome> {
    // Deferred scoring, once per pair. A veto here is not an error: the
    // pair still matched, it just carries no score.
    let verdict = scoring::score(actor_profile, target_profile)?;
    let (score, labels, breakdown) = match verdict {
        Some(c) => (Some(c.value), c.labels, Some(c.breakdown)),
        None => (None, Vec::new(), None),
    };

    let won = store::promote_to_mutual(
        &state.db_pool,
        record.id,
        score,
        &labels,
        breakdown.as_ref(),
        now_unix(),
    )
    .await?;

    let record = store::find_by_pair(&state.db_pool, pair)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("match {}", record.id)))?;

    if won {
        info!(match_id = %record.id, score = ?record.score, "mutual match");
        announce_match(state, &record, actor_profile, target_profile).await;
    }

    Ok(LikeOutcome { is_mutual_match: record.is_mutual, record })
}

/// Mutual-detection happened before this is called; both parties get the
/// event on their personal channels, and both get a persisted
/// notification.
async fn announce_match(
    state: &AppState,
    record: &MatchRecord,
    actor_profile: &Profile,
    target_profile: &Profile,
) {
    for (me, other) in [(actor_profile, target_profile), (target_profile, actor_profile)] {
        let message = format!("You and {} are a match", other.display_name);
        state
            .router
            .emit_personal(
                me.user_id,
                ServerEvent::NewMatch {
                    match_id: record.id,
                    counterpart_id: other.user_id,
                    message: message.clone(),
                    action_url: format!("/r/{}/messages", other.user_id),
                },
            )
            .await;
        state.notifier.record(Notification {
            user_id: me.user_id,
            kind: NotificationKind::NewMatch,
            body: message,
        });
    }
}

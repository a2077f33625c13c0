pub mod engine;
pub mod pair;
pub mod rejections;
pub mod store;
pub mod suggest;

use axum::{
    Json, Router, debug_handler,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState,
    appresult::AppResult,
    auth::Identity,
    clock::now_unix,
    notify::Capability,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/suggested", get(suggested))
        .route("/{target}/like", post(like))
        .route("/{target}/reject", post(reject))
}

#[derive(Serialize)]
struct LikeResponse {
    #[serde(rename = "match")]
    record: store::MatchRecord,
    is_mutual_match: bool,
}

#[debug_handler]
async fn like(
    Identity(actor): Identity,
    State(state): State<AppState>,
    Path(target): Path<Uuid>,
) -> AppResult<Json<LikeResponse>> {
    state.gate.require(actor, Capability::Like).await?;

    let outcome = engine::like(&state, actor, target).await?;
    Ok(Json(LikeResponse {
        record: outcome.record,
        is_mutual_match: outcome.is_mutual_match,
    }))
}

#[derive(Deserialize)]
struct RejectBody {
    days: Option<i64>,
}

#[derive(Serialize)]
struct RejectResponse {
    rejection: rejections::RejectionRecord,
}

#[debug_handler]
async fn reject(
    Identity(actor): Identity,
    State(state): State<AppState>,
    Path(target): Path<Uuid>,
    body: Option<Json<RejectBody>>,
) -> AppResult<Json<RejectResponse>> {
    state.gate.require(actor, Capability::Like).await?;

    let days = body
        .and_then(|Json(b)| b.days)
        .unwrap_or(state.config.default_cooldown_days);
    let rejection = rejections::reject(&state.db_pool, actor, target, days, now_unix()).await?;

    Ok(Json(RejectResponse { rejection }))
}

#[debug_handler]
async fn list(
    Identity(actor): Identity,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<store::MatchRecord>>> {
    let records = store::mutual_matches_for(&state.db_pool, actor).await?;
    Ok(Json(records))
}

#[derive(Deserialize)]
struct SuggestQuery {
    limit: Option<usize>,
}

#[debug_handler]
async fn suggested(
    Identity(actor): Identity,
    State(state): State<AppState>,
    Query(SuggestQuery { limit }): Query<SuggestQuery>,
) -> AppResult<Json<Vec<suggest::Suggestion>>> {
    state.gate.require(actor, Capability::Suggestions).await?;

    let limit = limit.unwrap_or(20).min(state.config.max_suggestions);
    let items = suggest::suggestions_for(&state.db_pool, actor, limit, now_unix()).await?;

    Ok(Json(items))
}

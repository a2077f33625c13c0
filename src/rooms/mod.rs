pub mod address;
pub mod delivery;
pub mod events;
pub mod msg;
pub mod reconcile;
pub mod registry;
mod ws;

use axum::{
    Json, Router, debug_handler,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, appresult::AppResult, auth::Identity, notify::Capability};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::chat_ws))
        .route("/{peer}/messages", get(get_conversation).post(post_message))
}

#[debug_handler]
async fn get_conversation(
    Identity(actor): Identity,
    State(state): State<AppState>,
    Path(peer): Path<Uuid>,
) -> AppResult<Json<Vec<msg::Message>>> {
    let transcript = delivery::conversation(&state, actor, peer).await?;
    Ok(Json(transcript))
}

#[derive(Deserialize)]
struct SendMessageBody {
    content: String,
    kind: Option<String>,
}

#[debug_handler]
async fn post_message(
    Identity(actor): Identity,
    State(state): State<AppState>,
    Path(peer): Path<Uuid>,
    Json(SendMessageBody { content, kind }): Json<SendMessageBody>,
) -> AppResult<Json<msg::Message>> {
    state.gate.require(actor, Capability::Message).await?;

    let message = delivery::send_message(&state, actor, peer, content, kind).await?;
    Ok(Json(message))
}

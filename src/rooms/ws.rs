use axum::{
    debug_handler,
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message as WsMessage, WebSocket},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{AppState, appresult::AppResult};

use super::address::ConversationRouter;
use super::delivery;
use super::events::{ClientEvent, ServerEvent};

#[derive(Deserialize)]
pub(crate) struct WsQuery {
    token: String,
}

#[debug_handler]
pub(crate) async fn chat_ws(
    State(state): State<AppState>,
    Query(WsQuery { token }): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    // The credential is checked before the upgrade is admitted.
    let user_id = state.verifier.verify(&token).await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, user_id, socket)))
}

async fn handle_socket(state: AppState, user_id: Uuid, socket: WebSocket) {
    let registry = state.router.registry().clone();
    let (conn_id, mut rx) = registry.connect(user_id).await;
    let (mut sender, mut receiver) = socket.split();

    let forward_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if sender.send(text.into()).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = receiver.next().await {
        let WsMessage::Text(text) = frame else {
            continue;
        };
        let Ok(event) = serde_json::from_str::<ClientEvent>(&text) else {
            debug!(%user_id, "unparseable client event");
            continue;
        };

        handle_client_event(&state, user_id, event).await;
    }

    // The socket is gone: drop this connection's room memberships and
    // its registry entry. Nothing persisted is rolled back.
    forward_task.abort();
    registry.disconnect(user_id, conn_id).await;
}

async fn handle_client_event(state: &AppState, user_id: Uuid, event: ClientEvent) {
    let registry = state.router.registry();

    match event {
        // The key always contains the caller's own id, so a connection
        // can only ever join conversations it is a party to.
        ClientEvent::JoinRoom { other_id } => {
            registry
                .join_room(user_id, &ConversationRouter::room_key(user_id, other_id))
                .await;
        }
        ClientEvent::LeaveRoom { other_id } => {
            registry
                .leave_room(user_id, &ConversationRouter::room_key(user_id, other_id))
                .await;
        }
        ClientEvent::TypingStart { recipient_id } => {
            state
                .router
                .emit_personal(
                    recipient_id,
                    ServerEvent::UserTyping { user_id, is_typing: true },
                )
                .await;
        }
        ClientEvent::TypingStop { recipient_id } => {
            state
                .router
                .emit_personal(
                    recipient_id,
                    ServerEvent::UserTyping { user_id, is_typing: false },
                )
                .await;
        }
        ClientEvent::MessageRead { message_id, sender_id: _ } => {
            if let Err(e) = delivery::mark_read(state, user_id, message_id).await {
                warn!(%user_id, %message_id, "read receipt failed: {}", e.0);
            }
        }
    }
}

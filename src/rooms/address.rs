//! Deterministic destinations for conversation traffic.
//!
//! Two addressable destinations per pair: the shared conversation room
//! (canonical, order-independent key) and each identity's personal
//! channel for out-of-band notifications.

use std::sync::Arc;

use uuid::Uuid;

use super::events::ServerEvent;
use super::registry::SessionRegistry;

#[derive(Clone)]
pub struct ConversationRouter {
    registry: Arc<SessionRegistry>,
}

impl ConversationRouter {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// The room key for an unordered pair; both orders produce the same
    /// destination.
    pub fn room_key(a: Uuid, b: Uuid) -> String {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        format!("room:{lo}:{hi}")
    }

    pub async fn emit_room(&self, a: Uuid, b: Uuid, event: ServerEvent) -> usize {
        self.registry.send_room(&Self::room_key(a, b), event).await
    }

    pub async fn emit_personal(&self, user: Uuid, event: ServerEvent) -> bool {
        self.registry.send_personal(user, event).await
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }
}

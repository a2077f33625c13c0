//! Ephemeral identity → connection mapping.
//!
//! Process-local by design: a horizontally scaled deployment would swap
//! this type for one backed by a shared store, which is why it is the
//! only thing the rest of the realtime layer talks to. A new connection
//! for an identity replaces the old one (last-connection-wins; no
//! multi-device fan-out). Room membership lives on the connection, so a
//! disconnect drops memberships and nothing else.

use std::collections::{HashMap, HashSet};

use tokio::sync::{RwLock, mpsc};
use tracing::debug;
use uuid::Uuid;

use super::events::ServerEvent;

struct Connection {
    id: Uuid,
    tx: mpsc::UnboundedSender<ServerEvent>,
    rooms: HashSet<String>,
}

#[derive(Default)]
pub struct SessionRegistry {
    inner: RwLock<HashMap<Uuid, Connection>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection, replacing any prior one for this identity.
    /// The returned id must be handed back on disconnect.
    pub async fn connect(&self, user: Uuid) -> (Uuid, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::now_v7();
        let replaced = self.inner.write().await.insert(
            user,
            Connection { id, tx, rooms: HashSet::new() },
        );
        if replaced.is_some() {
            debug!(%user, "connection replaced by newer socket");
        }

        (id, rx)
    }

    /// Remove the mapping, but only if it still belongs to the given
    /// connection; a reconnect must not be torn down by the old
    /// socket's cleanup racing in behind it.
    pub async fn disconnect(&self, user: Uuid, conn_id: Uuid) {
        let mut inner = self.inner.write().await;
        if inner.get(&user).is_some_and(|c| c.id == conn_id) {
            inner.remove(&user);
        }
    }

    pub async fn join_room(&self, user: Uuid, key: &str) {
        if let Some(conn) = self.inner.write().await.get_mut(&user) {
            conn.rooms.insert(key.to_string());
        }
    }

    pub async fn leave_room(&self, user: Uuid, key: &str) {
        if let Some(conn) = self.inner.write().await.get_mut(&user) {
            conn.rooms.remove(key);
        }
    }

    /// Deliver to one identity's personal channel. Returns false when no
    /// session is live; callers treat that as a quiet miss, recovered
    /// by a fetch on the next connect.
    pub async fn send_personal(&self, user: Uuid, event: ServerEvent) -> bool {
        match self.inner.read().await.get(&user) {
            Some(conn) => conn.tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Deliver to every connection currently joined to the room key.
    pub async fn send_room(&self, key: &str, event: ServerEvent) -> usize {
        let inner = self.inner.read().await;
        let mut delivered = 0;
        for conn in inner.values() {
            if conn.rooms.contains(key) && conn.tx.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }

        delivered
    }

    pub async fn is_online(&self, user: Uuid) -> bool {
        self.inner.read().await.contains_key(&user)
    }
}

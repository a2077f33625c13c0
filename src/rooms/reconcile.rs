//! Client-side optimistic reconciliation.
//!
//! A sending client shows its message immediately under a temporary
//! local id, then has to recognize the server's room broadcast as the
//! echo of that provisional entry and replace it in place instead of
//! appending a duplicate. The echo match (same sender, equal content,
//! timestamps within a bounded window) is best-effort by nature (a
//! client-supplied idempotency key would be strictly better), so the
//! processed-authoritative-id set is the hard guard: a broadcast
//! replayed on rejoin or reconnect is always a no-op.

use std::collections::HashSet;

use uuid::Uuid;

use super::msg::Message;

/// How far apart the provisional and authoritative timestamps may be
/// for a broadcast to count as the echo.
pub const ECHO_WINDOW_MS: i64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Provisional {
        local_id: Uuid,
        content: String,
        sent_at: i64,
    },
    Confirmed(Message),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    ReplacedProvisional,
    Appended,
    AlreadySeen,
}

#[derive(Debug)]
pub struct ConversationView {
    me: Uuid,
    entries: Vec<Entry>,
    seen: HashSet<Uuid>,
}

impl ConversationView {
    pub fn new(me: Uuid) -> Self {
        Self { me, entries: Vec::new(), seen: HashSet::new() }
    }

    /// Optimistic local append; returns the temporary id.
    pub fn push_provisional(&mut self, content: &str, sent_at: i64) -> Uuid {
        let local_id = Uuid::now_v7();
        self.entries.push(Entry::Provisional {
            local_id,
            content: content.to_string(),
            sent_at,
        });

        local_id
    }

    /// Fold one room broadcast into the view.
    pub fn apply_broadcast(&mut self, message: Message) -> Applied {
        if !self.seen.insert(message.id) {
            return Applied::AlreadySeen;
        }

        if message.sender_id == self.me {
            let echo_of = self.entries.iter().position(|entry| match entry {
                Entry::Provisional { content, sent_at, .. } => {
                    *content == message.content
                        && (message.sent_at - sent_at).abs() <= ECHO_WINDOW_MS
                }
                Entry::Confirmed(_) => false,
            });
            if let Some(pos) = echo_of {
                self.entries[pos] = Entry::Confirmed(message);
                return Applied::ReplacedProvisional;
            }
        }

        self.entries.push(Entry::Confirmed(message));
        Applied::Appended
    }

    /// Merge a fetched transcript (the reconnect recovery path). Each
    /// message goes through the same echo/dedupe logic as a live
    /// broadcast. Returns how many were new to the view.
    pub fn apply_history(&mut self, messages: Vec<Message>) -> usize {
        messages
            .into_iter()
            .filter(|m| self.apply_broadcast(m.clone()) != Applied::AlreadySeen)
            .count()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Provisional { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmed(me: Uuid, peer: Uuid, content: &str, sent_at: i64) -> Message {
        Message {
            id: Uuid::now_v7(),
            match_id: Uuid::now_v7(),
            sender_id: me,
            recipient_id: peer,
            content: content.to_string(),
            kind: "text".to_string(),
            is_read: false,
            read_at: None,
            sent_at,
        }
    }

    #[test]
    fn echo_replaces_provisional_in_place() {
        let me = Uuid::now_v7();
        let peer = Uuid::now_v7();
        let mut view = ConversationView::new(me);

        view.push_provisional("hello there", 1_000);
        let echo = confirmed(me, peer, "hello there", 3_500);

        assert_eq!(view.apply_broadcast(echo), Applied::ReplacedProvisional);
        assert_eq!(view.entries().len(), 1);
        assert_eq!(view.pending_count(), 0);
    }

    #[test]
    fn echo_outside_window_appends() {
        let me = Uuid::now_v7();
        let peer = Uuid::now_v7();
        let mut view = ConversationView::new(me);

        view.push_provisional("hello there", 1_000);
        let late = confirmed(me, peer, "hello there", 1_000 + ECHO_WINDOW_MS + 1);

        assert_eq!(view.apply_broadcast(late), Applied::Appended);
        assert_eq!(view.entries().len(), 2);
        assert_eq!(view.pending_count(), 1);
    }

    #[test]
    fn peer_message_with_same_content_never_collapses() {
        let me = Uuid::now_v7();
        let peer = Uuid::now_v7();
        let mut view = ConversationView::new(me);

        view.push_provisional("same words", 1_000);
        let theirs = Message {
            sender_id: peer,
            recipient_id: me,
            ..confirmed(me, peer, "same words", 1_200)
        };

        assert_eq!(view.apply_broadcast(theirs), Applied::Appended);
        assert_eq!(view.entries().len(), 2);
    }

    #[test]
    fn replayed_broadcast_is_a_no_op() {
        let me = Uuid::now_v7();
        let peer = Uuid::now_v7();
        let mut view = ConversationView::new(me);

        let message = confirmed(peer, me, "hi", 1_000);
        assert_eq!(view.apply_broadcast(message.clone()), Applied::Appended);
        assert_eq!(view.apply_broadcast(message), Applied::AlreadySeen);
        assert_eq!(view.entries().len(), 1);
    }

    #[test]
    fn reconnect_fetch_lands_each_message_exactly_once() {
        // Send, miss the live echo, reconnect, fetch the transcript:
        // the message must appear once, as a confirmed entry.
        let me = Uuid::now_v7();
        let peer = Uuid::now_v7();
        let mut view = ConversationView::new(me);

        view.push_provisional("did you get this", 2_000);
        let stored = confirmed(me, peer, "did you get this", 2_400);

        assert_eq!(view.apply_history(vec![stored.clone()]), 1);
        assert_eq!(view.entries().len(), 1);
        assert_eq!(view.pending_count(), 0);

        // The missed broadcast finally arrives after the fetch.
        assert_eq!(view.apply_broadcast(stored), Applied::AlreadySeen);
        assert_eq!(view.entries().len(), 1);
    }

    #[test]
    fn two_provisionals_collapse_oldest_first() {
        let me = Uuid::now_v7();
        let peer = Uuid::now_v7();
        let mut view = ConversationView::new(me);

        view.push_provisional("ping", 1_000);
        view.push_provisional("ping", 1_500);

        let first_echo = confirmed(me, peer, "ping", 1_100);
        assert_eq!(view.apply_broadcast(first_echo), Applied::ReplacedProvisional);
        assert_eq!(view.pending_count(), 1);

        let second_echo = confirmed(me, peer, "ping", 1_600);
        assert_eq!(view.apply_broadcast(second_echo), Applied::ReplacedProvisional);
        assert_eq!(view.pending_count(), 0);
        assert_eq!(view.entries().len(), 2);
    }
}

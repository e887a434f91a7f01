// File: src/cache/message_cache.rs

use std::collections::VecDeque;
use tracing::debug;
use vkwarden_common::models::{CachedMessage, ConversationMessageId, PeerId};

/// Bounded FIFO of messages waiting for their single re-check.
///
/// No deduplication: a message delivered twice is recorded twice, and the sweep treats
/// the second pass as a no-op.
#[derive(Debug)]
pub struct MessageCache {
    entries: VecDeque<CachedMessage>,
    capacity: usize,
}

impl MessageCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends at the tail, evicting the oldest entry once over capacity.
    /// Returns the evicted entry, if any.
    pub fn record(&mut self, msg: CachedMessage) -> Option<CachedMessage> {
        self.entries.push_back(msg);
        if self.entries.len() > self.capacity {
            let evicted = self.entries.pop_front();
            if let Some(ref old) = evicted {
                debug!(
                    "Message cache full => evicted message {} of peer {}",
                    old.conversation_message_id, old.peer_id
                );
            }
            return evicted;
        }
        None
    }

    /// A fresh front-to-back copy of the current entries. The cache can be mutated freely
    /// while the copy is walked.
    pub fn snapshot(&self) -> Vec<CachedMessage> {
        self.entries.iter().cloned().collect()
    }

    /// Removes every entry with this identity. Absence is not an error.
    pub fn remove(&mut self, peer_id: PeerId, conversation_message_id: ConversationMessageId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|m| !m.is(peer_id, conversation_message_id));
        self.entries.len() != before
    }

    /// Drops all entries of one conversation, returning how many were removed.
    pub fn remove_conversation(&mut self, peer_id: PeerId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|m| m.peer_id != peer_id);
        before - self.entries.len()
    }

    pub fn contains(&self, peer_id: PeerId, conversation_message_id: ConversationMessageId) -> bool {
        self.entries.iter().any(|m| m.is(peer_id, conversation_message_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEER: PeerId = 2_000_000_001;

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut cache = MessageCache::new(3);
        for id in 1..=3 {
            assert!(cache.record(CachedMessage::new(PEER, id, 10)).is_none());
        }
        let evicted = cache.record(CachedMessage::new(PEER, 4, 10));

        assert_eq!(evicted.map(|m| m.conversation_message_id), Some(1));
        assert_eq!(cache.len(), 3);
        let ids: Vec<_> = cache.snapshot().iter().map(|m| m.conversation_message_id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_snapshot_is_independent_of_later_mutation() {
        let mut cache = MessageCache::new(10);
        cache.record(CachedMessage::new(PEER, 1, 10));
        cache.record(CachedMessage::new(PEER, 2, 10));

        let snap = cache.snapshot();
        for m in &snap {
            cache.remove(m.peer_id, m.conversation_message_id);
        }
        assert_eq!(snap.len(), 2);
        assert!(cache.is_empty());
        assert!(cache.snapshot().is_empty());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cache = MessageCache::new(10);
        cache.record(CachedMessage::new(PEER, 1, 10));
        assert!(!cache.remove(PEER, 99));
        assert!(!cache.remove(PEER + 1, 1));
        assert_eq!(cache.len(), 1);
        assert!(cache.remove(PEER, 1));
    }

    #[test]
    fn test_remove_conversation() {
        let mut cache = MessageCache::new(10);
        cache.record(CachedMessage::new(PEER, 1, 10));
        cache.record(CachedMessage::new(PEER + 1, 1, 10));
        cache.record(CachedMessage::new(PEER, 2, 10));
        assert_eq!(cache.remove_conversation(PEER), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(PEER + 1, 1));
    }

    #[test]
    fn test_same_message_recorded_twice() {
        let mut cache = MessageCache::new(10);
        cache.record(CachedMessage::new(PEER, 7, 10));
        cache.record(CachedMessage::new(PEER, 7, 10));
        assert_eq!(cache.len(), 2);
        cache.remove(PEER, 7);
        assert!(!cache.contains(PEER, 7));
    }
}

// File: src/cache/tracked.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{error, info};
use vkwarden_common::models::PeerId;
use vkwarden_common::traits::TrackedConversationRepository;

use crate::Error;

/// The conversations the engine reconciles, mirrored to durable storage after every change.
///
/// A failed write is logged; the in-memory set stays authoritative for the running process.
pub struct TrackedConversations {
    peers: BTreeSet<PeerId>,
    repo: Arc<dyn TrackedConversationRepository>,
}

impl TrackedConversations {
    pub async fn load(repo: Arc<dyn TrackedConversationRepository>) -> Result<Self, Error> {
        let peers: BTreeSet<PeerId> = repo.load().await?.into_iter().collect();
        info!("Loaded {} tracked conversation(s)", peers.len());
        Ok(Self { peers, repo })
    }

    pub fn list(&self) -> Vec<PeerId> {
        self.peers.iter().copied().collect()
    }

    pub fn contains(&self, peer_id: PeerId) -> bool {
        self.peers.contains(&peer_id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Returns `false` if the conversation was already tracked.
    pub async fn add(&mut self, peer_id: PeerId) -> bool {
        if !self.peers.insert(peer_id) {
            return false;
        }
        info!("Now tracking conversation {}", peer_id);
        self.persist().await;
        true
    }

    pub async fn remove(&mut self, peer_id: PeerId) -> bool {
        if !self.peers.remove(&peer_id) {
            return false;
        }
        info!("Stopped tracking conversation {}", peer_id);
        self.persist().await;
        true
    }

    async fn persist(&self) {
        if let Err(e) = self.repo.save(&self.list()).await {
            error!("Failed to persist tracked conversations: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::InMemoryTrackedRepository;

    #[tokio::test]
    async fn test_add_and_remove_persist() -> Result<(), Error> {
        let repo = Arc::new(InMemoryTrackedRepository::with(vec![2_000_000_002]));
        let mut tracked = TrackedConversations::load(repo.clone()).await?;
        assert_eq!(tracked.list(), vec![2_000_000_002]);

        assert!(tracked.add(2_000_000_001).await);
        assert!(!tracked.add(2_000_000_001).await);
        assert_eq!(repo.stored().await, vec![2_000_000_001, 2_000_000_002]);

        assert!(tracked.remove(2_000_000_002).await);
        assert!(!tracked.remove(2_000_000_002).await);
        assert_eq!(repo.stored().await, vec![2_000_000_001]);
        assert_eq!(repo.save_count().await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_state() -> Result<(), Error> {
        let repo = Arc::new(InMemoryTrackedRepository::failing_writes());
        let mut tracked = TrackedConversations::load(repo).await?;
        assert!(tracked.is_empty());
        assert!(tracked.add(2_000_000_005).await);
        assert!(tracked.contains(2_000_000_005));
        Ok(())
    }
}

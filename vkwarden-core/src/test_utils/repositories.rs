// File: src/test_utils/repositories.rs

use async_trait::async_trait;
use tokio::sync::Mutex;
use vkwarden_common::models::PeerId;
use vkwarden_common::traits::TrackedConversationRepository;

use crate::Error;

/// Keeps the tracked list in memory and counts writes.
#[derive(Default)]
pub struct InMemoryTrackedRepository {
    stored: Mutex<Vec<PeerId>>,
    saves: Mutex<usize>,
    fail_writes: bool,
}

impl InMemoryTrackedRepository {
    pub fn with(peers: Vec<PeerId>) -> Self {
        Self {
            stored: Mutex::new(peers),
            ..Default::default()
        }
    }

    /// Loads fine but rejects every save.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub async fn stored(&self) -> Vec<PeerId> {
        self.stored.lock().await.clone()
    }

    pub async fn save_count(&self) -> usize {
        *self.saves.lock().await
    }
}

#[async_trait]
impl TrackedConversationRepository for InMemoryTrackedRepository {
    async fn load(&self) -> Result<Vec<PeerId>, Error> {
        Ok(self.stored.lock().await.clone())
    }

    async fn save(&self, peers: &[PeerId]) -> Result<(), Error> {
        if self.fail_writes {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only test repository",
            )));
        }
        *self.stored.lock().await = peers.to_vec();
        *self.saves.lock().await += 1;
        Ok(())
    }
}

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};
pub(crate) use vkwarden_common::traits::repository_traits::TrackedConversationRepository;
use vkwarden_common::models::PeerId;

use crate::Error;

/// Stores the tracked peer ids as a JSON array (`[2000000001, 2000000007]`).
#[derive(Debug, Clone)]
pub struct JsonTrackedConversationRepository {
    path: PathBuf,
}

impl JsonTrackedConversationRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TrackedConversationRepository for JsonTrackedConversationRepository {
    async fn load(&self) -> Result<Vec<PeerId>, Error> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("{} does not exist yet => no tracked conversations", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<PeerId> = serde_json::from_str(&raw)?;
        Ok(ids)
    }

    async fn save(&self, peer_ids: &[PeerId]) -> Result<(), Error> {
        let body = serde_json::to_string_pretty(peer_ids)?;
        // Write next to the target, then rename, so a crash never leaves a truncated file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!("Saved {} tracked conversation(s) to {}", peer_ids.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_loads_empty() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let repo = JsonTrackedConversationRepository::new(dir.path().join("chat_ids.json"));
        assert!(repo.load().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_save_then_load() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let repo = JsonTrackedConversationRepository::new(dir.path().join("chat_ids.json"));
        repo.save(&[2_000_000_001, 2_000_000_009]).await?;

        let reopened = JsonTrackedConversationRepository::new(repo.path().to_path_buf());
        assert_eq!(reopened.load().await?, vec![2_000_000_001, 2_000_000_009]);
        assert!(!dir.path().join("chat_ids.json.tmp").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_garbage_file_is_an_error() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("chat_ids.json");
        fs::write(&path, "not json").await?;
        let repo = JsonTrackedConversationRepository::new(path);
        assert!(matches!(repo.load().await, Err(Error::Json(_))));
        Ok(())
    }
}

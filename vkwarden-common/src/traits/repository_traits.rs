use async_trait::async_trait;

use crate::error::Error;
use crate::models::PeerId;

/// Durable storage for the set of conversations the engine moderates.
///
/// The list must survive restarts; the engine appends to it when it is invited into a
/// conversation and prunes it when a conversation becomes unreachable.
#[async_trait]
pub trait TrackedConversationRepository: Send + Sync {
    async fn load(&self) -> Result<Vec<PeerId>, Error>;
    async fn save(&self, peer_ids: &[PeerId]) -> Result<(), Error>;
}

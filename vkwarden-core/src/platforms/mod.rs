// File: src/platforms/mod.rs

use async_trait::async_trait;
use vkwarden_common::models::{ConversationMessageId, PeerId, UserId};

use crate::Error;

pub mod failure;
pub mod vk;

pub use failure::FailureKind;

/// Outbound calls the engine makes against the chat platform.
///
/// Implementations report failures as-is; retry, fail-open and fail-closed decisions are
/// made by the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, peer_id: PeerId, text: &str) -> Result<(), Error>;

    /// Deletes the message for everyone in the conversation.
    async fn delete_message(
        &self,
        peer_id: PeerId,
        conversation_message_id: ConversationMessageId,
    ) -> Result<(), Error>;

    async fn remove_member(&self, peer_id: PeerId, user_id: UserId) -> Result<(), Error>;

    /// `Ok(None)` when the platform no longer has the message.
    async fn fetch_message_text(
        &self,
        peer_id: PeerId,
        conversation_message_id: ConversationMessageId,
    ) -> Result<Option<String>, Error>;

    async fn fetch_members(&self, peer_id: PeerId) -> Result<Vec<UserId>, Error>;

    async fn check_reference_membership(&self, user_id: UserId) -> Result<bool, Error>;
}

// File: src/platforms/vk/mod.rs

pub mod client;
pub mod events;
pub mod longpoll;
pub mod requests;

use async_trait::async_trait;
use vkwarden_common::models::{ConversationMessageId, PeerId, UserId};

use crate::Error;
use crate::platforms::ChatTransport;

pub use client::VkApiClient;
pub use longpoll::spawn_long_poll_task;

#[async_trait]
impl ChatTransport for VkApiClient {
    async fn send_message(&self, peer_id: PeerId, text: &str) -> Result<(), Error> {
        self.messages_send(peer_id, text).await
    }

    async fn delete_message(
        &self,
        peer_id: PeerId,
        conversation_message_id: ConversationMessageId,
    ) -> Result<(), Error> {
        self.messages_delete(peer_id, conversation_message_id).await
    }

    async fn remove_member(&self, peer_id: PeerId, user_id: UserId) -> Result<(), Error> {
        self.messages_remove_chat_user(peer_id, user_id).await
    }

    async fn fetch_message_text(
        &self,
        peer_id: PeerId,
        conversation_message_id: ConversationMessageId,
    ) -> Result<Option<String>, Error> {
        self.messages_get_text(peer_id, conversation_message_id).await
    }

    async fn fetch_members(&self, peer_id: PeerId) -> Result<Vec<UserId>, Error> {
        self.messages_get_conversation_members(peer_id).await
    }

    async fn check_reference_membership(&self, user_id: UserId) -> Result<bool, Error> {
        let community = self.reference_community().to_string();
        self.groups_is_member(&community, user_id).await
    }
}

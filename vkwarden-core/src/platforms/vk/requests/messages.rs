//! `messages.*` methods used for moderation.

use serde::Deserialize;
use serde_json::Value;
use vkwarden_common::models::{chat_id_from_peer, ConversationMessageId, PeerId, UserId};

use crate::Error;
use crate::platforms::vk::client::VkApiClient;

#[derive(Debug, Deserialize)]
pub(crate) struct MessageItems {
    #[serde(default)]
    pub items: Vec<MessageItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageItem {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationMembers {
    #[serde(default)]
    pub items: Vec<ConversationMember>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationMember {
    pub member_id: i64,
}

impl MessageItems {
    /// Text of the first item; `None` when the platform returned nothing.
    pub(crate) fn first_text(self) -> Option<String> {
        self.items.into_iter().next().map(|m| m.text)
    }
}

impl ConversationMembers {
    /// User ids only; communities (negative ids) are dropped.
    pub(crate) fn user_ids(&self) -> Vec<UserId> {
        self.items.iter().map(|m| m.member_id).filter(|id| *id > 0).collect()
    }
}

impl VkApiClient {
    pub async fn messages_send(&self, peer_id: PeerId, text: &str) -> Result<(), Error> {
        let random_id: i32 = rand::random_range(1..i32::MAX);
        let _: Value = self
            .call(
                "messages.send",
                &[
                    ("peer_id", peer_id.to_string()),
                    ("message", text.to_string()),
                    ("random_id", random_id.to_string()),
                ],
            )
            .await?;
        Ok(())
    }

    /// Deletes for everyone.
    pub async fn messages_delete(
        &self,
        peer_id: PeerId,
        conversation_message_id: ConversationMessageId,
    ) -> Result<(), Error> {
        let _: Value = self
            .call(
                "messages.delete",
                &[
                    ("peer_id", peer_id.to_string()),
                    ("conversation_message_ids", conversation_message_id.to_string()),
                    ("delete_for_all", "1".to_string()),
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn messages_remove_chat_user(&self, peer_id: PeerId, user_id: UserId) -> Result<(), Error> {
        let _: Value = self
            .call(
                "messages.removeChatUser",
                &[
                    ("chat_id", chat_id_from_peer(peer_id).to_string()),
                    ("member_id", user_id.to_string()),
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn messages_get_text(
        &self,
        peer_id: PeerId,
        conversation_message_id: ConversationMessageId,
    ) -> Result<Option<String>, Error> {
        let items: MessageItems = self
            .call(
                "messages.getByConversationMessageId",
                &[
                    ("peer_id", peer_id.to_string()),
                    ("conversation_message_ids", conversation_message_id.to_string()),
                ],
            )
            .await?;
        Ok(items.first_text())
    }

    pub async fn messages_get_conversation_members(&self, peer_id: PeerId) -> Result<Vec<UserId>, Error> {
        let members: ConversationMembers = self
            .call(
                "messages.getConversationMembers",
                &[("peer_id", peer_id.to_string())],
            )
            .await?;
        Ok(members.user_ids())
    }
}

// File: vkwarden-common/src/models/mod.rs
pub mod cache;
pub mod event;
pub mod verdict;

pub use cache::CachedMessage;
pub use event::{ChatAction, ChatActionKind, InboundEvent};
pub use verdict::{ViolationReason, ViolationVerdict};

/// VK peer identifier of a conversation (`2_000_000_000 + chat_id` for group chats).
pub type PeerId = i64;

/// VK user identifier. Communities and bots carry negative ids.
pub type UserId = i64;

/// Per-conversation message id (`conversation_message_id` in VK terms).
pub type ConversationMessageId = i64;

/// Offset between a group-chat peer id and its `chat_id`.
pub const CHAT_PEER_OFFSET: i64 = 2_000_000_000;

/// Converts a peer id into the `chat_id` expected by chat-management methods.
pub fn chat_id_from_peer(peer_id: PeerId) -> i64 {
    peer_id - CHAT_PEER_OFFSET
}

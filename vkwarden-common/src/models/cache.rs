use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ConversationMessageId, PeerId, UserId};

/// A message that passed (or skipped) the inline check and waits for one re-check
/// against its authoritative text.
///
/// Identity is `(peer_id, conversation_message_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMessage {
    pub peer_id: PeerId,
    pub conversation_message_id: ConversationMessageId,
    pub author_id: UserId,
    pub enqueued_at: DateTime<Utc>,
}

impl CachedMessage {
    pub fn new(peer_id: PeerId, conversation_message_id: ConversationMessageId, author_id: UserId) -> Self {
        Self {
            peer_id,
            conversation_message_id,
            author_id,
            enqueued_at: Utc::now(),
        }
    }

    pub fn is(&self, peer_id: PeerId, conversation_message_id: ConversationMessageId) -> bool {
        self.peer_id == peer_id && self.conversation_message_id == conversation_message_id
    }
}

// File: vkwarden-common/src/models/event.rs

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::models::{ConversationMessageId, PeerId, UserId};

/// Service action attached to a message (someone joined, left, was kicked...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatActionKind {
    /// `chat_invite_user`
    MemberAdded,
    /// `chat_invite_user_by_link`
    MemberJoinedByLink,
    /// `chat_kick_user` (also emitted when a user leaves on their own)
    MemberRemoved,
    Other(String),
}

impl ChatActionKind {
    pub fn from_vk(kind: &str) -> Self {
        match kind {
            "chat_invite_user" => ChatActionKind::MemberAdded,
            "chat_invite_user_by_link" => ChatActionKind::MemberJoinedByLink,
            "chat_kick_user" => ChatActionKind::MemberRemoved,
            other => ChatActionKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ChatActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatActionKind::MemberAdded => write!(f, "chat_invite_user"),
            ChatActionKind::MemberJoinedByLink => write!(f, "chat_invite_user_by_link"),
            ChatActionKind::MemberRemoved => write!(f, "chat_kick_user"),
            ChatActionKind::Other(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAction {
    pub kind: ChatActionKind,
    pub target_member_id: Option<UserId>,
}

/// One inbound message (or service action) delivered by the platform transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub peer_id: PeerId,
    pub conversation_message_id: Option<ConversationMessageId>,
    pub author_id: UserId,
    pub text: Option<String>,
    /// Epoch seconds.
    pub date: i64,
    /// Attachment type tags only (`photo`, `doc`, `wall`...).
    pub attachments: Vec<String>,
    pub action: Option<ChatAction>,
}

impl InboundEvent {
    /// Non-empty text, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}

// File: src/test_utils/fake_transport.rs

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use vkwarden_common::models::{ConversationMessageId, PeerId, UserId};

use crate::Error;
use crate::platforms::ChatTransport;

/// Every call the engine made, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Send { peer_id: PeerId, text: String },
    Delete { peer_id: PeerId, conversation_message_id: ConversationMessageId },
    Remove { peer_id: PeerId, user_id: UserId },
    FetchText { peer_id: PeerId, conversation_message_id: ConversationMessageId },
    FetchMembers { peer_id: PeerId },
    CheckMembership { user_id: UserId },
}

#[derive(Default)]
struct FakeState {
    texts: HashMap<(PeerId, ConversationMessageId), String>,
    members: HashMap<PeerId, Vec<UserId>>,
    member_failures: HashMap<PeerId, i64>,
    removal_failures: HashMap<UserId, i64>,
    text_failures: HashSet<(PeerId, ConversationMessageId)>,
    non_members: HashSet<UserId>,
    reference_checks_fail: bool,
    calls: Vec<TransportCall>,
}

/// A scriptable platform: conversations, member lists and message texts live in memory,
/// and failures are injected as VK error codes.
///
/// Removing a member drops them from the conversation; deleting a message drops its text.
#[derive(Default)]
pub struct FakeTransport {
    state: Mutex<FakeState>,
}

fn vk_error(code: i64) -> Error {
    Error::VkApi { code, message: format!("injected error {code}") }
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_text(&self, peer_id: PeerId, cmid: ConversationMessageId, text: &str) {
        self.state().texts.insert((peer_id, cmid), text.to_string());
    }

    pub fn set_members(&self, peer_id: PeerId, members: Vec<UserId>) {
        self.state().members.insert(peer_id, members);
    }

    pub fn members(&self, peer_id: PeerId) -> Vec<UserId> {
        self.state().members.get(&peer_id).cloned().unwrap_or_default()
    }

    /// Member fetches for this conversation fail with `code` until cleared.
    pub fn fail_members_with(&self, peer_id: PeerId, code: i64) {
        self.state().member_failures.insert(peer_id, code);
    }

    pub fn clear_member_failure(&self, peer_id: PeerId) {
        self.state().member_failures.remove(&peer_id);
    }

    pub fn fail_removal_with(&self, user_id: UserId, code: i64) {
        self.state().removal_failures.insert(user_id, code);
    }

    pub fn fail_text_fetch(&self, peer_id: PeerId, cmid: ConversationMessageId) {
        self.state().text_failures.insert((peer_id, cmid));
    }

    /// Marks a user as outside the reference community.
    pub fn set_non_member(&self, user_id: UserId) {
        self.state().non_members.insert(user_id);
    }

    pub fn fail_reference_checks(&self) {
        self.state().reference_checks_fail = true;
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.state().calls.clone()
    }

    pub fn removals(&self) -> Vec<(PeerId, UserId)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TransportCall::Remove { peer_id, user_id } => Some((peer_id, user_id)),
                _ => None,
            })
            .collect()
    }

    pub fn sent(&self) -> Vec<(PeerId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TransportCall::Send { peer_id, text } => Some((peer_id, text)),
                _ => None,
            })
            .collect()
    }

    pub fn deletions(&self) -> Vec<(PeerId, ConversationMessageId)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TransportCall::Delete { peer_id, conversation_message_id } => {
                    Some((peer_id, conversation_message_id))
                }
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn send_message(&self, peer_id: PeerId, text: &str) -> Result<(), Error> {
        self.state().calls.push(TransportCall::Send { peer_id, text: text.to_string() });
        Ok(())
    }

    async fn delete_message(
        &self,
        peer_id: PeerId,
        conversation_message_id: ConversationMessageId,
    ) -> Result<(), Error> {
        let mut state = self.state();
        state.calls.push(TransportCall::Delete { peer_id, conversation_message_id });
        match state.texts.remove(&(peer_id, conversation_message_id)) {
            Some(_) => Ok(()),
            None => Err(vk_error(104)),
        }
    }

    async fn remove_member(&self, peer_id: PeerId, user_id: UserId) -> Result<(), Error> {
        let mut state = self.state();
        state.calls.push(TransportCall::Remove { peer_id, user_id });
        if let Some(code) = state.removal_failures.get(&user_id) {
            return Err(vk_error(*code));
        }
        let members = state.members.entry(peer_id).or_default();
        match members.iter().position(|m| *m == user_id) {
            Some(idx) => {
                members.remove(idx);
                Ok(())
            }
            None => Err(vk_error(935)),
        }
    }

    async fn fetch_message_text(
        &self,
        peer_id: PeerId,
        conversation_message_id: ConversationMessageId,
    ) -> Result<Option<String>, Error> {
        let mut state = self.state();
        state.calls.push(TransportCall::FetchText { peer_id, conversation_message_id });
        if state.text_failures.contains(&(peer_id, conversation_message_id)) {
            return Err(vk_error(10));
        }
        Ok(state.texts.get(&(peer_id, conversation_message_id)).cloned())
    }

    async fn fetch_members(&self, peer_id: PeerId) -> Result<Vec<UserId>, Error> {
        let mut state = self.state();
        state.calls.push(TransportCall::FetchMembers { peer_id });
        if let Some(code) = state.member_failures.get(&peer_id) {
            return Err(vk_error(*code));
        }
        Ok(state.members.get(&peer_id).cloned().unwrap_or_default())
    }

    async fn check_reference_membership(&self, user_id: UserId) -> Result<bool, Error> {
        let mut state = self.state();
        state.calls.push(TransportCall::CheckMembership { user_id });
        if state.reference_checks_fail {
            return Err(vk_error(6));
        }
        Ok(!state.non_members.contains(&user_id))
    }
}

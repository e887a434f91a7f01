//! Wrapper around the destructive platform calls (delete message, remove member).
//!
//! Every call is bounded by a timeout. Failures are classified and logged here and never
//! propagate to the caller: the caller only gets an outcome to act on.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use vkwarden_common::models::{ConversationMessageId, PeerId, UserId};

use crate::Error;
use crate::cache::MembershipCache;
use crate::platforms::{ChatTransport, FailureKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyGone,
    PermissionDenied,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    Removed,
    /// The user was not in the conversation; no removal call was made or the platform
    /// reported them as already gone.
    AlreadyAbsent,
    PermissionDenied,
    Failed,
}

pub struct ActionExecutor {
    transport: Arc<dyn ChatTransport>,
    call_timeout: Duration,
}

impl ActionExecutor {
    pub fn new(transport: Arc<dyn ChatTransport>, call_timeout: Duration) -> Self {
        Self { transport, call_timeout }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        Ok(timeout(self.call_timeout, fut).await??)
    }

    pub async fn fetch_message_text(
        &self,
        peer_id: PeerId,
        cmid: ConversationMessageId,
    ) -> Result<Option<String>, Error> {
        self.bounded(self.transport.fetch_message_text(peer_id, cmid)).await
    }

    pub async fn fetch_members(&self, peer_id: PeerId) -> Result<Vec<UserId>, Error> {
        self.bounded(self.transport.fetch_members(peer_id)).await
    }

    /// Fail-open: if the check itself fails the user is treated as a member.
    pub async fn is_reference_member(&self, user_id: UserId) -> bool {
        match self.bounded(self.transport.check_reference_membership(user_id)).await {
            Ok(is_member) => is_member,
            Err(e) => {
                warn!("Reference membership check for {} failed ({:?}) => assuming member", user_id, e);
                true
            }
        }
    }

    pub async fn send_message(&self, peer_id: PeerId, text: &str) -> bool {
        match self.bounded(self.transport.send_message(peer_id, text)).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to send message to {}: {:?}", peer_id, e);
                false
            }
        }
    }

    /// Deletes for everyone. Failures end in a log line, whatever their cause.
    pub async fn delete_message(&self, peer_id: PeerId, cmid: ConversationMessageId) -> DeleteOutcome {
        match self.bounded(self.transport.delete_message(peer_id, cmid)).await {
            Ok(()) => {
                info!("Message {} deleted in {}", cmid, peer_id);
                DeleteOutcome::Deleted
            }
            Err(e) => match FailureKind::of(&e) {
                FailureKind::NotFound => {
                    debug!("Message {} in {} already gone: {:?}", cmid, peer_id, e);
                    DeleteOutcome::AlreadyGone
                }
                FailureKind::PermissionDenied => {
                    warn!(
                        "Cannot delete message {} in {}: the bot needs administrator rights ({:?})",
                        cmid, peer_id, e
                    );
                    DeleteOutcome::PermissionDenied
                }
                _ => {
                    error!("Failed to delete message {} in {}: {:?}", cmid, peer_id, e);
                    DeleteOutcome::Failed
                }
            },
        }
    }

    /// Removes `user_id` after confirming they are still present.
    ///
    /// Presence comes from a fresh member fetch; if that fails the cached snapshot is used,
    /// and with no snapshot either the removal is attempted.
    pub async fn remove_member(
        &self,
        members: &mut MembershipCache,
        peer_id: PeerId,
        user_id: UserId,
    ) -> RemovalOutcome {
        let present = match self.fetch_members(peer_id).await {
            Ok(roster) => roster.contains(&user_id),
            Err(e) => {
                debug!("Member fetch for {} failed ({:?}) => using cached snapshot", peer_id, e);
                members.contains(peer_id, user_id).unwrap_or(true)
            }
        };
        self.remove_if_present(members, peer_id, user_id, present).await
    }

    /// Same as [`remove_member`](Self::remove_member) with an already fetched roster.
    pub async fn remove_member_in_roster(
        &self,
        members: &mut MembershipCache,
        peer_id: PeerId,
        user_id: UserId,
        roster: &[UserId],
    ) -> RemovalOutcome {
        self.remove_if_present(members, peer_id, user_id, roster.contains(&user_id)).await
    }

    async fn remove_if_present(
        &self,
        members: &mut MembershipCache,
        peer_id: PeerId,
        user_id: UserId,
        present: bool,
    ) -> RemovalOutcome {
        if !present {
            debug!("User {} is not in {} => nothing to remove", user_id, peer_id);
            members.remove_member(peer_id, user_id);
            return RemovalOutcome::AlreadyAbsent;
        }

        match self.bounded(self.transport.remove_member(peer_id, user_id)).await {
            Ok(()) => {
                info!("User {} removed from {}", user_id, peer_id);
                members.remove_member(peer_id, user_id);
                RemovalOutcome::Removed
            }
            Err(e) => match FailureKind::of(&e) {
                FailureKind::NotFound => {
                    info!("User {} was already not in {}", user_id, peer_id);
                    members.remove_member(peer_id, user_id);
                    RemovalOutcome::AlreadyAbsent
                }
                FailureKind::PermissionDenied => {
                    warn!(
                        "Cannot remove user {} from {}: grant the bot administrator rights ({:?})",
                        user_id, peer_id, e
                    );
                    RemovalOutcome::PermissionDenied
                }
                _ => {
                    error!("Failed to remove user {} from {}: {:?}", user_id, peer_id, e);
                    RemovalOutcome::Failed
                }
            },
        }
    }
}

//! The actor that owns all moderation state.
//!
//! Inbound handling lives in `message_service.rs`, reconciliation in `reconciler.rs`;
//! both are `impl ModerationEngine` blocks over the state defined here.

use std::sync::Arc;

use tracing::{debug, info};
use vkwarden_common::models::{ConversationMessageId, PeerId, UserId, ViolationReason};

use crate::audit::AuditLog;
use crate::cache::{MembershipCache, MessageCache, TrackedConversations};
use crate::config::ModerationConfig;
use crate::eventbus::{WorkItem, WorkReceiver};
use crate::moderation::ViolationDetector;
use crate::platforms::ChatTransport;
use crate::services::action_executor::{ActionExecutor, RemovalOutcome};

pub struct ModerationEngine {
    pub(crate) config: ModerationConfig,
    pub(crate) detector: ViolationDetector,
    pub(crate) executor: ActionExecutor,
    pub(crate) audit: AuditLog,
    pub(crate) messages: MessageCache,
    pub(crate) members: MembershipCache,
    pub(crate) tracked: TrackedConversations,
    /// Epoch seconds; earlier events are backlog and ignored.
    pub(crate) started_at: i64,
}

impl ModerationEngine {
    pub fn new(
        config: ModerationConfig,
        detector: ViolationDetector,
        transport: Arc<dyn ChatTransport>,
        audit: AuditLog,
        tracked: TrackedConversations,
        started_at: i64,
    ) -> Self {
        debug!("ModerationEngine::new() called");
        let executor = ActionExecutor::new(transport, config.call_timeout());
        let messages = MessageCache::new(config.message_cache_capacity);
        Self {
            config,
            detector,
            executor,
            audit,
            messages,
            members: MembershipCache::new(),
            tracked,
            started_at,
        }
    }

    pub fn message_cache(&self) -> &MessageCache {
        &self.messages
    }

    pub fn membership(&self) -> &MembershipCache {
        &self.members
    }

    pub fn tracked(&self) -> &TrackedConversations {
        &self.tracked
    }

    pub async fn handle(&mut self, item: WorkItem) {
        match item {
            WorkItem::Inbound(event) => self.handle_inbound(event).await,
            WorkItem::Tick => {
                self.reconcile().await;
            }
        }
    }

    /// Drains the queue until shutdown is signaled or every producer is gone, handling
    /// one item at a time. Returns the engine so callers can inspect the final state.
    pub async fn run(mut self, mut receiver: WorkReceiver) -> Self {
        let mut shutdown_rx = receiver.shutdown_rx.clone();
        info!(
            "Moderation engine running: {} tracked conversation(s), inline_check={}",
            self.tracked.len(),
            self.config.inline_check
        );

        loop {
            tokio::select! {
                biased;
                Ok(_) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown signaled => moderation engine stopping");
                        break;
                    }
                }
                maybe_item = receiver.recv() => {
                    match maybe_item {
                        Some(item) => self.handle(item).await,
                        None => {
                            info!("Work queue closed => moderation engine stopping");
                            break;
                        }
                    }
                }
            }
        }
        self
    }

    /// Deletes the offending message and, if configured, removes its author.
    pub(crate) async fn enforce_violation(
        &mut self,
        peer_id: PeerId,
        cmid: ConversationMessageId,
        author_id: UserId,
        text: &str,
        reason: ViolationReason,
    ) {
        info!("Violation ({}) in message {} of {} by {}", reason, cmid, peer_id, author_id);
        self.audit.log_violation(peer_id, author_id, text, reason).await;
        self.executor.delete_message(peer_id, cmid).await;

        if self.config.kick_on_violation && author_id > 0 {
            self.executor.remove_member(&mut self.members, peer_id, author_id).await;
        }
    }

    /// Removes a user who is not in the reference community and announces it.
    pub(crate) async fn expel_non_member(
        &mut self,
        peer_id: PeerId,
        user_id: UserId,
        roster: Option<&[UserId]>,
    ) -> RemovalOutcome {
        info!(
            "User {} in {} is not a member of {}",
            user_id, peer_id, self.config.reference_community
        );
        self.audit
            .log_membership_violation(peer_id, user_id, &self.config.reference_community)
            .await;

        let outcome = match roster {
            Some(r) => self.executor.remove_member_in_roster(&mut self.members, peer_id, user_id, r).await,
            None => self.executor.remove_member(&mut self.members, peer_id, user_id).await,
        };
        if outcome == RemovalOutcome::Removed {
            let notice = self.config.removal_notice_for(user_id);
            self.executor.send_message(peer_id, &notice).await;
        }
        outcome
    }
}

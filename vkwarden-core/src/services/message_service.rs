//! Inline handling of inbound events: membership actions, audit logging, the immediate
//! violation check and admission into the message cache.

use tracing::{debug, info, warn};
use vkwarden_common::models::{CachedMessage, ChatAction, ChatActionKind, InboundEvent, PeerId, UserId};

use crate::services::engine::ModerationEngine;

impl ModerationEngine {
    /// Processes one inbound event:
    ///  1. Drops backlog older than the engine start.
    ///  2. Handles member added / joined / removed actions.
    ///  3. Appends the raw message to the message log.
    ///  4. Runs the inline check (if enabled); violations are enforced immediately and
    ///     never cached.
    ///  5. Records the remaining messages for the periodic re-check.
    pub async fn handle_inbound(&mut self, event: InboundEvent) {
        if event.date < self.started_at {
            debug!(
                "Ignoring backlog event from {} in {} (date {} < start {})",
                event.author_id, event.peer_id, event.date, self.started_at
            );
            return;
        }

        if let Some(action) = &event.action {
            self.handle_action(&event, action).await;
        }

        self.audit.log_message(&event).await;

        let (Some(text), Some(cmid)) = (event.text(), event.conversation_message_id) else {
            return;
        };

        if self.config.inline_check {
            let verdict = self.detector.check(text);
            if verdict.is_violation {
                let text = text.to_string();
                self.enforce_violation(event.peer_id, cmid, event.author_id, &text, verdict.reason)
                    .await;
                return;
            }
        }

        self.messages.record(CachedMessage::new(event.peer_id, cmid, event.author_id));
    }

    async fn handle_action(&mut self, event: &InboundEvent, action: &ChatAction) {
        let peer_id = event.peer_id;
        let bot_id = -(self.config.group_id as i64);

        match (&action.kind, action.target_member_id) {
            (ChatActionKind::MemberAdded, Some(id)) if id == bot_id => {
                self.on_bot_invited(peer_id).await;
            }
            (ChatActionKind::MemberAdded, Some(id)) if id > 0 => {
                self.on_member_joined(peer_id, id).await;
            }
            (ChatActionKind::MemberJoinedByLink, _) if event.author_id > 0 => {
                self.on_member_joined(peer_id, event.author_id).await;
            }
            (ChatActionKind::MemberRemoved, Some(id)) if id == bot_id => {
                self.on_bot_removed(peer_id).await;
            }
            (ChatActionKind::MemberRemoved, Some(id)) if id > 0 => {
                if self.members.remove_member(peer_id, id) {
                    debug!("User {} left {} => removed from snapshot", id, peer_id);
                }
            }
            (kind, target) => {
                debug!("Ignoring action {} (target {:?}) in {}", kind, target, peer_id);
            }
        }
    }

    async fn on_bot_invited(&mut self, peer_id: PeerId) {
        info!("Bot was added to conversation {}", peer_id);
        let greeting = self.config.greeting_text.clone();
        self.executor.send_message(peer_id, &greeting).await;
        self.audit.log_invite(peer_id).await;
        // The member snapshot is primed by the next sweep, once the bot has admin rights.
        self.tracked.add(peer_id).await;
    }

    async fn on_bot_removed(&mut self, peer_id: PeerId) {
        warn!("Bot was removed from conversation {} => untracking it", peer_id);
        self.forget_conversation(peer_id).await;
    }

    async fn on_member_joined(&mut self, peer_id: PeerId, user_id: UserId) {
        if self.executor.is_reference_member(user_id).await {
            self.members.add_member(peer_id, user_id);
            return;
        }
        self.expel_non_member(peer_id, user_id, None).await;
    }

    /// Drops every piece of state kept for a conversation.
    pub(crate) async fn forget_conversation(&mut self, peer_id: PeerId) {
        self.tracked.remove(peer_id).await;
        self.members.forget(peer_id);
        let dropped = self.messages.remove_conversation(peer_id);
        if dropped > 0 {
            debug!("Dropped {} cached message(s) of {}", dropped, peer_id);
        }
    }
}

//! Periodic reconciliation: re-checks cached messages against their authoritative text
//! and diffs live conversation membership against the cached snapshots.

use tracing::{debug, error, info, warn};
use vkwarden_common::models::PeerId;

use crate::platforms::FailureKind;
use crate::services::action_executor::RemovalOutcome;
use crate::services::engine::ModerationEngine;

/// Counters for one reconciliation pass, mostly for logging.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub messages_checked: usize,
    pub messages_violating: usize,
    pub messages_cleared: usize,
    pub messages_deferred: usize,
    pub conversations_checked: usize,
    pub conversations_primed: usize,
    pub conversations_demoted: usize,
    pub conversations_untracked: usize,
    pub members_flagged: usize,
    pub members_removed: usize,
}

impl ModerationEngine {
    /// Startup pass: fetch a snapshot for every tracked conversation. Conversations that
    /// cannot be fetched yet stay tracked and are retried by each membership sweep.
    pub async fn initialize(&mut self) -> usize {
        if self.tracked.is_empty() {
            info!("No tracked conversations yet => waiting for the bot to be invited");
            return 0;
        }
        let mut primed = 0;
        for peer_id in self.tracked.list() {
            if self.prime_snapshot(peer_id).await {
                primed += 1;
            }
        }
        info!("Initialization pass primed {}/{} conversation(s)", primed, self.tracked.len());
        primed
    }

    /// One timer tick: message sweep, then membership sweep.
    pub async fn reconcile(&mut self) -> SweepReport {
        let mut report = SweepReport::default();
        self.sweep_messages(&mut report).await;
        self.sweep_members(&mut report).await;
        debug!("Reconciliation finished: {:?}", report);
        report
    }

    /// Each cached message is re-checked at most once. Messages whose text cannot be
    /// fetched stay cached for a later tick.
    pub async fn sweep_messages(&mut self, report: &mut SweepReport) {
        for msg in self.messages.snapshot() {
            let (peer_id, cmid) = (msg.peer_id, msg.conversation_message_id);
            // A duplicate entry may already have been handled earlier in this pass.
            if !self.messages.contains(peer_id, cmid) {
                continue;
            }
            report.messages_checked += 1;

            let text = match self.executor.fetch_message_text(peer_id, cmid).await {
                Ok(Some(text)) if !text.is_empty() => text,
                Ok(_) => {
                    debug!("No text for message {} in {} => keeping it cached", cmid, peer_id);
                    report.messages_deferred += 1;
                    continue;
                }
                Err(e) => {
                    warn!("Fetching message {} in {} failed: {:?} => retry next tick", cmid, peer_id, e);
                    report.messages_deferred += 1;
                    continue;
                }
            };

            self.messages.remove(peer_id, cmid);
            let verdict = self.detector.check(&text);
            if verdict.is_violation {
                report.messages_violating += 1;
                self.enforce_violation(peer_id, cmid, msg.author_id, &text, verdict.reason).await;
            } else {
                report.messages_cleared += 1;
            }
        }
    }

    /// Removes members who appeared since the last snapshot and are not in the reference
    /// community, then replaces the snapshot with the fetched list, including those
    /// members.
    pub async fn sweep_members(&mut self, report: &mut SweepReport) {
        for peer_id in self.tracked.list() {
            if !self.members.has_snapshot(peer_id) {
                if self.prime_snapshot(peer_id).await {
                    report.conversations_primed += 1;
                }
                continue;
            }
            report.conversations_checked += 1;

            let authoritative = match self.executor.fetch_members(peer_id).await {
                Ok(list) => list,
                Err(e) if FailureKind::of(&e).is_transient() => {
                    warn!("Member fetch for {} failed: {:?} => retry next tick", peer_id, e);
                    continue;
                }
                Err(e) if FailureKind::of(&e) == FailureKind::PermissionDenied => {
                    // Still in the chat but no longer an administrator. Re-primed once the
                    // rights come back.
                    warn!(
                        "Lost administrator rights in {} ({:?}) => dropping its snapshot until restored",
                        peer_id, e
                    );
                    self.members.forget(peer_id);
                    report.conversations_demoted += 1;
                    continue;
                }
                Err(e) => {
                    error!("Conversation {} is unreachable ({:?}) => untracking it", peer_id, e);
                    self.forget_conversation(peer_id).await;
                    report.conversations_untracked += 1;
                    continue;
                }
            };

            for user_id in self.members.new_members(peer_id, &authoritative) {
                if self.executor.is_reference_member(user_id).await {
                    continue;
                }
                report.members_flagged += 1;
                let outcome = self.expel_non_member(peer_id, user_id, Some(&authoritative)).await;
                if outcome == RemovalOutcome::Removed {
                    report.members_removed += 1;
                }
            }

            self.members.replace(peer_id, authoritative);
        }
    }

    async fn prime_snapshot(&mut self, peer_id: PeerId) -> bool {
        match self.executor.fetch_members(peer_id).await {
            Ok(list) => {
                debug!("Primed snapshot of {} with {} member(s)", peer_id, list.len());
                self.members.replace(peer_id, list);
                true
            }
            Err(e) if FailureKind::of(&e) == FailureKind::PermissionDenied => {
                warn!("Cannot read members of {} yet: the bot needs administrator rights", peer_id);
                false
            }
            Err(e) => {
                warn!("Cannot read members of {}: {:?}", peer_id, e);
                false
            }
        }
    }
}

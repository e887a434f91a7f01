// File: vkwarden-core/tests/reconcile_tests.rs

use std::sync::Arc;
use std::time::Duration;

use vkwarden_common::models::PeerId;
use vkwarden_core::{
    Error,
    ModerationConfig,
    ModerationEngine,
    audit::AuditLog,
    cache::{MembershipCache, TrackedConversations},
    moderation::{LinkClassifier, ViolationDetector},
    repositories::{JsonTrackedConversationRepository, TrackedConversationRepository},
    services::{ActionExecutor, RemovalOutcome},
    test_utils::{FakeTransport, InMemoryTrackedRepository},
};

const PEER: PeerId = 2_000_000_001;

fn config() -> ModerationConfig {
    ModerationConfig {
        group_id: 229,
        reference_community: "club1".into(),
        ..Default::default()
    }
}

fn detector() -> ViolationDetector {
    ViolationDetector::new(["крипта", "казино"], LinkClassifier::new(["vk.com", "vk.me"]))
}

async fn engine_with(
    fake: Arc<FakeTransport>,
    repo: Arc<dyn TrackedConversationRepository>,
    dir: &tempfile::TempDir,
) -> Result<ModerationEngine, Error> {
    let audit = AuditLog::new(dir.path().join("violations.log"), dir.path().join("messages.log"));
    let tracked = TrackedConversations::load(repo).await?;
    Ok(ModerationEngine::new(config(), detector(), fake, audit, tracked, 0))
}

#[tokio::test]
async fn test_sweep_removes_only_new_non_members() -> Result<(), Error> {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeTransport::new());
    fake.set_members(PEER, vec![1, 2, 3]);
    let repo = Arc::new(InMemoryTrackedRepository::with(vec![PEER]));
    let mut engine = engine_with(fake.clone(), repo, &dir).await?;
    assert_eq!(engine.initialize().await, 1);

    // 1 left, 4 joined without the bot seeing a service message.
    fake.set_members(PEER, vec![2, 3, 4]);
    fake.set_non_member(4);
    let report = engine.reconcile().await;

    assert_eq!(report.members_flagged, 1);
    assert_eq!(report.members_removed, 1);
    assert_eq!(fake.removals(), vec![(PEER, 4)]);
    assert_eq!(engine.membership().members(PEER), Some(vec![2, 3, 4]));
    assert_eq!(fake.members(PEER), vec![2, 3]);
    let notices = fake.sent();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].1.starts_with("@id4 "));

    // The next pass converges on the platform's state without further removals.
    fake.clear_calls();
    engine.reconcile().await;
    assert!(fake.removals().is_empty());
    assert_eq!(engine.membership().members(PEER), Some(vec![2, 3]));

    let violations = std::fs::read_to_string(dir.path().join("violations.log")).unwrap();
    assert!(violations.contains("User 4 in conversation 2000000001 is not a member of community club1"));
    Ok(())
}

#[tokio::test]
async fn test_failed_reference_check_keeps_the_member() -> Result<(), Error> {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeTransport::new());
    fake.set_members(PEER, vec![1]);
    let repo = Arc::new(InMemoryTrackedRepository::with(vec![PEER]));
    let mut engine = engine_with(fake.clone(), repo, &dir).await?;
    engine.initialize().await;

    fake.set_members(PEER, vec![1, 9]);
    fake.set_non_member(9);
    fake.fail_reference_checks();
    engine.reconcile().await;

    assert!(fake.removals().is_empty());
    assert_eq!(engine.membership().members(PEER), Some(vec![1, 9]));
    Ok(())
}

#[tokio::test]
async fn test_remove_member_is_idempotent() {
    let fake = Arc::new(FakeTransport::new());
    fake.set_members(PEER, vec![10, 20]);
    let executor = ActionExecutor::new(fake.clone(), Duration::from_secs(1));
    let mut members = MembershipCache::new();
    members.replace(PEER, vec![10, 20]);

    let first = executor.remove_member(&mut members, PEER, 20).await;
    let second = executor.remove_member(&mut members, PEER, 20).await;

    assert_eq!(first, RemovalOutcome::Removed);
    assert_eq!(second, RemovalOutcome::AlreadyAbsent);
    assert_eq!(fake.removals(), vec![(PEER, 20)]);
    assert_eq!(members.contains(PEER, 20), Some(false));
}

#[tokio::test]
async fn test_permission_denied_removal_leaves_snapshot() {
    let fake = Arc::new(FakeTransport::new());
    fake.set_members(PEER, vec![10, 20]);
    fake.fail_removal_with(20, 925);
    let executor = ActionExecutor::new(fake.clone(), Duration::from_secs(1));
    let mut members = MembershipCache::new();
    members.replace(PEER, vec![10, 20]);

    let outcome = executor.remove_member(&mut members, PEER, 20).await;

    assert_eq!(outcome, RemovalOutcome::PermissionDenied);
    assert_eq!(members.contains(PEER, 20), Some(true));
}

#[tokio::test]
async fn test_unreachable_conversation_is_untracked_on_disk() -> Result<(), Error> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat_ids.json");
    std::fs::write(&path, "[2000000001, 2000000002]").unwrap();
    let repo = Arc::new(JsonTrackedConversationRepository::new(&path));

    let fake = Arc::new(FakeTransport::new());
    fake.set_members(PEER, vec![1]);
    fake.set_members(PEER + 1, vec![1]);
    let mut engine = engine_with(fake.clone(), repo.clone(), &dir).await?;
    assert_eq!(engine.initialize().await, 2);

    fake.fail_members_with(PEER + 1, 927);
    let report = engine.reconcile().await;

    assert_eq!(report.conversations_untracked, 1);
    assert_eq!(engine.tracked().list(), vec![PEER]);
    assert_eq!(repo.load().await?, vec![PEER]);

    // Untracked conversations are no longer swept.
    fake.clear_calls();
    engine.reconcile().await;
    assert_eq!(fake.calls().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_transient_fetch_failure_retries_next_tick() -> Result<(), Error> {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeTransport::new());
    fake.set_members(PEER, vec![1]);
    let repo = Arc::new(InMemoryTrackedRepository::with(vec![PEER]));
    let mut engine = engine_with(fake.clone(), repo, &dir).await?;
    engine.initialize().await;

    fake.set_members(PEER, vec![1, 5]);
    fake.set_non_member(5);
    fake.fail_members_with(PEER, 6);
    engine.reconcile().await;
    assert!(engine.tracked().contains(PEER));
    assert!(fake.removals().is_empty());

    fake.clear_member_failure(PEER);
    engine.reconcile().await;
    assert_eq!(fake.removals(), vec![(PEER, 5)]);
    Ok(())
}

#[tokio::test]
async fn test_conversation_recovers_after_admin_rights_return() -> Result<(), Error> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat_ids.json");
    std::fs::write(&path, "[2000000001]").unwrap();
    let repo = Arc::new(JsonTrackedConversationRepository::new(&path));

    let fake = Arc::new(FakeTransport::new());
    fake.set_members(PEER, vec![1]);
    let mut engine = engine_with(fake.clone(), repo.clone(), &dir).await?;
    engine.initialize().await;

    // Demoted for one tick.
    fake.fail_members_with(PEER, 917);
    let report = engine.reconcile().await;
    assert_eq!(report.conversations_demoted, 1);
    assert_eq!(engine.tracked().list(), vec![PEER]);
    assert_eq!(repo.load().await?, vec![PEER]);

    // Rights restored: the next pass re-primes without checks.
    fake.clear_member_failure(PEER);
    let report = engine.reconcile().await;
    assert_eq!(report.conversations_primed, 1);
    assert_eq!(engine.membership().members(PEER), Some(vec![1]));

    fake.set_members(PEER, vec![1, 99]);
    fake.set_non_member(99);
    engine.reconcile().await;

    assert_eq!(fake.removals(), vec![(PEER, 99)]);
    assert_eq!(engine.membership().members(PEER), Some(vec![1, 99]));
    Ok(())
}

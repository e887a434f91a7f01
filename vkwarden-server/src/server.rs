//! vkwarden-server/src/server.rs
//!
//! Wires the VK client, the engine and its background tasks together and runs until
//! Ctrl-C.

use std::sync::Arc;

use tracing::{error, info};
use vkwarden_core::Error;
use vkwarden_core::audit::AuditLog;
use vkwarden_core::cache::TrackedConversations;
use vkwarden_core::eventbus::WorkQueue;
use vkwarden_core::moderation::ViolationDetector;
use vkwarden_core::platforms::vk::VkApiClient;
use vkwarden_core::platforms::vk::longpoll::spawn_long_poll_task;
use vkwarden_core::repositories::JsonTrackedConversationRepository;
use vkwarden_core::tasks::spawn_reconcile_ticker;
use vkwarden_core::utils::time::current_epoch;
use vkwarden_core::{ModerationConfig, ModerationEngine, RuleSet};

use crate::Args;

/// Environment variable holding the community access token.
pub const TOKEN_ENV: &str = "VK_TOKEN";

/// Loads the config file and applies command-line overrides.
pub fn resolve_config(args: &Args) -> Result<ModerationConfig, Error> {
    let mut config = ModerationConfig::load(&args.config)?;
    if let Some(group_id) = args.group_id {
        config.group_id = group_id;
    }
    if let Some(community) = &args.reference_community {
        config.reference_community = community.clone();
    }
    if let Some(secs) = args.reconcile_interval {
        config.reconcile_interval_secs = secs;
    }

    config.validate()?;
    if config.group_id == 0 {
        return Err(Error::Config("group_id is required (config file or --group-id)".into()));
    }
    if config.reference_community.trim().is_empty() {
        return Err(Error::Config(
            "reference_community is required (config file or --reference-community)".into(),
        ));
    }
    Ok(config)
}

pub async fn run_server(args: Args) -> Result<(), Error> {
    let config = resolve_config(&args)?;
    let token = std::env::var(TOKEN_ENV)
        .map_err(|_| Error::Config(format!("{TOKEN_ENV} is not set")))?;

    let rules = RuleSet::load(&config)?;
    let detector = ViolationDetector::from_rules(&rules);

    let mut client = VkApiClient::new(
        &token,
        &config.api_version,
        config.group_id,
        &config.reference_community,
    );
    if let Some(base) = &args.api_base {
        client = client.with_api_base(base);
    }
    let client = Arc::new(client);

    let repo = Arc::new(JsonTrackedConversationRepository::new(&config.tracked_conversations_path));
    let tracked = TrackedConversations::load(repo).await?;
    let audit = AuditLog::new(&config.violations_log_path, &config.messages_log_path);
    let interval = config.reconcile_interval();

    info!(
        "Moderating for group {} against community '{}'",
        config.group_id, config.reference_community
    );
    let mut engine = ModerationEngine::new(config, detector, client.clone(), audit, tracked, current_epoch());
    engine.initialize().await;

    let (queue, receiver) = WorkQueue::new(None);

    // Ctrl-C => signal
    let queue_for_ctrlc = queue.clone();
    let ctrlc_handle = tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {:?}", e);
            return;
        }
        info!("Ctrl-C detected; shutting down...");
        queue_for_ctrlc.shutdown();
    });

    let ticker_handle = spawn_reconcile_ticker(queue.clone(), interval);
    let poll_handle = spawn_long_poll_task(client, queue.clone());
    drop(queue);

    let engine = engine.run(receiver).await;
    info!(
        "Engine stopped with {} tracked conversation(s) and {} cached message(s)",
        engine.tracked().len(),
        engine.message_cache().len()
    );

    poll_handle.abort();
    ticker_handle.abort();
    ctrlc_handle.abort();
    Ok(())
}

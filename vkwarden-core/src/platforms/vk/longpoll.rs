//! src/platforms/vk/longpoll.rs
//!
//! Bots Long Poll intake. Pulls `message_new` updates and pushes them onto the work queue
//! in the order VK delivered them.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::Error;
use crate::eventbus::{WorkItem, WorkQueue};
use super::client::VkApiClient;
use super::events::{parse_poll_response, PollResponse};
use super::requests::groups::LongPollServer;

const WAIT_SECS: u64 = 25;
const RETRY_DELAY: Duration = Duration::from_secs(5);

impl VkApiClient {
    /// One `a_check` request against the long-poll server.
    pub async fn poll_once(&self, server: &LongPollServer, ts: &str) -> Result<PollResponse, Error> {
        let wait = WAIT_SECS.to_string();
        let body = self
            .http_client()
            .get(&server.server)
            .query(&[
                ("act", "a_check"),
                ("key", server.key.as_str()),
                ("ts", ts),
                ("wait", wait.as_str()),
            ])
            .timeout(Duration::from_secs(WAIT_SECS + 10))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_poll_response(&body)
    }
}

/// Spawns the long-poll loop. It stops when the queue shuts down or its receiver is gone.
pub fn spawn_long_poll_task(client: Arc<VkApiClient>, queue: WorkQueue) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut shutdown_rx = queue.shutdown_rx.clone();
        info!("Long poll task started for group {}", client.group_id());

        'session: loop {
            if queue.is_shutdown() {
                break;
            }
            let server = match client.groups_get_long_poll_server().await {
                Ok(s) => s,
                Err(e) => {
                    error!("groups.getLongPollServer failed: {:?} => retrying in {:?}", e, RETRY_DELAY);
                    sleep(RETRY_DELAY).await;
                    continue;
                }
            };
            let mut ts = server.ts.clone();
            debug!("Long poll session opened at ts={}", ts);

            loop {
                let reply = tokio::select! {
                    r = client.poll_once(&server, &ts) => r,
                    Ok(_) = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break 'session;
                        }
                        continue;
                    }
                };

                match reply {
                    Ok(PollResponse::Updates { ts: next, events }) => {
                        ts = next;
                        for event in events {
                            if queue.push(WorkItem::Inbound(event)).await.is_err() {
                                info!("Work queue closed => long poll task exiting");
                                break 'session;
                            }
                        }
                    }
                    Ok(PollResponse::Outdated { ts: next }) => {
                        warn!("Long poll history outdated => continuing from ts={}", next);
                        ts = next;
                    }
                    Ok(PollResponse::Expired) => {
                        info!("Long poll key expired => requesting a new server");
                        continue 'session;
                    }
                    Err(e) => {
                        warn!("Long poll request failed: {:?} => retrying in {:?}", e, RETRY_DELAY);
                        sleep(RETRY_DELAY).await;
                    }
                }
            }
        }
        info!("Long poll task stopped");
    })
}

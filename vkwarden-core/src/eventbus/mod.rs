//! src/eventbus/mod.rs
//!
//! Single-consumer work queue feeding the moderation engine. Inbound platform events and
//! reconciliation ticks share one channel, so the engine sees them strictly in arrival
//! order and never mutates its caches from two places at once.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, watch};
use vkwarden_common::models::InboundEvent;

use crate::Error;

#[derive(Debug, Clone)]
pub enum WorkItem {
    /// A message or service action delivered by the platform.
    Inbound(InboundEvent),
    /// Time to run a reconciliation pass.
    Tick,
}

/// Producer side of the queue, cheap to clone.
#[derive(Clone)]
pub struct WorkQueue {
    tx: mpsc::Sender<WorkItem>,
    tick_pending: Arc<AtomicBool>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Default queue depth. Producers wait when it fills up.
pub const DEFAULT_BUFFER_SIZE: usize = 10000;

/// Consumer side, owned by the engine.
pub struct WorkReceiver {
    rx: mpsc::Receiver<WorkItem>,
    tick_pending: Arc<AtomicBool>,
    pub shutdown_rx: watch::Receiver<bool>,
}

impl WorkQueue {
    /// Creates the queue and the receiver the engine drains.
    pub fn new(buffer_size: Option<usize>) -> (Self, WorkReceiver) {
        let (tx, rx) = mpsc::channel(buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let tick_pending = Arc::new(AtomicBool::new(false));
        let queue = Self {
            tx,
            tick_pending: tick_pending.clone(),
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx: shutdown_rx.clone(),
        };
        let receiver = WorkReceiver { rx, tick_pending, shutdown_rx };
        (queue, receiver)
    }

    pub async fn push(&self, item: WorkItem) -> Result<(), Error> {
        self.tx
            .send(item)
            .await
            .map_err(|_| Error::WorkQueue("engine is no longer receiving".into()))
    }

    /// Queues a tick unless one is already waiting. Returns whether a tick was queued.
    pub async fn request_tick(&self) -> Result<bool, Error> {
        if self.tick_pending.swap(true, Ordering::AcqRel) {
            return Ok(false);
        }
        if let Err(e) = self.push(WorkItem::Tick).await {
            self.tick_pending.store(false, Ordering::Release);
            return Err(e);
        }
        Ok(true)
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }
}

impl WorkReceiver {
    /// Next item in arrival order; `None` once every producer is gone.
    /// Taking a tick re-arms [`WorkQueue::request_tick`].
    pub async fn recv(&mut self) -> Option<WorkItem> {
        let item = self.rx.recv().await;
        if matches!(item, Some(WorkItem::Tick)) {
            self.tick_pending.store(false, Ordering::Release);
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_items_arrive_in_order() {
        let (queue, mut rx) = WorkQueue::new(Some(8));
        queue.push(WorkItem::Tick).await.unwrap();
        queue
            .push(WorkItem::Inbound(InboundEvent {
                peer_id: 1,
                conversation_message_id: Some(2),
                author_id: 3,
                text: Some("x".into()),
                date: 0,
                attachments: vec![],
                action: None,
            }))
            .await
            .unwrap();

        assert!(matches!(rx.recv().await, Some(WorkItem::Tick)));
        assert!(matches!(rx.recv().await, Some(WorkItem::Inbound(e)) if e.author_id == 3));
    }

    #[tokio::test]
    async fn test_ticks_coalesce_until_started() {
        let (queue, mut rx) = WorkQueue::new(Some(8));
        assert!(queue.request_tick().await.unwrap());
        assert!(!queue.request_tick().await.unwrap());

        assert!(matches!(rx.recv().await, Some(WorkItem::Tick)));
        assert!(queue.request_tick().await.unwrap());
    }

    #[tokio::test]
    async fn test_push_after_receiver_dropped() {
        let (queue, receiver) = WorkQueue::new(Some(1));
        drop(receiver);
        assert!(matches!(queue.push(WorkItem::Tick).await, Err(Error::WorkQueue(_))));
        assert!(queue.request_tick().await.is_err());
    }

    #[tokio::test]
    async fn test_recv_ends_when_producers_dropped() {
        let (queue, mut rx) = WorkQueue::new(Some(1));
        drop(queue);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_flag() {
        let (queue, _rx) = WorkQueue::new(None);
        let clone = queue.clone();
        assert!(!clone.is_shutdown());
        queue.shutdown();
        assert!(clone.is_shutdown());
    }
}

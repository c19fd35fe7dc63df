//! Durable FIFO retry queue, one JSON file per device.
//!
//! The queue holds payloads whose live send failed, in arrival order.
//! `dequeue` is eager: items are removed from the file *before*
//! processing, so a caller that fails to process a dequeued batch must
//! restore the failed and unprocessed items explicitly with
//! [`requeue_front`](PersistentQueue::requeue_front), which puts them
//! back at the head so the oldest pending item stays first even when
//! the queue is longer than the drained batch. Queue length is
//! conserved across a failed drain cycle; only delivered items shrink
//! it.
//!
//! Precondition (documented, not enforced): a single owning process per
//! queue file. The handheld control loop drives enqueue and drain
//! sequentially, so there is no internal locking.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use floortrack_core::mirror::to_iso;

/// Delivery status of a queued item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Waiting in the queue for a retry.
    Queued,
    /// Delivered; the item is about to be dropped.
    Sent,
}

/// A payload wrapped with retry bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Target URL the payload is destined for.
    pub target: String,
    /// The scan/job payload as it will be POSTed.
    pub payload: Value,
    pub status: ItemStatus,
    pub retries: u32,
    pub queued_at: String,
    #[serde(default)]
    pub last_retry_at: Option<String>,
}

/// Errors from the queue's backing file.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Queue file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Queue file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Ordered, durable collection of pending payloads.
pub struct PersistentQueue {
    path: PathBuf,
}

impl PersistentQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a fresh payload to the tail.
    ///
    /// Stamps `status = queued`, `retries = 0`, `queued_at = now`, and
    /// mirrors the retry bookkeeping into `payload.metadata` for the
    /// server-side audit trail.
    pub fn enqueue(&self, target: &str, payload: Value) -> Result<(), QueueError> {
        let mut item = QueueItem {
            target: target.to_string(),
            payload,
            status: ItemStatus::Queued,
            retries: 0,
            queued_at: to_iso(chrono::Utc::now()),
            last_retry_at: None,
        };
        stamp_metadata(&mut item);
        self.requeue(item)
    }

    /// Append an already-stamped item to the tail, preserving its
    /// retry count and timestamps.
    pub fn requeue(&self, item: QueueItem) -> Result<(), QueueError> {
        let mut items = self.load()?;
        items.push(item);
        self.save(&items)
    }

    /// Put already-stamped items back at the head, ahead of everything
    /// currently in the file.
    ///
    /// Used to restore a partially-processed batch after a failed
    /// drain: the items were dequeued from the head, so the head is
    /// where they belong, in front of any items that were never
    /// dequeued.
    pub fn requeue_front(&self, items: Vec<QueueItem>) -> Result<(), QueueError> {
        if items.is_empty() {
            return Ok(());
        }
        let mut all = items;
        all.extend(self.load()?);
        self.save(&all)
    }

    /// Eagerly remove and return up to `limit` items from the head.
    ///
    /// A missing queue file is an empty queue, not an error.
    pub fn dequeue(&self, limit: usize) -> Result<Vec<QueueItem>, QueueError> {
        let mut items = self.load()?;
        let rest = items.split_off(limit.min(items.len()));
        self.save(&rest)?;
        Ok(items)
    }

    /// Pending item count.
    pub fn len(&self) -> Result<usize, QueueError> {
        Ok(self.load()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, QueueError> {
        Ok(self.len()? == 0)
    }

    /// Record the outcome of a send attempt on a dequeued item.
    ///
    /// Success marks it `sent` (the caller drops it); failure bumps
    /// `retries`, restores `queued`, and stamps `last_retry_at`. The
    /// payload metadata is kept in sync.
    pub fn update_retry_status(item: &mut QueueItem, success: bool) {
        if success {
            item.status = ItemStatus::Sent;
        } else {
            item.retries += 1;
            item.status = ItemStatus::Queued;
            item.last_retry_at = Some(to_iso(chrono::Utc::now()));
        }
        stamp_metadata(item);
    }

    fn load(&self) -> Result<Vec<QueueItem>, QueueError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, items: &[QueueItem]) -> Result<(), QueueError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(items)?)?;
        Ok(())
    }
}

/// Mirror the item's retry bookkeeping into `payload.metadata`.
fn stamp_metadata(item: &mut QueueItem) {
    let Some(obj) = item.payload.as_object_mut() else {
        return;
    };
    let metadata = obj
        .entry("metadata")
        .or_insert_with(|| Value::Object(Default::default()));
    let Some(metadata) = metadata.as_object_mut() else {
        return;
    };

    let status = match item.status {
        ItemStatus::Queued => "queued",
        ItemStatus::Sent => "sent",
    };
    metadata.insert("status".to_string(), Value::from(status));
    metadata.insert("retries".to_string(), Value::from(item.retries));
    metadata.insert("queued_at".to_string(), Value::from(item.queued_at.clone()));
}

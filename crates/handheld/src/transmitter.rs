//! Send-or-queue transmitter for scan payloads.
//!
//! The transmitter tries a live POST first; on any failure (transport
//! error, timeout, non-2xx) the payload goes into the durable queue for
//! a later [`drain`](Transmitter::drain). Draining is FIFO and stops at
//! the first failure in a batch: that preserves best-effort per-device
//! ordering and avoids hammering an endpoint that is still down.
//!
//! Every outcome is reported to the mirrorctl hook when one is
//! configured, as aggregate (success_count, failure_count) pairs.
//!
//! 4xx responses retry like any other failure. A payload the server
//! rejects permanently stays in the queue until an operator purges it;
//! the ingestion endpoint's upfront validation exists to keep such
//! payloads from being created in the first place.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::queue::PersistentQueue;

/// Default batch size for a single drain pass.
pub const DEFAULT_DRAIN_LIMIT: usize = 20;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Callback receiving (success_count, failure_count) after each
/// send/drain; wired to mirrorctl in production.
pub type MirrorHook = Box<dyn Fn(u32, u32) + Send + Sync>;

/// A single delivery attempt failure.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("Server returned HTTP {0}")]
    HttpStatus(u16),
}

/// The delivery seam: one POST of one payload to one target.
///
/// Production uses [`HttpSender`]; tests substitute scripted
/// implementations.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn post(&self, target: &str, payload: &Value) -> Result<(), SendError>;
}

/// HTTP implementation of [`Sender`] with bearer-token auth and a
/// bounded per-request timeout.
pub struct HttpSender {
    client: reqwest::Client,
    api_token: String,
}

impl HttpSender {
    pub fn new(api_token: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, api_token }
    }
}

#[async_trait]
impl Sender for HttpSender {
    async fn post(&self, target: &str, payload: &Value) -> Result<(), SendError> {
        let response = self
            .client
            .post(target)
            .bearer_auth(&self.api_token)
            .json(payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SendError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Attempts immediate sends and falls back to the durable queue.
pub struct Transmitter<S: Sender> {
    sender: S,
    queue: PersistentQueue,
    mirror_hook: Option<MirrorHook>,
}

impl<S: Sender> Transmitter<S> {
    pub fn new(sender: S, queue: PersistentQueue) -> Self {
        Self {
            sender,
            queue,
            mirror_hook: None,
        }
    }

    /// Attach a mirrorctl outcome hook.
    pub fn with_mirror_hook(mut self, hook: MirrorHook) -> Self {
        self.mirror_hook = Some(hook);
        self
    }

    /// Try a live send; on failure, queue the payload for retry.
    ///
    /// Returns whether the live send succeeded. The queue is untouched
    /// on success. Reports (1,0) or (0,1) to the mirror hook.
    pub async fn send_or_queue(&self, target: &str, payload: Value) -> bool {
        let success = self.try_post(target, &payload).await;
        if !success {
            if let Err(e) = self.queue.enqueue(target, payload) {
                // The payload is lost if both the network and local
                // storage fail; log loudly, keep the caller's loop alive.
                tracing::error!(error = %e, target, "Failed to queue payload after send failure");
            }
        }
        let (ok, ng) = if success { (1, 0) } else { (0, 1) };
        self.report_mirror(ok, ng);
        success
    }

    /// Replay up to `limit` queued payloads in FIFO order.
    ///
    /// Stops at the first failure, restoring the failed item (with its
    /// retry counter bumped) and the unprocessed remainder to the head
    /// of the queue in their original order, so the oldest pending
    /// payload is still attempted first on the next pass. Returns
    /// whether at least one item was delivered.
    pub async fn drain(&self, limit: usize) -> bool {
        let batch = match self.queue.dequeue(limit) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(error = %e, "Drain skipped: queue unreadable");
                return false;
            }
        };

        let mut successes: u32 = 0;
        let mut failures: u32 = 0;

        let mut batch = batch.into_iter();
        while let Some(mut item) = batch.next() {
            // Stamp the attempt number into the outgoing payload so the
            // server-side audit trail sees how hard this scan fought.
            set_payload_retries(&mut item.payload, item.retries + 1);

            if self.try_post(&item.target, &item.payload).await {
                PersistentQueue::update_retry_status(&mut item, true);
                successes += 1;
                continue;
            }

            failures += 1;
            PersistentQueue::update_retry_status(&mut item, false);
            let mut unsent = vec![item];
            unsent.extend(batch.by_ref());
            if let Err(e) = self.queue.requeue_front(unsent) {
                tracing::error!(error = %e, "Failed to restore unsent batch; items are lost");
            }
        }

        if successes > 0 || failures > 0 {
            self.report_mirror(successes, failures);
        }
        successes > 0
    }

    /// Pending queue size for operator visibility; 0 when unreadable.
    pub fn queue_size(&self) -> usize {
        match self.queue.len() {
            Ok(len) => len,
            Err(e) => {
                tracing::warn!(error = %e, "Queue size unavailable");
                0
            }
        }
    }

    async fn try_post(&self, target: &str, payload: &Value) -> bool {
        match self.sender.post(target, payload).await {
            Ok(()) => {
                tracing::info!(target, scan_id = %payload_id(payload), "Server accepted payload");
                true
            }
            Err(e) => {
                tracing::warn!(
                    target,
                    scan_id = %payload_id(payload),
                    error = %e,
                    "Failed to post payload",
                );
                false
            }
        }
    }

    fn report_mirror(&self, successes: u32, failures: u32) {
        if successes == 0 && failures == 0 {
            return;
        }
        if let Some(hook) = &self.mirror_hook {
            hook(successes, failures);
        }
    }
}

/// Best-effort payload identifier for log lines.
fn payload_id(payload: &Value) -> &str {
    payload
        .get("metadata")
        .and_then(|m| m.get("scan_id"))
        .or_else(|| payload.get("scan_id"))
        .and_then(Value::as_str)
        .unwrap_or("-")
}

/// Write the current attempt number into `payload.metadata.retries`.
fn set_payload_retries(payload: &mut Value, retries: u32) {
    let Some(obj) = payload.as_object_mut() else {
        return;
    };
    let metadata = obj
        .entry("metadata")
        .or_insert_with(|| Value::Object(Default::default()));
    if let Some(metadata) = metadata.as_object_mut() {
        metadata.insert("retries".to_string(), Value::from(retries));
    }
}

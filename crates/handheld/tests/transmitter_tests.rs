//! Integration tests for the send-or-queue transmitter.
//!
//! Uses a scripted [`Sender`] so no network is involved; outcomes are
//! consumed in call order.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use floortrack_handheld::queue::PersistentQueue;
use floortrack_handheld::transmitter::{MirrorHook, SendError, Sender, Transmitter};

/// Sender whose outcomes are scripted up front. Records every call.
struct ScriptedSender {
    outcomes: Mutex<VecDeque<bool>>,
    calls: Arc<Mutex<Vec<Value>>>,
}

impl ScriptedSender {
    fn new(outcomes: &[bool]) -> (Self, Arc<Mutex<Vec<Value>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                outcomes: Mutex::new(outcomes.iter().copied().collect()),
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl Sender for ScriptedSender {
    async fn post(&self, _target: &str, payload: &Value) -> Result<(), SendError> {
        self.calls.lock().unwrap().push(payload.clone());
        let success = self.outcomes.lock().unwrap().pop_front().unwrap_or(false);
        if success {
            Ok(())
        } else {
            Err(SendError::HttpStatus(503))
        }
    }
}

/// Hook collecting (success, failure) reports.
fn recording_hook() -> (MirrorHook, Arc<Mutex<Vec<(u32, u32)>>>) {
    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    let hook: MirrorHook = Box::new(move |ok, ng| sink.lock().unwrap().push((ok, ng)));
    (hook, reports)
}

fn scan(n: u32) -> Value {
    json!({"order_code": format!("ORD-{n}"), "location_code": "L1", "metadata": {"scan_id": format!("scan-{n}")}})
}

const TARGET: &str = "http://server/api/v1/scans";

// ---------------------------------------------------------------------------
// Test: send_or_queue reports outcomes and queues on failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_or_queue_reports_success_and_failure() {
    let dir = TempDir::new().unwrap();
    let (sender, _) = ScriptedSender::new(&[true, false]);
    let (hook, reports) = recording_hook();
    let tx = Transmitter::new(sender, PersistentQueue::new(dir.path().join("q.json")))
        .with_mirror_hook(hook);

    assert!(tx.send_or_queue(TARGET, scan(1)).await);
    assert!(!tx.send_or_queue(TARGET, scan(2)).await);

    assert_eq!(*reports.lock().unwrap(), vec![(1, 0), (0, 1)]);
    // Only the failed payload was queued.
    assert_eq!(tx.queue_size(), 1);
}

// ---------------------------------------------------------------------------
// Test: drain reports aggregate outcome and keeps the failed item
// ---------------------------------------------------------------------------

#[tokio::test]
async fn drain_reports_aggregate_and_requeues_failure() {
    let dir = TempDir::new().unwrap();
    let queue = PersistentQueue::new(dir.path().join("q.json"));
    queue.enqueue(TARGET, scan(1)).unwrap();
    queue.enqueue(TARGET, scan(2)).unwrap();

    let (sender, _) = ScriptedSender::new(&[true, false]);
    let (hook, reports) = recording_hook();
    let tx = Transmitter::new(sender, queue).with_mirror_hook(hook);

    let delivered = tx.drain(20).await;
    assert!(delivered);

    // One aggregate report for the whole batch.
    assert_eq!(*reports.lock().unwrap(), vec![(1, 1)]);

    // Item 2 is back in the queue with its retry counter bumped.
    assert_eq!(tx.queue_size(), 1);
}

// ---------------------------------------------------------------------------
// Test: drain stops at the first failure, preserving order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn drain_stops_batch_at_first_failure() {
    let dir = TempDir::new().unwrap();
    let queue = PersistentQueue::new(dir.path().join("q.json"));
    for n in 1..=3 {
        queue.enqueue(TARGET, scan(n)).unwrap();
    }

    let (sender, calls) = ScriptedSender::new(&[true, false, true]);
    let tx = Transmitter::new(sender, queue);

    assert!(tx.drain(20).await);

    // Item 3 was never attempted: the batch stopped at item 2.
    let attempted = calls.lock().unwrap();
    assert_eq!(attempted.len(), 2);
    assert_eq!(attempted[0]["order_code"], "ORD-1");
    assert_eq!(attempted[1]["order_code"], "ORD-2");
    drop(attempted);

    // Queue: failed item 2 (retries = 1) first, untouched item 3 after it.
    let remaining = PersistentQueue::new(dir.path().join("q.json"))
        .dequeue(10)
        .unwrap();
    assert_eq!(remaining.len(), 2);
    assert_eq!(remaining[0].payload["order_code"], "ORD-2");
    assert_eq!(remaining[0].retries, 1);
    assert_eq!(remaining[1].payload["order_code"], "ORD-3");
    assert_eq!(remaining[1].retries, 0);
}

// ---------------------------------------------------------------------------
// Test: drain stamps the attempt number into the outgoing payload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn drain_sends_incremented_retry_count() {
    let dir = TempDir::new().unwrap();
    let queue = PersistentQueue::new(dir.path().join("q.json"));
    queue.enqueue(TARGET, scan(1)).unwrap();

    let (sender, calls) = ScriptedSender::new(&[true]);
    let tx = Transmitter::new(sender, queue);
    tx.drain(20).await;

    let attempted = calls.lock().unwrap();
    assert_eq!(attempted[0]["metadata"]["retries"], 1);
}

// ---------------------------------------------------------------------------
// Test: empty queue drains quietly
// ---------------------------------------------------------------------------

#[tokio::test]
async fn drain_on_empty_queue_reports_nothing() {
    let dir = TempDir::new().unwrap();
    let (sender, calls) = ScriptedSender::new(&[]);
    let (hook, reports) = recording_hook();
    let tx = Transmitter::new(sender, PersistentQueue::new(dir.path().join("q.json")))
        .with_mirror_hook(hook);

    assert!(!tx.drain(20).await);
    assert!(calls.lock().unwrap().is_empty());
    assert!(reports.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: queue length is conserved across a fully failed drain
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_drain_conserves_queue_length() {
    let dir = TempDir::new().unwrap();
    let queue = PersistentQueue::new(dir.path().join("q.json"));
    for n in 1..=4 {
        queue.enqueue(TARGET, scan(n)).unwrap();
    }

    let (sender, _) = ScriptedSender::new(&[false]);
    let tx = Transmitter::new(sender, queue);

    assert!(!tx.drain(2).await);
    // Both dequeued items went back; the two never dequeued stayed.
    assert_eq!(tx.queue_size(), 4);
}

// ---------------------------------------------------------------------------
// Test: a failed partial drain keeps the oldest item at the head
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_partial_drain_keeps_oldest_at_head() {
    let dir = TempDir::new().unwrap();
    let queue = PersistentQueue::new(dir.path().join("q.json"));
    for n in 1..=3 {
        queue.enqueue(TARGET, scan(n)).unwrap();
    }

    // The queue is longer than the batch: items 2 and 3 are never
    // dequeued and must not overtake the failed item 1.
    let (sender, _) = ScriptedSender::new(&[false]);
    let tx = Transmitter::new(sender, queue);
    assert!(!tx.drain(1).await);

    let remaining = PersistentQueue::new(dir.path().join("q.json"))
        .dequeue(10)
        .unwrap();
    let order: Vec<_> = remaining
        .iter()
        .map(|item| item.payload["order_code"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(order, ["ORD-1", "ORD-2", "ORD-3"]);
    assert_eq!(remaining[0].retries, 1);
    assert_eq!(remaining[1].retries, 0);
}

// ---------------------------------------------------------------------------
// Test: FIFO holds across repeated failing drains
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_failed_drains_do_not_reorder() {
    let dir = TempDir::new().unwrap();
    let queue = PersistentQueue::new(dir.path().join("q.json"));
    for n in 1..=3 {
        queue.enqueue(TARGET, scan(n)).unwrap();
    }

    let (sender, calls) = ScriptedSender::new(&[false, false]);
    let tx = Transmitter::new(sender, queue);
    assert!(!tx.drain(2).await);
    assert!(!tx.drain(2).await);

    // The oldest item is the first attempt of every pass.
    let attempted = calls.lock().unwrap();
    assert_eq!(attempted[0]["order_code"], "ORD-1");
    assert_eq!(attempted[1]["order_code"], "ORD-1");
    assert_eq!(attempted[1]["metadata"]["retries"], 2);
}

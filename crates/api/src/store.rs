//! Scan persistence backend, selected once at startup.
//!
//! With a configured database, accepted scans land in the
//! `scan_ingest_backlog` staging table. Without one, a bounded
//! in-memory ring buffer keeps the most recent payloads so the server
//! still runs end-to-end (development, CI, kiosk setups with no
//! Postgres). The backend is an explicit enum rather than a trait
//! object: there are exactly two implementations and the choice never
//! changes after startup.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use floortrack_core::error::CoreError;
use floortrack_core::scan::ScanPayload;
use floortrack_db::models::part_location::PartLocation;
use floortrack_db::repositories::PartLocationRepo;
use floortrack_db::DbPool;

use crate::error::AppResult;

/// Bounded buffer of recently ingested scans (in-memory mode).
#[derive(Debug)]
pub struct MemoryScans {
    items: VecDeque<ScanPayload>,
    capacity: usize,
}

impl MemoryScans {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, payload: ScanPayload) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(payload);
    }

    /// Most recent payloads, oldest first.
    fn recent(&self, limit: usize) -> Vec<ScanPayload> {
        self.items
            .iter()
            .rev()
            .take(limit)
            .rev()
            .cloned()
            .collect()
    }
}

/// Where accepted scans go.
#[derive(Clone)]
pub enum ScanStore {
    /// Bounded ring buffer; no durability, for running without Postgres.
    Memory(Arc<Mutex<MemoryScans>>),
    /// Append to `scan_ingest_backlog` for later draining.
    Database(DbPool),
}

impl ScanStore {
    pub fn memory(capacity: usize) -> Self {
        Self::Memory(Arc::new(Mutex::new(MemoryScans::new(capacity))))
    }

    /// Persist one accepted (already validated) scan.
    pub async fn append(&self, payload: &ScanPayload) -> AppResult<()> {
        match self {
            Self::Memory(scans) => {
                let mut scans = scans.lock().map_err(|_| {
                    CoreError::Storage("scan buffer mutex poisoned".to_string())
                })?;
                scans.push(payload.clone());
                Ok(())
            }
            Self::Database(pool) => {
                floortrack_db::repositories::BacklogRepo::append(pool, &payload.to_value())
                    .await?;
                Ok(())
            }
        }
    }

    /// Current part locations for the listing endpoint.
    ///
    /// Database mode reads the canonical table. Memory mode derives a
    /// last-scan-wins view from the ring buffer, newest first, so the
    /// endpoint stays useful without a database.
    pub async fn part_locations(&self, limit: i64) -> AppResult<Vec<PartLocation>> {
        match self {
            Self::Memory(scans) => {
                let scans = scans.lock().map_err(|_| {
                    CoreError::Storage("scan buffer mutex poisoned".to_string())
                })?;
                Ok(locations_from_scans(scans.recent(usize::MAX), limit))
            }
            Self::Database(pool) => Ok(PartLocationRepo::list(pool, limit).await?),
        }
    }
}

/// Collapse a scan history into one row per order, last scan wins.
fn locations_from_scans(scans: Vec<ScanPayload>, limit: i64) -> Vec<PartLocation> {
    let now = chrono::Utc::now();
    let mut seen = std::collections::HashSet::new();
    let mut rows = Vec::new();

    // Walk newest-to-oldest so the first occurrence of an order wins.
    for scan in scans.into_iter().rev() {
        if rows.len() as i64 >= limit.max(0) {
            break;
        }
        if seen.insert(scan.order_code.clone()) {
            rows.push(PartLocation {
                order_code: scan.order_code,
                location_code: scan.location_code,
                device_id: scan.device_id,
                updated_at: now,
            });
        }
    }
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

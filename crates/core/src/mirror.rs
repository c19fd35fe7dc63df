//! mirrorctl state machine: day-granularity delivery-health streaks.
//!
//! The transmitter reports (success_count, failure_count) after every
//! send or drain; [`MirrorState::apply_outcome`] folds those into two
//! independent calendar-day streak counters and a pending-failure
//! gauge. A day boundary is the UTC calendar date at the moment of
//! update, not a rolling 24h window.
//!
//! The streaks are observational: nothing here flips `enabled`
//! automatically. Only [`MirrorState::set_enabled`] (an operator
//! override) changes it.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Timestamp format used in the persisted state and audit log.
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Persisted mirrorctl state.
///
/// All fields default so a partially-written or older state file still
/// deserializes (missing fields fall back to their zero values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorState {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub last_success_at: Option<String>,
    #[serde(default)]
    pub last_failure_at: Option<String>,
    #[serde(default)]
    pub last_update_at: Option<String>,
    #[serde(default)]
    pub consecutive_success_days: u32,
    #[serde(default)]
    pub consecutive_failure_days: u32,
    #[serde(default)]
    pub pending_failures: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Default for MirrorState {
    fn default() -> Self {
        Self {
            enabled: true,
            last_success_at: None,
            last_failure_at: None,
            last_update_at: None,
            consecutive_success_days: 0,
            consecutive_failure_days: 0,
            pending_failures: 0,
            notes: None,
        }
    }
}

impl MirrorState {
    /// Fold a batch outcome into the state.
    ///
    /// Returns `true` if anything changed (i.e. either count was
    /// nonzero), in which case `last_update_at` has been stamped and the
    /// caller should persist. A streak counter is bumped at most once
    /// per UTC calendar day; the two streaks are never both bumped by
    /// the same call because a mixed outcome leaves both resets alone.
    pub fn apply_outcome(
        &mut self,
        success_count: u32,
        failure_count: u32,
        now: Timestamp,
    ) -> bool {
        let mut changed = false;

        if success_count > 0 {
            if !same_utc_day(self.last_success_at.as_deref(), now) {
                self.consecutive_success_days += 1;
            }
            self.last_success_at = Some(to_iso(now));
            self.pending_failures = self.pending_failures.saturating_sub(success_count);
            if failure_count == 0 {
                self.consecutive_failure_days = 0;
            }
            changed = true;
        }

        if failure_count > 0 {
            if !same_utc_day(self.last_failure_at.as_deref(), now) {
                self.consecutive_failure_days += 1;
            }
            self.last_failure_at = Some(to_iso(now));
            if success_count == 0 {
                self.consecutive_success_days = 0;
            }
            self.pending_failures += failure_count;
            changed = true;
        }

        if changed {
            self.last_update_at = Some(to_iso(now));
        }
        changed
    }

    /// Operator/administrative override of the enabled flag.
    pub fn set_enabled(&mut self, enabled: bool, reason: Option<&str>, now: Timestamp) {
        self.enabled = enabled;
        if let Some(reason) = reason {
            self.notes = Some(reason.to_string());
        }
        self.last_update_at = Some(to_iso(now));
    }
}

/// Format a timestamp in the persisted `ISO_FORMAT`.
pub fn to_iso(ts: Timestamp) -> String {
    ts.format(ISO_FORMAT).to_string()
}

/// Parse a persisted timestamp.
///
/// Accepts the compact `...Z` form written by [`to_iso`] as well as any
/// RFC 3339 string (older state files). Unparseable values are treated
/// as absent.
pub fn parse_iso(value: &str) -> Option<Timestamp> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, ISO_FORMAT) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Whether a persisted timestamp falls on the same UTC calendar date as `now`.
fn same_utc_day(existing: Option<&str>, now: Timestamp) -> bool {
    existing
        .and_then(parse_iso)
        .map(|ts| ts.date_naive() == now.date_naive())
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! mirrorctl persistence: state file and audit log.
//!
//! Wraps the pure transition in [`floortrack_core::mirror`] with the
//! on-disk lifecycle: state is re-read from disk on every access (no
//! in-memory caching across calls, so concurrent readers and process
//! restarts stay coherent) and persisted synchronously after every
//! mutation. The audit log is append-only, one line per entry:
//! `<ISO8601-UTC> <message>`.

use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use floortrack_core::mirror::{to_iso, MirrorState};

use crate::transmitter::MirrorHook;

/// Handle to the persisted mirrorctl state and audit log.
#[derive(Clone)]
pub struct MirrorCtl {
    state_path: PathBuf,
    audit_path: PathBuf,
}

impl MirrorCtl {
    pub fn new(state_path: impl Into<PathBuf>, audit_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            audit_path: audit_path.into(),
        }
    }

    /// Current state, reloaded from disk.
    ///
    /// A missing file is a fresh default state. An unreadable or
    /// corrupt file also falls back to defaults (with a warning) so a
    /// damaged state file never takes the control loop down.
    pub fn state(&self) -> MirrorState {
        if !self.state_path.exists() {
            return MirrorState::default();
        }
        match fs::read_to_string(&self.state_path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, path = %self.state_path.display(),
                    "mirrorctl state file corrupt, starting fresh");
                MirrorState::default()
            }),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.state_path.display(),
                    "mirrorctl state file unreadable, starting fresh");
                MirrorState::default()
            }
        }
    }

    /// Fold a delivery outcome into the persisted state.
    ///
    /// Read-modify-persist; the write only happens when the outcome
    /// changed something. Persistence failures log and are otherwise
    /// swallowed -- the health tracker must never crash the send loop.
    pub fn update_status(&self, success_count: u32, failure_count: u32) -> MirrorState {
        let mut state = self.state();
        if state.apply_outcome(success_count, failure_count, chrono::Utc::now()) {
            self.persist(&state);
        }
        state
    }

    /// Operator override of the enabled flag; independent of streaks.
    pub fn set_enabled(&self, enabled: bool, reason: Option<&str>) -> MirrorState {
        let mut state = self.state();
        state.set_enabled(enabled, reason, chrono::Utc::now());
        self.persist(&state);
        state
    }

    /// Append a timestamped line to the audit log. Best-effort: any
    /// failure logs a warning and nothing more.
    pub fn append_audit_entry(&self, message: &str) {
        let line = format!("{} {}\n", to_iso(chrono::Utc::now()), message);
        if let Err(e) = self.try_append(&line) {
            tracing::warn!(error = %e, path = %self.audit_path.display(),
                "Failed to append mirrorctl audit entry");
        }
    }

    /// Build a hook for [`Transmitter`](crate::transmitter::Transmitter).
    pub fn hook(&self) -> MirrorHook {
        let ctl = self.clone();
        Box::new(move |successes, failures| {
            ctl.update_status(successes, failures);
        })
    }

    fn persist(&self, state: &MirrorState) {
        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = self.state_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let raw = serde_json::to_string_pretty(state)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            fs::write(&self.state_path, raw)
        })();

        if let Err(e) = result {
            tracing::warn!(error = %e, path = %self.state_path.display(),
                "Failed to persist mirrorctl state");
        }
    }

    fn try_append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.audit_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.audit_path)?;
        file.write_all(line.as_bytes())
    }
}

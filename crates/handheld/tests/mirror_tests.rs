//! Integration tests for mirrorctl persistence.
//!
//! Day-rollover arithmetic is covered by the pure state machine's unit
//! tests in `floortrack-core`; these tests cover the on-disk lifecycle.

use std::fs;

use tempfile::TempDir;

use floortrack_handheld::mirror::MirrorCtl;

fn ctl_in(dir: &TempDir) -> MirrorCtl {
    MirrorCtl::new(
        dir.path().join("mirrorctl_state.json"),
        dir.path().join("mirrorctl_audit.log"),
    )
}

// ---------------------------------------------------------------------------
// Test: fresh state before any file exists
// ---------------------------------------------------------------------------

#[test]
fn missing_state_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let state = ctl_in(&dir).state();

    assert!(state.enabled);
    assert_eq!(state.consecutive_success_days, 0);
    assert!(state.last_update_at.is_none());
}

// ---------------------------------------------------------------------------
// Test: update persists synchronously and reloads across handles
// ---------------------------------------------------------------------------

#[test]
fn update_status_persists_to_disk() {
    let dir = TempDir::new().unwrap();
    let state = ctl_in(&dir).update_status(2, 0);

    assert_eq!(state.consecutive_success_days, 1);
    assert!(state.last_success_at.is_some());

    // A separate handle sees the persisted state.
    let reloaded = ctl_in(&dir).state();
    assert_eq!(reloaded, state);
}

// ---------------------------------------------------------------------------
// Test: same-day updates bump the streak only once
// ---------------------------------------------------------------------------

#[test]
fn same_day_updates_bump_streak_once() {
    let dir = TempDir::new().unwrap();
    let ctl = ctl_in(&dir);

    ctl.update_status(2, 0);
    let state = ctl.update_status(3, 0);

    // Both calls land on the same UTC date.
    assert_eq!(state.consecutive_success_days, 1);
}

// ---------------------------------------------------------------------------
// Test: zero outcome writes nothing
// ---------------------------------------------------------------------------

#[test]
fn zero_outcome_does_not_create_state_file() {
    let dir = TempDir::new().unwrap();
    let ctl = ctl_in(&dir);

    ctl.update_status(0, 0);
    assert!(!dir.path().join("mirrorctl_state.json").exists());
}

// ---------------------------------------------------------------------------
// Test: operator override persists flag and reason
// ---------------------------------------------------------------------------

#[test]
fn set_enabled_persists_flag_and_reason() {
    let dir = TempDir::new().unwrap();
    let ctl = ctl_in(&dir);

    ctl.set_enabled(false, Some("link flapping"));

    let state = ctl_in(&dir).state();
    assert!(!state.enabled);
    assert_eq!(state.notes.as_deref(), Some("link flapping"));
}

// ---------------------------------------------------------------------------
// Test: corrupt state file falls back to defaults instead of crashing
// ---------------------------------------------------------------------------

#[test]
fn corrupt_state_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("mirrorctl_state.json"), "{not json").unwrap();

    let state = ctl_in(&dir).state();
    assert!(state.enabled);
    assert_eq!(state.pending_failures, 0);
}

// ---------------------------------------------------------------------------
// Test: audit log appends one timestamped line per entry
// ---------------------------------------------------------------------------

#[test]
fn audit_entries_append_timestamped_lines() {
    let dir = TempDir::new().unwrap();
    let ctl = ctl_in(&dir);

    ctl.append_audit_entry("mirror disabled (reason: maintenance)");
    ctl.append_audit_entry("mirror enabled (reason: none)");

    let raw = fs::read_to_string(dir.path().join("mirrorctl_audit.log")).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("mirror disabled (reason: maintenance)"));
    // Each line starts with an ISO-8601 UTC timestamp.
    assert!(lines[0].split(' ').next().unwrap().ends_with('Z'));
}

// ---------------------------------------------------------------------------
// Test: the transmitter hook feeds update_status
// ---------------------------------------------------------------------------

#[test]
fn hook_updates_persisted_state() {
    let dir = TempDir::new().unwrap();
    let ctl = ctl_in(&dir);

    let hook = ctl.hook();
    hook(1, 1);

    let state = ctl.state();
    assert_eq!(state.consecutive_success_days, 1);
    assert_eq!(state.consecutive_failure_days, 1);
    assert_eq!(state.pending_failures, 1);
}

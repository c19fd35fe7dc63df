//! `floortrack-handheld` -- scan transmission CLI for handheld devices.
//!
//! Drives the send-or-queue pipeline without the scanner/display
//! hardware stack, for headless devices, cron-driven drains, and CI.
//!
//! # Usage
//!
//! ```text
//! floortrack-handheld send --order <CODE> --location <CODE> [--device <ID>]
//! floortrack-handheld drain [--limit <N>]
//! floortrack-handheld status
//! floortrack-handheld enable  [--reason <TEXT>]
//! floortrack-handheld disable [--reason <TEXT>]
//! ```
//!
//! Configuration comes from the JSON device config (see
//! [`config::HandheldConfig`]); `FLOORTRACK_CONFIG` overrides the
//! search path.

use std::process::ExitCode;
use std::time::Duration;

use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use floortrack_handheld::config::HandheldConfig;
use floortrack_handheld::mirror::MirrorCtl;
use floortrack_handheld::queue::PersistentQueue;
use floortrack_handheld::transmitter::{HttpSender, Transmitter, DEFAULT_DRAIN_LIMIT};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "floortrack_handheld=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        eprintln!("usage: floortrack-handheld <send|drain|status|enable|disable> [options]");
        return ExitCode::FAILURE;
    };

    let config = match HandheldConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start without device configuration");
            return ExitCode::FAILURE;
        }
    };

    let mirror = MirrorCtl::new(&config.mirror_state_path, &config.mirror_audit_path);
    let queue = PersistentQueue::new(&config.queue_path);
    let sender = HttpSender::new(
        config.api_token.clone(),
        Duration::from_secs(config.timeout_seconds),
    );
    let transmitter = Transmitter::new(sender, queue).with_mirror_hook(mirror.hook());

    match command {
        "send" => {
            let (Some(order), Some(location)) =
                (flag_value(&args, "--order"), flag_value(&args, "--location"))
            else {
                eprintln!("usage: floortrack-handheld send --order <CODE> --location <CODE> [--device <ID>]");
                return ExitCode::FAILURE;
            };
            let device = flag_value(&args, "--device").unwrap_or_else(|| config.device_id.clone());

            let payload = json!({
                "order_code": order,
                "location_code": location,
                "device_id": device,
                "metadata": {
                    "scan_id": uuid::Uuid::new_v4().to_string(),
                    "captured_at": floortrack_core::mirror::to_iso(chrono::Utc::now()),
                },
            });

            let delivered = transmitter.send_or_queue(&config.api_url, payload).await;
            if delivered {
                tracing::info!(order_code = %order, "Scan delivered");
            } else {
                tracing::warn!(
                    order_code = %order,
                    queued = transmitter.queue_size(),
                    "Scan queued for retry",
                );
            }
            ExitCode::SUCCESS
        }

        "drain" => {
            let limit = flag_value(&args, "--limit")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DRAIN_LIMIT);
            let delivered = transmitter.drain(limit).await;
            tracing::info!(
                delivered,
                remaining = transmitter.queue_size(),
                "Drain pass complete",
            );
            ExitCode::SUCCESS
        }

        "status" => {
            let status = json!({
                "queue_size": transmitter.queue_size(),
                "mirror": mirror.state(),
            });
            match serde_json::to_string_pretty(&status) {
                Ok(rendered) => {
                    println!("{rendered}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to render status");
                    ExitCode::FAILURE
                }
            }
        }

        "enable" | "disable" => {
            let enabled = command == "enable";
            let reason = flag_value(&args, "--reason");
            mirror.set_enabled(enabled, reason.as_deref());
            mirror.append_audit_entry(&format!(
                "mirror {} (reason: {})",
                if enabled { "enabled" } else { "disabled" },
                reason.as_deref().unwrap_or("none"),
            ));
            tracing::info!(enabled, "mirrorctl flag updated");
            ExitCode::SUCCESS
        }

        other => {
            eprintln!("unknown command: {other}");
            ExitCode::FAILURE
        }
    }
}

/// Value of `--flag <value>` in the argument list, if present.
fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

//! High-memory desktop notification

use crate::config::AlertsConfig;
use crate::ranker::RankedEntry;
use notify_rust::Notification;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

pub const SUMMARY: &str = "\u{26a0} High Memory Usage";

/// One line per entry at or above `threshold_mb`, e.g.
/// `chrome (PID 311) – 7412 MB`.
pub fn high_memory_offenders(entries: &[RankedEntry], threshold_mb: f64) -> Vec<String> {
    entries
        .iter()
        .map(|e| &e.sample)
        .filter(|s| s.memory_mb >= threshold_mb)
        .map(|s| format!("{} (PID {}) \u{2013} {} MB", s.identity, s.representative_pid, s.memory_mb as u64))
        .collect()
}

pub fn format_body(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| format!("\u{2022} {}", line))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn send_notification(summary: &str, body: &str) -> Result<(), notify_rust::error::Error> {
    let mut notification = Notification::new();
    notification
        .summary(summary)
        .body(body)
        .icon("utilities-system-monitor")
        .appname("memscape");
    #[cfg(all(unix, not(target_os = "macos")))]
    notification.urgency(notify_rust::Urgency::Critical);
    notification.show()?;
    Ok(())
}

/// True when no alert was recorded within the last `cooldown_secs`. A
/// missing or unreadable stamp counts as elapsed.
pub fn cooldown_elapsed(stamp: &Path, cooldown_secs: u64, now_secs: f64) -> bool {
    if cooldown_secs == 0 {
        return true;
    }
    let last = match fs::read_to_string(stamp) {
        Ok(content) => content.trim().parse::<f64>().ok(),
        Err(_) => None,
    };
    match last {
        Some(last) => now_secs - last >= cooldown_secs as f64,
        None => true,
    }
}

/// Writes `now_secs` (unix seconds) to the stamp file.
pub fn record_alert(stamp: &Path, now_secs: f64) -> io::Result<()> {
    if let Some(parent) = stamp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(stamp, now_secs.to_string())
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Notifies when any entry crosses the threshold and the cooldown has
/// passed; a no-op otherwise.
pub fn check_high_memory(entries: &[RankedEntry], alerts: &AlertsConfig) {
    let offenders = high_memory_offenders(entries, alerts.memory_threshold_mb);
    if offenders.is_empty() {
        return;
    }
    let now = unix_now();
    if !cooldown_elapsed(&alerts.stamp_file, alerts.cooldown_secs, now) {
        debug!("Alert suppressed, last one was under {}s ago", alerts.cooldown_secs);
        return;
    }
    info!("{} process(es) above {} MB", offenders.len(), alerts.memory_threshold_mb);
    if let Err(e) = send_notification(SUMMARY, &format_body(&offenders)) {
        warn!("Failed to send notification: {}", e);
        return;
    }
    if let Err(e) = record_alert(&alerts.stamp_file, now) {
        warn!("Failed to record alert time in {:?}: {}", alerts.stamp_file, e);
    }
}

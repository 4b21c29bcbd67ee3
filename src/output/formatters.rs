//! Reusable formatting utilities for CLI output

use chrono::{DateTime, Local};

/// Format bytes as human-readable size
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format a Unix timestamp in milliseconds as local date/time.
///
/// Returns "unknown" for timestamps chrono cannot represent.
pub fn format_stored_at(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Shorten a URL to its path when it belongs to `origin`
pub fn display_url(url: &str, origin: &str) -> String {
    let origin = origin.trim_end_matches('/');
    match url.strip_prefix(origin) {
        Some(path) if path.starts_with('/') => path.to_string(),
        _ => url.to_string(),
    }
}

//! Data handed to the view renderer

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::state::ConnectivityState;
use crate::client::{IpReport, Summary};

/// Placeholder for values the backend did not provide
pub const MISSING: &str = "—";

const REMOTE_NETWORK_NOTE: &str =
    "Note: Showing client's IP. Server LAN IPs are not shown when accessed remotely.";

/// Receives plain data from the poller and puts it on screen.
pub trait ViewRenderer: Send + Sync {
    /// Show the online/offline indicator
    fn indicator(&self, state: ConnectivityState);

    /// Show the status panel after a successful poll
    fn summary(&self, view: &SummaryView);

    /// Show network addresses
    fn network(&self, view: &NetworkView);
}

/// Status panel content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub title: &'static str,
    pub section: Section,
    /// `os/arch • goVersion`
    pub subtitle: String,
    /// The full payload, for renderers that want more than the panel
    pub payload: Summary,
}

/// Which panel is visible
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Section {
    /// Same-network access: server internals
    Server(ServerPanel),
    /// Remote access: client-facing info only
    Client(ClientPanel),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerPanel {
    pub hostname: String,
    pub uptime: String,
    pub time: String,
    pub utc_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientPanel {
    pub ip: String,
    pub hostname: String,
}

impl SummaryView {
    pub fn from_summary(summary: Summary) -> Self {
        let server = &summary.server;
        let subtitle = format!("{}/{} • {}", server.os, server.arch, server.go_version);

        let (title, section) = if summary.is_local() {
            (
                "Status",
                Section::Server(ServerPanel {
                    hostname: server.hostname.clone(),
                    uptime: format_uptime(server.uptime_sec),
                    time: server.time.clone().unwrap_or_else(|| MISSING.to_string()),
                    utc_time: to_utc(server.time.as_deref()),
                }),
            )
        } else {
            let client = summary.client.clone().unwrap_or_default();
            (
                "Client Status",
                Section::Client(ClientPanel {
                    ip: non_empty(client.ip),
                    hostname: non_empty(client.hostname),
                }),
            )
        };

        Self {
            title,
            section,
            subtitle,
            payload: summary,
        }
    }
}

/// Network addresses panel content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkView {
    /// "LAN IPs" for local access, "Client IP" for remote
    pub label: &'static str,
    pub note: Option<&'static str>,
    pub lan_ips: String,
    pub lan_ptr: String,
    pub public_ip: String,
    pub public_ptr: String,
    pub public_error: String,
}

impl NetworkView {
    pub fn from_report(is_local: bool, report: &IpReport) -> Self {
        let (label, note) = if is_local {
            ("LAN IPs", None)
        } else {
            ("Client IP", Some(REMOTE_NETWORK_NOTE))
        };

        let host_ips = report
            .network
            .as_ref()
            .map(|n| n.host_ips.as_slice())
            .unwrap_or_default();

        let (lan_ips, lan_ptr) = if host_ips.is_empty() {
            (MISSING.to_string(), String::new())
        } else {
            let ips: Vec<&str> = host_ips.iter().map(|h| h.ip.as_str()).collect();
            let ptrs: Vec<&str> = host_ips
                .iter()
                .filter_map(|h| h.ptr.as_deref())
                .filter(|p| !p.is_empty())
                .collect();
            (ips.join(", "), ptrs.join(", "))
        };

        let public = report.public.clone().unwrap_or_default();
        let (public_ip, public_ptr, public_error) = match public.ip.filter(|ip| !ip.is_empty()) {
            Some(ip) => (ip, public.ptr.unwrap_or_default(), String::new()),
            None => (
                MISSING.to_string(),
                String::new(),
                public.error.unwrap_or_default(),
            ),
        };

        Self {
            label,
            note,
            lan_ips,
            lan_ptr,
            public_ip,
            public_ptr,
            public_error,
        }
    }
}

fn non_empty(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| MISSING.to_string())
}

/// Human uptime: `3d 4h 5m`, `4h 5m` or `5m 6s`
pub fn format_uptime(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, secs)
    }
}

/// Convert the server's timestamp to UTC, `—` if absent or unparsable
pub fn to_utc(time: Option<&str>) -> String {
    time.and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| {
            t.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        })
        .unwrap_or_else(|| MISSING.to_string())
}

#[cfg(test)]
pub use recording::RecordingRenderer;

//! Colored terminal rendering of status views

use colored::{ColoredString, Colorize};

use crate::status::view::MISSING;
use crate::status::{ConnectivityState, Indicator, NetworkView, Section, SummaryView, ViewRenderer};

/// Prints status views to stdout
#[derive(Debug, Default)]
pub struct TerminalRenderer;

/// Parse `#rrggbb`
fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn paint(indicator: &Indicator, text: &str) -> ColoredString {
    match indicator.background.and_then(hex_rgb) {
        Some((r, g, b)) => text.truecolor(r, g, b).bold(),
        None => text.green(),
    }
}

fn field(label: &str, value: &str) -> String {
    let value = if value.is_empty() { MISSING } else { value };
    format!("  {} {}", format!("{:<10}", format!("{}:", label)).dimmed(), value)
}

impl TerminalRenderer {
    pub fn indicator_line(state: ConnectivityState) -> String {
        let indicator = state.indicator();
        format!("{} {}", paint(&indicator, "●"), paint(&indicator, indicator.text))
    }

    pub fn summary_text(view: &SummaryView) -> String {
        let mut lines = vec![
            view.title.bold().to_string(),
            view.subtitle.dimmed().to_string(),
        ];

        match &view.section {
            Section::Server(panel) => {
                lines.push(field("Hostname", &panel.hostname));
                lines.push(field("Uptime", &panel.uptime));
                lines.push(field("Time", &panel.time));
                lines.push(field("UTC", &panel.utc_time));
            }
            Section::Client(panel) => {
                lines.push(field("IP", &panel.ip));
                lines.push(field("Hostname", &panel.hostname));
            }
        }
        lines.join("\n")
    }

    pub fn network_text(view: &NetworkView) -> String {
        let mut lines = vec!["Network".bold().to_string()];

        lines.push(field(view.label, &view.lan_ips));
        if !view.lan_ptr.is_empty() {
            lines.push(format!("  {:<10} {}", "", view.lan_ptr.dimmed()));
        }

        lines.push(field("Public IP", &view.public_ip));
        if !view.public_ptr.is_empty() {
            lines.push(format!("  {:<10} {}", "", view.public_ptr.dimmed()));
        }
        if !view.public_error.is_empty() {
            lines.push(format!("  {:<10} {}", "", view.public_error.red()));
        }

        if let Some(note) = view.note {
            lines.push(note.dimmed().italic().to_string());
        }
        lines.join("\n")
    }
}

impl ViewRenderer for TerminalRenderer {
    fn indicator(&self, state: ConnectivityState) {
        println!("{}", Self::indicator_line(state));
    }

    fn summary(&self, view: &SummaryView) {
        println!("{}\n", Self::summary_text(view));
    }

    fn network(&self, view: &NetworkView) {
        println!("{}\n", Self::network_text(view));
    }
}

//! JSON output: wrapped one-shot results and line-delimited status events

use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

use crate::status::{ConnectivityState, NetworkView, SummaryView, ViewRenderer};

/// Wrapper for one-shot JSON output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub data: T,
    pub meta: Metadata,
}

#[derive(Debug, Serialize)]
pub struct Metadata {
    pub timestamp: String,
    pub version: String,
}

impl<T> JsonOutput<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(data))
}

/// Renderer that prints one JSON object per line for every view update
#[derive(Debug, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    fn event(kind: &str, body: Value) -> String {
        json!({
            "event": kind,
            "timestamp": Utc::now().to_rfc3339(),
            "data": body,
        })
        .to_string()
    }

    pub fn indicator_event(state: ConnectivityState) -> String {
        Self::event(
            "indicator",
            json!({ "state": state, "indicator": state.indicator() }),
        )
    }

    pub fn summary_event(view: &SummaryView) -> String {
        Self::event("summary", json!(view))
    }

    pub fn network_event(view: &NetworkView) -> String {
        Self::event("network", json!(view))
    }
}

impl ViewRenderer for JsonRenderer {
    fn indicator(&self, state: ConnectivityState) {
        println!("{}", Self::indicator_event(state));
    }

    fn summary(&self, view: &SummaryView) {
        println!("{}", Self::summary_event(view));
    }

    fn network(&self, view: &NetworkView) {
        println!("{}", Self::network_event(view));
    }
}

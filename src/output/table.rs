//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::formatters::{display_url, format_size, format_stored_at};
use crate::cache::{EntryInfo, StoreSummary};

/// Format rows as a rounded table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// One cached response
#[derive(Debug, Tabled)]
pub struct EntryRow {
    #[tabled(rename = "URL")]
    pub url: String,
    #[tabled(rename = "STATUS")]
    pub status: u16,
    #[tabled(rename = "KIND")]
    pub kind: String,
    #[tabled(rename = "SIZE")]
    pub size: String,
    #[tabled(rename = "STORED")]
    pub stored: String,
}

impl EntryRow {
    pub fn new(entry: &EntryInfo, origin: &str) -> Self {
        Self {
            url: display_url(&entry.url, origin),
            status: entry.status,
            kind: entry.kind.clone(),
            size: format_size(entry.size_bytes),
            stored: format_stored_at(entry.stored_at),
        }
    }
}

/// One cache store
#[derive(Debug, Tabled)]
pub struct StoreRow {
    #[tabled(rename = "STORE")]
    pub name: String,
    #[tabled(rename = "ENTRIES")]
    pub entries: usize,
    #[tabled(rename = "SIZE")]
    pub size: String,
    #[tabled(rename = "CURRENT")]
    pub current: String,
}

impl StoreRow {
    pub fn new(store: &StoreSummary, current: &str) -> Self {
        Self {
            name: store.name.clone(),
            entries: store.entries,
            size: format_size(store.size_bytes),
            current: if store.name == current { "yes" } else { "" }.to_string(),
        }
    }
}

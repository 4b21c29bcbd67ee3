//! Output formatting for CLI results and live status views

pub mod formatters;
pub mod json;
pub mod table;
pub mod terminal;

pub use json::{JsonRenderer, format_json};
pub use table::format_table;
pub use terminal::TerminalRenderer;

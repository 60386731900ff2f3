//! Rendering of a finished [`UnifiedReport`](crate::UnifiedReport)
//!
//! - **JSON**: the six report fields, exactly as the dashboard consumes them
//! - **Console**: a short summary with optional ANSI colors

mod console;
mod json;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::Display;

pub use console::generate as generate_console;
pub use json::generate as generate_json;

/// Output format of the `fetch` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Console,
}

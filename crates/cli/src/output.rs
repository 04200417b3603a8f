//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Parse a format name from the config file, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print table rows, or a warning when there are none
pub fn print_rows<T: Tabled>(rows: Vec<T>, empty_message: &str) {
    if rows.is_empty() {
        print_warning(empty_message);
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a percentage already on the 0-100 scale
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Format an optional price
pub fn format_price(price: Option<f64>) -> String {
    price.map(|p| format!("${:.2}", p)).unwrap_or_else(|| "-".to_string())
}

/// Truncate ID for display
pub fn truncate_id(id: &str) -> String {
    if id.chars().count() > 8 {
        format!("{}...", id.chars().take(8).collect::<String>())
    } else {
        id.to_string()
    }
}

/// Shorten text to `max` characters for a table cell
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Format timestamp for display
pub fn format_timestamp(ts: &str) -> String {
    // Try to parse and format nicely, otherwise return as-is
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(ts) {
        dt.format("%Y-%m-%d %H:%M").to_string()
    } else {
        ts.to_string()
    }
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "created" => status.blue().to_string(),
        "active" | "healthy" | "success" => status.green().to_string(),
        "inactive" | "maintenance" | "degraded" => status.yellow().to_string(),
        "error" | "unhealthy" | "deleted" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Color sentiment label
pub fn color_sentiment(sentiment: &str) -> String {
    match sentiment {
        "positive" => sentiment.green().to_string(),
        "negative" => sentiment.red().to_string(),
        _ => sentiment.yellow().to_string(),
    }
}

/// Color a success rate or confidence on the 0-100 scale
pub fn color_percent(value: f64) -> String {
    let formatted = format_percent(value);
    if value >= 80.0 {
        formatted.green().to_string()
    } else if value >= 60.0 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}

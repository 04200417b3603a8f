//! Subcommand implementations, one module per dashboard area

pub mod agents;
pub mod health;
pub mod metrics;
pub mod recommendations;
pub mod sentiment;

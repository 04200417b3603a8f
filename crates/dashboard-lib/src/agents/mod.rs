//! Agent management
//!
//! Agents are records describing sentiment, recommendation, performance or
//! custom workers. Task execution happens elsewhere; this module owns
//! their lifecycle and derives statistics from their task counters.

mod registry;
mod stats;

pub use registry::{
    Agent, AgentQuery, AgentRegistry, AgentStatus, AgentSummary, AgentType, AgentUpdate,
    NewAgent,
};
pub use stats::AgentStatsCalculator;

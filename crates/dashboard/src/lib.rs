//! FMAA dashboard HTTP service
//!
//! Exposes the performance monitor, agent factory, sentiment agent and
//! recommendation agent over a JSON API, along with health probes and
//! Prometheus metrics.

pub mod api;
pub mod config;
pub mod error;

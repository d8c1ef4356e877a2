//! glidepath-planner: operator tooling around the glidepath engine.
//!
//! Keeps fund configurations as JSON files, reads price history from CSV
//! files, computes contribution plans and performance reports, and records
//! every change and plan in a JSONL audit trail.

pub mod audit;
pub mod commands;
pub mod config;
pub mod error;
pub mod market;
pub mod report;
pub mod store;

//! TradeLog Core: execution types, fee model, round-trip reconstruction, aggregation.
//!
//! This crate is the calculation heart of the report tool:
//! - Domain types (executions, fees, round trips)
//! - Fee model splitting commissions from signed ECN fees
//! - Per-symbol position tracker that emits a trade each time a position goes flat
//! - Round-trip book with the day/symbol/timestamp index views
//! - Aggregation into totals, per-day and per-symbol rollups and trade statistics
//!
//! Everything here is synchronous and deterministic; no I/O.

pub mod domain;
pub mod engine;
pub mod error;
pub mod fees;
pub mod metrics;

pub use error::AnalyticsError;

//! Domain types for TradeLog

pub mod execution;
pub mod trade;

pub use execution::{Execution, FeeBreakdown, Side};
pub use trade::{ClosedAt, RoundTrip, TradeOutcome};

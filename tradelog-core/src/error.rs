//! Errors raised by the aggregation layer.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Data-integrity failures. Any of these means the metric that raised it
/// cannot be trusted; callers abort instead of reporting a partial number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    #[error("total Buy ({buy}) does not match the sum of Sell ({sell}) and Short ({short})")]
    ShareImbalance { buy: u128, sell: u128, short: u128 },

    #[error(
        "on {day}, total Buy ({buy}) does not match the sum of Sell ({sell}) and Short ({short}) for symbol {symbol}"
    )]
    DailyShareImbalance {
        day: NaiveDate,
        symbol: String,
        buy: u128,
        sell: u128,
        short: u128,
    },

    #[error("net PnL from executions ({raw}) disagrees with summed round trips ({round_trips})")]
    NetPnlMismatch { raw: Decimal, round_trips: Decimal },
}

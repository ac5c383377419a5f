//! RoundTrip: a position opened from flat and carried back to flat.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A completed round-trip trade with its fees attributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTrip {
    pub symbol: String,

    /// Timestamp of the execution that moved the position off flat.
    pub opened_at: NaiveDateTime,
    /// Timestamp of the execution that returned the position to flat.
    pub closed_at: NaiveDateTime,
    pub execution_count: usize,

    // ── PnL ──
    /// Cash flow from prices alone.
    pub gross_pnl: Decimal,
    /// Sum of the commission components over every execution in the trade.
    pub commissions: Decimal,
    /// Signed ECN total; negative when rebates exceeded fees.
    pub ecn_fees: Decimal,
    /// `gross_pnl - commissions - ecn_fees`.
    pub net_pnl: Decimal,
}

impl RoundTrip {
    /// Day the trade closed on. Day-keyed views group by this date.
    pub fn trade_date(&self) -> NaiveDate {
        self.closed_at.date()
    }

    /// Strictly positive net PnL. Breakeven counts as a loss.
    pub fn is_winner(&self) -> bool {
        self.net_pnl > Decimal::ZERO
    }

    pub fn outcome(&self) -> TradeOutcome {
        TradeOutcome {
            symbol: self.symbol.clone(),
            pnl: self.net_pnl,
        }
    }
}

/// One closed trade inside a day bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub symbol: String,
    pub pnl: Decimal,
}

/// Value of the time-keyed view: which symbol closed at that instant, and for how much.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedAt {
    pub symbol: String,
    pub pnl: Decimal,
}

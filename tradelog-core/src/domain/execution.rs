//! Execution: one fill from the broker's execution report.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution side as reported in the `B/S` column.
///
/// `Sell` and `Short` move the position the same way; they are kept apart
/// only so share balancing can report them separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
    Short,
}

impl Side {
    /// Cash-flow sign: buys spend cash, sells and shorts receive it.
    pub fn sign(self) -> i64 {
        match self {
            Side::Buy => -1,
            Side::Sell | Side::Short => 1,
        }
    }

    /// Parse the single-letter broker code (`B`, `S`, `T`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "B" | "b" => Some(Side::Buy),
            "S" | "s" => Some(Side::Sell),
            "T" | "t" => Some(Side::Short),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Side::Buy => "B",
            Side::Sell => "S",
            Side::Short => "T",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
            Side::Short => "Short",
        };
        f.write_str(name)
    }
}

/// Per-execution fee fields.
///
/// The five commission components are always costs. `ecn` is signed:
/// positive is a routing fee paid, negative is a liquidity rebate earned.
/// Fields absent from the feed are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// Base broker commission (`Comm`).
    pub commission: Decimal,
    /// SEC transaction fee.
    pub sec: Decimal,
    /// FINRA trading activity fee.
    pub taf: Decimal,
    /// NSCC clearing fee.
    pub nscc: Decimal,
    /// Consolidated audit trail fee.
    pub cat: Decimal,
    /// ECN fee (+) or rebate (-).
    pub ecn: Decimal,
}

impl FeeBreakdown {
    pub fn commission_total(&self) -> Decimal {
        self.commission + self.sec + self.taf + self.nscc + self.cat
    }
}

/// A single cleaned execution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub symbol: String,
    pub side: Side,
    /// Shares filled; always positive.
    pub quantity: u64,
    pub price: Decimal,
    pub fees: FeeBreakdown,
    pub executed_at: NaiveDateTime,
}

impl Execution {
    /// Largest quantity accepted from a feed. Fits a signed 64-bit share delta.
    pub const MAX_QUANTITY: u64 = i64::MAX as u64;

    /// Execution with no fees attached.
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        quantity: u64,
        price: Decimal,
        executed_at: NaiveDateTime,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            price,
            fees: FeeBreakdown::default(),
            executed_at,
        }
    }

    pub fn with_fees(mut self, fees: FeeBreakdown) -> Self {
        self.fees = fees;
        self
    }

    /// Trading day the execution belongs to.
    pub fn trade_date(&self) -> NaiveDate {
        self.executed_at.date()
    }

    /// Unsigned `quantity * price`.
    pub fn notional(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price
    }

    /// Notional with the cash-flow sign applied (negative for buys).
    pub fn signed_notional(&self) -> Decimal {
        Decimal::from(self.side.sign()) * self.notional()
    }

    /// Share delta applied to the running position (positive for buys).
    pub fn share_delta(&self) -> i128 {
        let qty = i128::from(self.quantity);
        match self.side {
            Side::Buy => qty,
            Side::Sell | Side::Short => -qty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn side_codes_round_trip() {
        for side in [Side::Buy, Side::Sell, Side::Short] {
            assert_eq!(Side::from_code(side.code()), Some(side));
        }
        assert_eq!(Side::from_code(" T "), Some(Side::Short));
        assert_eq!(Side::from_code("X"), None);
    }

    #[test]
    fn sell_and_short_share_a_sign() {
        assert_eq!(Side::Buy.sign(), -1);
        assert_eq!(Side::Sell.sign(), 1);
        assert_eq!(Side::Short.sign(), 1);
    }

    #[test]
    fn signed_notional_follows_side() {
        let buy = Execution::new("XYZ", Side::Buy, 100, dec!(10.5), at(9, 30));
        let short = Execution::new("XYZ", Side::Short, 100, dec!(10.5), at(9, 31));
        assert_eq!(buy.notional(), dec!(1050));
        assert_eq!(buy.signed_notional(), dec!(-1050));
        assert_eq!(short.signed_notional(), dec!(1050));
        assert_eq!(buy.share_delta(), 100);
        assert_eq!(short.share_delta(), -100);

        let huge = Execution::new("XYZ", Side::Buy, u64::MAX, dec!(1), at(9, 32));
        assert_eq!(huge.share_delta(), i128::from(u64::MAX));
    }

    #[test]
    fn commission_total_excludes_ecn() {
        let fees = FeeBreakdown {
            commission: dec!(1),
            sec: dec!(0.02),
            taf: dec!(0.01),
            nscc: dec!(0.005),
            cat: dec!(0.001),
            ecn: dec!(-0.30),
        };
        assert_eq!(fees.commission_total(), dec!(1.036));
    }

    #[test]
    fn trade_date_drops_time() {
        let exec = Execution::new("ABC", Side::Sell, 1, dec!(1), at(15, 59));
        assert_eq!(exec.trade_date(), NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
    }
}

//! Share balancing: every bought share must be sold or covered.

use crate::domain::Side;
use crate::error::AnalyticsError;
use serde::{Deserialize, Serialize};

/// Shares traded per side.
///
/// Counters are wider than a single execution's quantity so that summing
/// any number of `u64` fills cannot overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTotals {
    pub buy: u128,
    pub sell: u128,
    pub short: u128,
}

impl ShareTotals {
    pub fn record(&mut self, side: Side, quantity: u64) {
        let quantity = u128::from(quantity);
        match side {
            Side::Buy => self.buy += quantity,
            Side::Sell => self.sell += quantity,
            Side::Short => self.short += quantity,
        }
    }

    pub fn merge(&mut self, other: &ShareTotals) {
        self.buy += other.buy;
        self.sell += other.sell;
        self.short += other.short;
    }

    /// Buy == Sell + Short.
    pub fn is_balanced(&self) -> bool {
        self.buy == self.sell + self.short
    }

    /// Fails with [`AnalyticsError::ShareImbalance`] when unbalanced.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if self.is_balanced() {
            Ok(())
        } else {
            Err(AnalyticsError::ShareImbalance {
                buy: self.buy,
                sell: self.sell,
                short: self.short,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_balanced() {
        assert!(ShareTotals::default().validate().is_ok());
    }

    #[test]
    fn sell_plus_short_balances_buy() {
        let mut totals = ShareTotals::default();
        totals.record(Side::Buy, 300);
        totals.record(Side::Sell, 100);
        totals.record(Side::Short, 200);
        assert!(totals.is_balanced());
        assert_eq!(
            totals,
            ShareTotals {
                buy: 300,
                sell: 100,
                short: 200
            }
        );
    }

    #[test]
    fn imbalance_names_every_total() {
        let totals = ShareTotals {
            buy: 100,
            sell: 40,
            short: 50,
        };
        let err = totals.validate().unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::ShareImbalance {
                buy: 100,
                sell: 40,
                short: 50
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("(100)") && msg.contains("(40)") && msg.contains("(50)"));
    }

    #[test]
    fn full_range_quantities_do_not_overflow() {
        let mut totals = ShareTotals::default();
        totals.record(Side::Buy, u64::MAX);
        totals.record(Side::Buy, u64::MAX);
        totals.record(Side::Sell, u64::MAX);
        totals.record(Side::Short, u64::MAX);
        assert_eq!(totals.buy, 2 * u128::from(u64::MAX));
        assert!(totals.is_balanced());
    }

    #[test]
    fn merge_adds_componentwise() {
        let mut a = ShareTotals {
            buy: 1,
            sell: 2,
            short: 3,
        };
        a.merge(&ShareTotals {
            buy: 10,
            sell: 20,
            short: 30,
        });
        assert_eq!(
            a,
            ShareTotals {
                buy: 11,
                sell: 22,
                short: 33
            }
        );
    }
}

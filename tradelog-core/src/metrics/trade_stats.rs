//! Trade statistics: pure functions over closed-trade PnL samples.
//!
//! Every function takes the net PnL of each round trip (one sample per
//! closure) and returns a neutral value on empty input. The `filtered_*`
//! variants drop near-breakeven trades, `|pnl| <= threshold`, from both
//! numerator and denominator.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::ClosedAt;

/// Default breakeven band for the filtered metrics.
pub const DEFAULT_BREAKEVEN_THRESHOLD: Decimal = Decimal::ONE;

/// Winning and losing trade counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLoss {
    pub wins: usize,
    pub losses: usize,
}

impl WinLoss {
    pub fn total(&self) -> usize {
        self.wins + self.losses
    }

    /// `100 * wins / (wins + losses)`, or 0 with no trades.
    pub fn accuracy_pct(&self) -> Decimal {
        let total = self.total();
        if total == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.wins) * Decimal::ONE_HUNDRED / Decimal::from(total)
    }

    fn record(&mut self, pnl: Decimal) {
        if pnl > Decimal::ZERO {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
    }
}

/// Ratio of summed winners to absolute summed losers.
///
/// `Infinite` is a real value, not an error: it is what a run with no losing
/// PnL produces, and displays must special-case it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProfitFactor {
    Finite(Decimal),
    Infinite,
}

impl ProfitFactor {
    pub fn is_infinite(&self) -> bool {
        matches!(self, ProfitFactor::Infinite)
    }

    pub fn finite(&self) -> Option<Decimal> {
        match self {
            ProfitFactor::Finite(v) => Some(*v),
            ProfitFactor::Infinite => None,
        }
    }
}

impl fmt::Display for ProfitFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfitFactor::Finite(v) => write!(f, "{:.2}", v),
            ProfitFactor::Infinite => f.write_str("inf"),
        }
    }
}

/// Mean winner and mean loser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerLoserAverages {
    pub avg_winner: Decimal,
    /// Negative (or zero with no losers).
    pub avg_loser: Decimal,
}

// ─── Counts ─────────────────────────────────────────────────────────

/// Every trade counts: `pnl > 0` wins, anything else (breakeven included) loses.
pub fn win_loss_counts(pnls: &[Decimal]) -> WinLoss {
    let mut counts = WinLoss::default();
    for &pnl in pnls {
        counts.record(pnl);
    }
    counts
}

/// Trades inside the breakeven band are ignored entirely.
pub fn filtered_win_loss_counts(pnls: &[Decimal], threshold: Decimal) -> WinLoss {
    let mut counts = WinLoss::default();
    for &pnl in pnls.iter().filter(|p| p.abs() > threshold) {
        counts.record(pnl);
    }
    counts
}

pub fn accuracy_pct(pnls: &[Decimal]) -> Decimal {
    win_loss_counts(pnls).accuracy_pct()
}

pub fn filtered_accuracy_pct(pnls: &[Decimal], threshold: Decimal) -> Decimal {
    filtered_win_loss_counts(pnls, threshold).accuracy_pct()
}

// ─── Profit factor ──────────────────────────────────────────────────

/// Winners are `pnl > 0`, losers `pnl < 0`.
pub fn profit_factor(pnls: &[Decimal]) -> ProfitFactor {
    profit_factor_outside(pnls, Decimal::ZERO)
}

/// Winners are `pnl > threshold`, losers `pnl < -threshold`.
pub fn filtered_profit_factor(pnls: &[Decimal], threshold: Decimal) -> ProfitFactor {
    profit_factor_outside(pnls, threshold)
}

fn profit_factor_outside(pnls: &[Decimal], band: Decimal) -> ProfitFactor {
    let (winners, losers) = split_outside(pnls, band);
    let gross_profit: Decimal = winners.iter().sum();
    let gross_loss: Decimal = losers.iter().sum();

    if gross_loss.is_zero() {
        return ProfitFactor::Infinite;
    }
    ProfitFactor::Finite(gross_profit / gross_loss.abs())
}

// ─── Averages ───────────────────────────────────────────────────────

/// Mean of strictly positive and strictly negative trades; zeros ignored.
pub fn average_winner_loser(pnls: &[Decimal]) -> WinnerLoserAverages {
    averages_outside(pnls, Decimal::ZERO)
}

pub fn filtered_average_winner_loser(pnls: &[Decimal], threshold: Decimal) -> WinnerLoserAverages {
    averages_outside(pnls, threshold)
}

fn averages_outside(pnls: &[Decimal], band: Decimal) -> WinnerLoserAverages {
    let (winners, losers) = split_outside(pnls, band);
    WinnerLoserAverages {
        avg_winner: mean(&winners),
        avg_loser: mean(&losers),
    }
}

fn split_outside(pnls: &[Decimal], band: Decimal) -> (Vec<Decimal>, Vec<Decimal>) {
    let winners = pnls.iter().copied().filter(|&p| p > band).collect();
    let losers = pnls.iter().copied().filter(|&p| p < -band).collect();
    (winners, losers)
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

// ─── Grouped counts ─────────────────────────────────────────────────

/// Won/lost per symbol, one outcome per (symbol, day) entry of the summed view.
/// A day the symbol traded without closing holds `0` and counts as lost.
pub fn won_lost_by_symbol(
    by_symbol_and_day: &BTreeMap<String, BTreeMap<NaiveDate, Decimal>>,
) -> BTreeMap<String, WinLoss> {
    by_symbol_and_day
        .iter()
        .map(|(symbol, days)| {
            let mut counts = WinLoss::default();
            for &pnl in days.values() {
                counts.record(pnl);
            }
            (symbol.clone(), counts)
        })
        .collect()
}

/// Won/lost per calendar day, one outcome per entry of the time-keyed view.
pub fn won_lost_by_day(by_time: &BTreeMap<NaiveDateTime, ClosedAt>) -> BTreeMap<NaiveDate, WinLoss> {
    let mut out: BTreeMap<NaiveDate, WinLoss> = BTreeMap::new();
    for (closed_at, closed) in by_time {
        out.entry(closed_at.date()).or_default().record(closed.pnl);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_input_is_neutral() {
        assert_eq!(win_loss_counts(&[]), WinLoss::default());
        assert_eq!(accuracy_pct(&[]), Decimal::ZERO);
        assert_eq!(average_winner_loser(&[]), WinnerLoserAverages::default());
        assert_eq!(profit_factor(&[]), ProfitFactor::Infinite);
    }

    #[test]
    fn breakeven_counts_as_loss() {
        let counts = win_loss_counts(&[dec!(10), dec!(0), dec!(-3)]);
        assert_eq!(counts, WinLoss { wins: 1, losses: 2 });
    }

    #[test]
    fn filtered_counts_drop_the_band() {
        let pnls = [dec!(10), dec!(1), dec!(-1), dec!(0.5), dec!(-4), dec!(1.01)];
        let counts = filtered_win_loss_counts(&pnls, DEFAULT_BREAKEVEN_THRESHOLD);
        assert_eq!(counts, WinLoss { wins: 2, losses: 1 });
    }

    #[test]
    fn accuracy_percentage() {
        let pnls = [dec!(5), dec!(5), dec!(5), dec!(-5)];
        assert_eq!(accuracy_pct(&pnls), dec!(75));
        let filtered = filtered_accuracy_pct(&[dec!(5), dec!(0.2), dec!(-0.9)], dec!(1));
        assert_eq!(filtered, dec!(100));
    }

    #[test]
    fn profit_factor_ratio() {
        let pnls = [dec!(300), dec!(100), dec!(-200), dec!(0)];
        assert_eq!(profit_factor(&pnls), ProfitFactor::Finite(dec!(2)));
    }

    #[test]
    fn profit_factor_without_losers_is_infinite() {
        let pf = profit_factor(&[dec!(200)]);
        assert!(pf.is_infinite());
        assert_eq!(pf.to_string(), "inf");
        assert_eq!(pf.finite(), None);
    }

    #[test]
    fn filtered_profit_factor_ignores_small_losers() {
        let pnls = [dec!(50), dec!(-0.75), dec!(-1)];
        assert_eq!(profit_factor(&pnls), ProfitFactor::Finite(dec!(50) / dec!(1.75)));
        assert_eq!(filtered_profit_factor(&pnls, dec!(1)), ProfitFactor::Infinite);
    }

    #[test]
    fn infinite_orders_above_every_finite_value() {
        assert!(ProfitFactor::Infinite > ProfitFactor::Finite(dec!(1000000)));
        assert!(ProfitFactor::Finite(dec!(1.5)) > ProfitFactor::Finite(dec!(1.2)));
    }

    #[test]
    fn averages_exclude_breakeven() {
        let avgs = average_winner_loser(&[dec!(10), dec!(20), dec!(0), dec!(-6)]);
        assert_eq!(avgs.avg_winner, dec!(15));
        assert_eq!(avgs.avg_loser, dec!(-6));
    }

    #[test]
    fn filtered_averages_with_everything_in_band() {
        let pnls = [dec!(0.5), dec!(-1), dec!(1), dec!(0)];
        let avgs = filtered_average_winner_loser(&pnls, dec!(1));
        assert_eq!(avgs, WinnerLoserAverages::default());
        assert_eq!(filtered_win_loss_counts(&pnls, dec!(1)).total(), 0);
        assert_eq!(filtered_accuracy_pct(&pnls, dec!(1)), Decimal::ZERO);
    }

    #[test]
    fn won_lost_by_symbol_counts_day_entries() {
        let d6 = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let d7 = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        let mut view = BTreeMap::new();
        view.insert(
            "XYZ".to_string(),
            BTreeMap::from([(d6, dec!(190)), (d7, dec!(-5))]),
        );
        view.insert("ABC".to_string(), BTreeMap::from([(d6, dec!(0))]));

        let counts = won_lost_by_symbol(&view);
        assert_eq!(counts["XYZ"], WinLoss { wins: 1, losses: 1 });
        assert_eq!(counts["ABC"], WinLoss { wins: 0, losses: 1 });
    }

    #[test]
    fn won_lost_by_day_groups_timestamps() {
        let d6 = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let view = BTreeMap::from([
            (
                d6.and_hms_opt(9, 40, 0).unwrap(),
                ClosedAt {
                    symbol: "XYZ".into(),
                    pnl: dec!(200),
                },
            ),
            (
                d6.and_hms_opt(9, 41, 0).unwrap(),
                ClosedAt {
                    symbol: "ABC".into(),
                    pnl: dec!(-20),
                },
            ),
        ]);
        let counts = won_lost_by_day(&view);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[&d6], WinLoss { wins: 1, losses: 1 });
    }
}

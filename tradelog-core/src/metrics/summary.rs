//! Aggregate metrics: every scalar and grouping derived from one ledger and one book.

use super::ledger::ExecutionLedger;
use super::shares::ShareTotals;
use super::trade_stats::{
    self, ProfitFactor, WinLoss, WinnerLoserAverages, DEFAULT_BREAKEVEN_THRESHOLD,
};
use crate::engine::RoundTripBook;
use crate::error::AnalyticsError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tunables for the derived metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Trades with `|pnl| <= breakeven_threshold` are left out of the filtered metrics.
    pub breakeven_threshold: Decimal,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            breakeven_threshold: DEFAULT_BREAKEVEN_THRESHOLD,
        }
    }
}

/// Full metric set for one execution log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    // ── Totals (raw executions) ──
    pub gross_pnl: Decimal,
    pub net_pnl: Decimal,
    pub commissions: Decimal,
    pub ecn_fees: Decimal,
    pub shares: ShareTotals,

    // ── Per day (raw executions) ──
    pub gross_pnl_by_day: BTreeMap<NaiveDate, Decimal>,
    pub net_pnl_by_day: BTreeMap<NaiveDate, Decimal>,
    pub cumulative_gross_pnl_by_day: BTreeMap<NaiveDate, Decimal>,
    pub cumulative_net_pnl_by_day: BTreeMap<NaiveDate, Decimal>,
    pub commissions_by_day: BTreeMap<NaiveDate, Decimal>,
    pub ecn_fees_by_day: BTreeMap<NaiveDate, Decimal>,
    pub shares_by_day: BTreeMap<NaiveDate, ShareTotals>,

    // ── Per symbol (raw executions) ──
    pub gross_pnl_by_symbol: BTreeMap<String, Decimal>,
    pub net_pnl_by_symbol: BTreeMap<String, Decimal>,

    // ── Round trips ──
    pub closed_trades: usize,
    pub win_loss: WinLoss,
    pub filtered_win_loss: WinLoss,
    pub averages: WinnerLoserAverages,
    pub filtered_averages: WinnerLoserAverages,
    pub profit_factor: ProfitFactor,
    pub filtered_profit_factor: ProfitFactor,
    pub accuracy_pct: Decimal,
    pub filtered_accuracy_pct: Decimal,
    pub won_lost_by_symbol: BTreeMap<String, WinLoss>,
    pub won_lost_by_day: BTreeMap<NaiveDate, WinLoss>,
    pub breakeven_threshold: Decimal,
}

impl AggregateMetrics {
    /// Compute everything. Fails if shares do not balance overall or on any day.
    pub fn compute(
        ledger: &ExecutionLedger,
        book: &RoundTripBook,
        config: &MetricsConfig,
    ) -> Result<Self, AnalyticsError> {
        let shares = ledger.share_totals()?;
        let shares_by_day = ledger.shares_by_day()?;

        let total = ledger.total();
        let threshold = config.breakeven_threshold;

        // Distribution stats run over the day-grouped view so every closure counts.
        let pnls: Vec<Decimal> = book
            .by_day()
            .values()
            .flat_map(|trades| trades.iter().map(|t| t.pnl))
            .collect();

        let win_loss = trade_stats::win_loss_counts(&pnls);
        let filtered_win_loss = trade_stats::filtered_win_loss_counts(&pnls, threshold);

        Ok(Self {
            gross_pnl: total.gross,
            net_pnl: total.net(),
            commissions: total.commissions,
            ecn_fees: total.ecn_fees,
            shares,

            gross_pnl_by_day: ledger.gross_pnl_by_day(),
            net_pnl_by_day: ledger.net_pnl_by_day(),
            cumulative_gross_pnl_by_day: ledger.cumulative_gross_pnl_by_day(),
            cumulative_net_pnl_by_day: ledger.cumulative_net_pnl_by_day(),
            commissions_by_day: ledger.commissions_by_day(),
            ecn_fees_by_day: ledger.ecn_fees_by_day(),
            shares_by_day,

            gross_pnl_by_symbol: ledger.gross_pnl_by_symbol(),
            net_pnl_by_symbol: ledger.net_pnl_by_symbol(),

            closed_trades: book.len(),
            win_loss,
            filtered_win_loss,
            averages: trade_stats::average_winner_loser(&pnls),
            filtered_averages: trade_stats::filtered_average_winner_loser(&pnls, threshold),
            profit_factor: trade_stats::profit_factor(&pnls),
            filtered_profit_factor: trade_stats::filtered_profit_factor(&pnls, threshold),
            accuracy_pct: win_loss.accuracy_pct(),
            filtered_accuracy_pct: filtered_win_loss.accuracy_pct(),
            won_lost_by_symbol: trade_stats::won_lost_by_symbol(&book.by_symbol_and_day()),
            won_lost_by_day: trade_stats::won_lost_by_day(&book.by_time()),
            breakeven_threshold: threshold,
        })
    }
}

/// Outcome of comparing the two net-PnL computation paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reconciliation {
    Matched,
    /// Some symbol never returned to flat, so the paths are not comparable.
    SkippedOpenPositions,
}

/// Check that net PnL from raw executions equals the sum of round-trip PnL.
///
/// Only meaningful when every position ended flat; otherwise the raw path
/// includes cash flow from trades that never closed.
pub fn reconcile_net_pnl(
    ledger: &ExecutionLedger,
    book: &RoundTripBook,
) -> Result<Reconciliation, AnalyticsError> {
    if !book.all_flat() {
        return Ok(Reconciliation::SkippedOpenPositions);
    }
    let raw = ledger.net_pnl_total();
    let round_trips = book.total_net_pnl();
    if raw != round_trips {
        return Err(AnalyticsError::NetPnlMismatch { raw, round_trips });
    }
    Ok(Reconciliation::Matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Execution, FeeBreakdown, Side};
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn run(execs: &[Execution]) -> Result<AggregateMetrics, AnalyticsError> {
        let ledger = ExecutionLedger::from_executions(execs);
        let book = RoundTripBook::reconstruct(execs);
        AggregateMetrics::compute(&ledger, &book, &MetricsConfig::default())
    }

    #[test]
    fn empty_log_degrades_to_neutral_values() {
        let m = run(&[]).unwrap();
        assert_eq!(m.net_pnl, Decimal::ZERO);
        assert_eq!(m.closed_trades, 0);
        assert_eq!(m.accuracy_pct, Decimal::ZERO);
        assert_eq!(m.averages, WinnerLoserAverages::default());
        assert!(m.net_pnl_by_day.is_empty());
        assert!(m.won_lost_by_symbol.is_empty());
    }

    #[test]
    fn single_winning_round_trip() {
        let execs = vec![
            Execution::new("XYZ", Side::Buy, 100, dec!(10), at(6, 9, 30)),
            Execution::new("XYZ", Side::Sell, 100, dec!(12), at(6, 9, 45)),
        ];
        let m = run(&execs).unwrap();
        assert_eq!(m.gross_pnl, dec!(200));
        assert_eq!(m.net_pnl, dec!(200));
        assert_eq!(m.closed_trades, 1);
        assert_eq!(m.win_loss, WinLoss { wins: 1, losses: 0 });
        assert_eq!(m.profit_factor, ProfitFactor::Infinite);
        assert_eq!(m.accuracy_pct, dec!(100));
        assert_eq!(m.averages.avg_winner, dec!(200));
    }

    #[test]
    fn losing_trade_with_rebate() {
        let execs = vec![
            Execution::new("ABC", Side::Buy, 50, dec!(20), at(6, 10, 0)).with_fees(FeeBreakdown {
                commission: dec!(1),
                ..FeeBreakdown::default()
            }),
            Execution::new("ABC", Side::Sell, 50, dec!(19), at(6, 10, 5)).with_fees(FeeBreakdown {
                commission: dec!(1),
                ecn: dec!(-0.5),
                ..FeeBreakdown::default()
            }),
        ];
        let m = run(&execs).unwrap();
        assert_eq!(m.net_pnl, dec!(-51.5));
        assert_eq!(m.win_loss, WinLoss { wins: 0, losses: 1 });
        assert_eq!(m.profit_factor, ProfitFactor::Finite(Decimal::ZERO));
        assert_eq!(m.averages.avg_loser, dec!(-51.5));
    }

    #[test]
    fn share_imbalance_aborts_the_computation() {
        let execs = vec![
            Execution::new("XYZ", Side::Buy, 100, dec!(10), at(6, 9, 30)),
            Execution::new("XYZ", Side::Sell, 40, dec!(12), at(6, 9, 45)),
        ];
        assert!(matches!(
            run(&execs),
            Err(AnalyticsError::ShareImbalance { buy: 100, sell: 40, short: 0 })
        ));
    }

    #[test]
    fn reconcile_matches_when_everything_closes() {
        let execs = vec![
            Execution::new("XYZ", Side::Buy, 100, dec!(10), at(6, 9, 30)).with_fees(FeeBreakdown {
                commission: dec!(0.35),
                sec: dec!(0.01),
                ecn: dec!(0.30),
                ..FeeBreakdown::default()
            }),
            Execution::new("XYZ", Side::Sell, 100, dec!(10.02), at(6, 9, 45)).with_fees(
                FeeBreakdown {
                    commission: dec!(0.35),
                    taf: dec!(0.02),
                    ecn: dec!(-0.20),
                    ..FeeBreakdown::default()
                },
            ),
        ];
        let ledger = ExecutionLedger::from_executions(&execs);
        let book = RoundTripBook::reconstruct(&execs);
        assert_eq!(reconcile_net_pnl(&ledger, &book), Ok(Reconciliation::Matched));
        assert_eq!(ledger.net_pnl_total(), dec!(1.17));
    }

    #[test]
    fn reconcile_skips_open_positions() {
        let execs = vec![Execution::new("XYZ", Side::Buy, 100, dec!(10), at(6, 9, 30))];
        let ledger = ExecutionLedger::from_executions(&execs);
        let book = RoundTripBook::reconstruct(&execs);
        assert_eq!(
            reconcile_net_pnl(&ledger, &book),
            Ok(Reconciliation::SkippedOpenPositions)
        );
    }

    #[test]
    fn filtered_metrics_use_configured_threshold() {
        let execs = vec![
            Execution::new("AAA", Side::Buy, 100, dec!(10), at(6, 9, 30)),
            Execution::new("AAA", Side::Sell, 100, dec!(10.03), at(6, 9, 31)),
            Execution::new("BBB", Side::Buy, 100, dec!(10), at(6, 9, 32)),
            Execution::new("BBB", Side::Sell, 100, dec!(9.90), at(6, 9, 33)),
        ];
        let ledger = ExecutionLedger::from_executions(&execs);
        let book = RoundTripBook::reconstruct(&execs);

        let default = AggregateMetrics::compute(&ledger, &book, &MetricsConfig::default()).unwrap();
        assert_eq!(default.filtered_win_loss, WinLoss { wins: 1, losses: 1 });

        let wide = MetricsConfig {
            breakeven_threshold: dec!(5),
        };
        let m = AggregateMetrics::compute(&ledger, &book, &wide).unwrap();
        assert_eq!(m.filtered_win_loss, WinLoss { wins: 0, losses: 1 });
        assert_eq!(m.filtered_profit_factor, ProfitFactor::Finite(Decimal::ZERO));
        assert_eq!(m.breakeven_threshold, dec!(5));
    }
}

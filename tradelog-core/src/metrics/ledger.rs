//! Execution ledger: the raw executions grouped once by day and symbol.
//!
//! Gross, net and fee rollups come straight from executions, not from
//! round trips, so they include fees on positions that never closed. Every
//! total, per-day and per-symbol figure is a reduction over this one grouping.

use super::shares::ShareTotals;
use crate::domain::Execution;
use crate::error::AnalyticsError;
use crate::fees::commission_and_ecn;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Running sums for one (day, symbol) bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionTally {
    /// Σ sign(side) · qty · price.
    pub gross: Decimal,
    pub commissions: Decimal,
    /// Signed; negative means net rebate.
    pub ecn_fees: Decimal,
    pub shares: ShareTotals,
    pub executions: usize,
}

impl ExecutionTally {
    fn record(&mut self, execution: &Execution) {
        let (commission, ecn) = commission_and_ecn(execution);
        self.gross += execution.signed_notional();
        self.commissions += commission;
        self.ecn_fees += ecn;
        self.shares.record(execution.side, execution.quantity);
        self.executions += 1;
    }

    fn merge(&mut self, other: &ExecutionTally) {
        self.gross += other.gross;
        self.commissions += other.commissions;
        self.ecn_fees += other.ecn_fees;
        self.shares.merge(&other.shares);
        self.executions += other.executions;
    }

    /// gross − commissions − ecn.
    pub fn net(&self) -> Decimal {
        self.gross - self.commissions - self.ecn_fees
    }
}

/// Executions grouped day → symbol.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLedger {
    days: BTreeMap<NaiveDate, BTreeMap<String, ExecutionTally>>,
}

impl ExecutionLedger {
    pub fn from_executions(executions: &[Execution]) -> Self {
        let mut days: BTreeMap<NaiveDate, BTreeMap<String, ExecutionTally>> = BTreeMap::new();
        for execution in executions {
            days.entry(execution.trade_date())
                .or_default()
                .entry(execution.symbol.clone())
                .or_default()
                .record(execution);
        }
        Self { days }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn days(&self) -> impl Iterator<Item = &NaiveDate> {
        self.days.keys()
    }

    /// Bucket for one day and symbol.
    pub fn tally(&self, day: NaiveDate, symbol: &str) -> Option<&ExecutionTally> {
        self.days.get(&day).and_then(|symbols| symbols.get(symbol))
    }

    /// Everything summed together.
    pub fn total(&self) -> ExecutionTally {
        let mut total = ExecutionTally::default();
        for tally in self.days.values().flat_map(|s| s.values()) {
            total.merge(tally);
        }
        total
    }

    /// One tally per day.
    pub fn by_day(&self) -> BTreeMap<NaiveDate, ExecutionTally> {
        self.days
            .iter()
            .map(|(day, symbols)| {
                let mut tally = ExecutionTally::default();
                for t in symbols.values() {
                    tally.merge(t);
                }
                (*day, tally)
            })
            .collect()
    }

    /// One tally per symbol across all days.
    pub fn by_symbol(&self) -> BTreeMap<String, ExecutionTally> {
        let mut out: BTreeMap<String, ExecutionTally> = BTreeMap::new();
        for symbols in self.days.values() {
            for (symbol, tally) in symbols {
                out.entry(symbol.clone()).or_default().merge(tally);
            }
        }
        out
    }

    // ── Totals ──

    pub fn gross_pnl_total(&self) -> Decimal {
        self.total().gross
    }

    pub fn net_pnl_total(&self) -> Decimal {
        self.total().net()
    }

    pub fn commissions_total(&self) -> Decimal {
        self.total().commissions
    }

    pub fn ecn_fees_total(&self) -> Decimal {
        self.total().ecn_fees
    }

    // ── Per day ──

    pub fn gross_pnl_by_day(&self) -> BTreeMap<NaiveDate, Decimal> {
        self.map_days(|t| t.gross)
    }

    pub fn net_pnl_by_day(&self) -> BTreeMap<NaiveDate, Decimal> {
        self.map_days(ExecutionTally::net)
    }

    pub fn commissions_by_day(&self) -> BTreeMap<NaiveDate, Decimal> {
        self.map_days(|t| t.commissions)
    }

    pub fn ecn_fees_by_day(&self) -> BTreeMap<NaiveDate, Decimal> {
        self.map_days(|t| t.ecn_fees)
    }

    /// Running total of daily gross PnL, in date order.
    pub fn cumulative_gross_pnl_by_day(&self) -> BTreeMap<NaiveDate, Decimal> {
        cumulative(self.gross_pnl_by_day())
    }

    /// Running total of daily net PnL, in date order.
    pub fn cumulative_net_pnl_by_day(&self) -> BTreeMap<NaiveDate, Decimal> {
        cumulative(self.net_pnl_by_day())
    }

    // ── Per symbol ──

    pub fn gross_pnl_by_symbol(&self) -> BTreeMap<String, Decimal> {
        self.by_symbol()
            .into_iter()
            .map(|(s, t)| (s, t.gross))
            .collect()
    }

    pub fn net_pnl_by_symbol(&self) -> BTreeMap<String, Decimal> {
        self.by_symbol()
            .into_iter()
            .map(|(s, t)| (s, t.net()))
            .collect()
    }

    // ── Shares ──

    /// Shares per side over the whole ledger, validated.
    pub fn share_totals(&self) -> Result<ShareTotals, AnalyticsError> {
        let totals = self.total().shares;
        totals.validate()?;
        Ok(totals)
    }

    /// Shares per side per day, each day validated.
    ///
    /// A failing day is reported against the first symbol (alphabetically)
    /// whose own shares do not balance that day.
    pub fn shares_by_day(&self) -> Result<BTreeMap<NaiveDate, ShareTotals>, AnalyticsError> {
        let mut out = BTreeMap::new();
        for (day, symbols) in &self.days {
            let mut day_totals = ShareTotals::default();
            for tally in symbols.values() {
                day_totals.merge(&tally.shares);
            }
            if !day_totals.is_balanced() {
                // Balance is additive across symbols, so an unbalanced day
                // always has an unbalanced symbol and the default is never taken.
                let symbol = symbols
                    .iter()
                    .find(|(_, t)| !t.shares.is_balanced())
                    .map(|(s, _)| s.clone())
                    .unwrap_or_default();
                return Err(AnalyticsError::DailyShareImbalance {
                    day: *day,
                    symbol,
                    buy: day_totals.buy,
                    sell: day_totals.sell,
                    short: day_totals.short,
                });
            }
            out.insert(*day, day_totals);
        }
        Ok(out)
    }

    fn map_days<F>(&self, f: F) -> BTreeMap<NaiveDate, Decimal>
    where
        F: Fn(&ExecutionTally) -> Decimal,
    {
        self.days
            .iter()
            .map(|(day, symbols)| (*day, symbols.values().map(&f).sum()))
            .collect()
    }
}

fn cumulative(daily: BTreeMap<NaiveDate, Decimal>) -> BTreeMap<NaiveDate, Decimal> {
    let mut running = Decimal::ZERO;
    daily
        .into_iter()
        .map(|(day, value)| {
            running += value;
            (day, running)
        })
        .collect()
}

//! Round-trip reconstruction: one tracker pass, several index views.
//!
//! [`RoundTripBook::reconstruct`] drives a single [`PositionTracker`] across
//! the ordered execution stream and keeps every closure in order. The views
//! used by the aggregation layer are projections of that one sequence:
//!
//! | View | Key | Collision rule |
//! | --- | --- | --- |
//! | [`by_symbol_and_day`](RoundTripBook::by_symbol_and_day) | symbol, close date | summed |
//! | [`by_symbol_and_time`](RoundTripBook::by_symbol_and_time) | symbol, close timestamp | last write wins |
//! | [`by_time`](RoundTripBook::by_time) | close timestamp | first write wins |
//! | [`by_day`](RoundTripBook::by_day) | close date | every trade kept |
//!
//! The two date-keyed views also carry an entry for every day with
//! executions: `0` per traded (symbol, day) in `by_symbol_and_day`, an empty
//! list per traded day in `by_day`. A position held overnight therefore shows
//! up as a zero on the day it was opened.
//!
//! The two timestamp-keyed views drop data when two trades close at the same
//! instant. That is a known limitation kept for parity with the reports they
//! feed; anything that needs every trade should use `trades()` or `by_day()`.

use super::position::PositionTracker;
use crate::domain::{ClosedAt, Execution, RoundTrip, TradeOutcome};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// All four index views, materialized together for presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeViews {
    pub by_symbol_and_day: BTreeMap<String, BTreeMap<NaiveDate, Decimal>>,
    pub by_symbol_and_time: BTreeMap<String, BTreeMap<NaiveDateTime, Decimal>>,
    pub by_time: BTreeMap<NaiveDateTime, ClosedAt>,
    pub by_day: BTreeMap<NaiveDate, Vec<TradeOutcome>>,
}

/// Ordered closures produced by one pass over an execution stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundTripBook {
    trades: Vec<RoundTrip>,
    open_symbols: Vec<String>,
    /// Symbol → every day it had at least one execution.
    #[serde(default)]
    active_days: BTreeMap<String, BTreeSet<NaiveDate>>,
}

impl RoundTripBook {
    /// Run the position tracker over `executions` (earliest first).
    pub fn reconstruct(executions: &[Execution]) -> Self {
        let mut tracker = PositionTracker::new();
        let mut active_days: BTreeMap<String, BTreeSet<NaiveDate>> = BTreeMap::new();
        let mut trades = Vec::new();
        for execution in executions {
            active_days
                .entry(execution.symbol.clone())
                .or_default()
                .insert(execution.trade_date());
            trades.extend(tracker.apply(execution));
        }
        let open_symbols = tracker.open_positions();

        if !open_symbols.is_empty() {
            tracing::warn!(
                symbols = ?open_symbols,
                "positions still open at end of execution stream"
            );
        }

        Self {
            trades,
            open_symbols,
            active_days,
        }
    }

    /// Every closed trade in closing order.
    pub fn trades(&self) -> &[RoundTrip] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Symbols not flat at the end of the stream.
    pub fn open_symbols(&self) -> &[String] {
        &self.open_symbols
    }

    /// True when every symbol ended flat.
    pub fn all_flat(&self) -> bool {
        self.open_symbols.is_empty()
    }

    /// Net PnL of every closed trade.
    pub fn net_pnls(&self) -> Vec<Decimal> {
        self.trades.iter().map(|t| t.net_pnl).collect()
    }

    pub fn total_net_pnl(&self) -> Decimal {
        self.trades.iter().map(|t| t.net_pnl).sum()
    }

    pub fn views(&self) -> TradeViews {
        TradeViews {
            by_symbol_and_day: self.by_symbol_and_day(),
            by_symbol_and_time: self.by_symbol_and_time(),
            by_time: self.by_time(),
            by_day: self.by_day(),
        }
    }

    /// Every day with at least one execution, in date order.
    pub fn trading_days(&self) -> BTreeSet<NaiveDate> {
        self.active_days.values().flatten().copied().collect()
    }

    /// Symbol → date → summed net PnL of trades closing that day. Days the
    /// symbol traded without closing anything hold `0`.
    pub fn by_symbol_and_day(&self) -> BTreeMap<String, BTreeMap<NaiveDate, Decimal>> {
        let mut view: BTreeMap<String, BTreeMap<NaiveDate, Decimal>> = self
            .active_days
            .iter()
            .map(|(symbol, days)| {
                let zeros = days.iter().map(|day| (*day, Decimal::ZERO)).collect();
                (symbol.clone(), zeros)
            })
            .collect();
        for trade in &self.trades {
            *view
                .entry(trade.symbol.clone())
                .or_default()
                .entry(trade.trade_date())
                .or_default() += trade.net_pnl;
        }
        view
    }

    /// Symbol → close timestamp → net PnL. A later trade closing at the same
    /// timestamp on the same symbol replaces the earlier one.
    pub fn by_symbol_and_time(&self) -> BTreeMap<String, BTreeMap<NaiveDateTime, Decimal>> {
        let mut view: BTreeMap<String, BTreeMap<NaiveDateTime, Decimal>> = BTreeMap::new();
        for trade in &self.trades {
            view.entry(trade.symbol.clone())
                .or_default()
                .insert(trade.closed_at, trade.net_pnl);
        }
        view
    }

    /// Close timestamp → (symbol, net PnL). The first trade to close at a
    /// timestamp keeps the slot; later ones at the same instant are dropped.
    pub fn by_time(&self) -> BTreeMap<NaiveDateTime, ClosedAt> {
        let mut view = BTreeMap::new();
        for trade in &self.trades {
            view.entry(trade.closed_at).or_insert_with(|| ClosedAt {
                symbol: trade.symbol.clone(),
                pnl: trade.net_pnl,
            });
        }
        view
    }

    /// Date → every trade closed that day, in closing order. Trading days
    /// without a closure map to an empty list.
    pub fn by_day(&self) -> BTreeMap<NaiveDate, Vec<TradeOutcome>> {
        let mut view: BTreeMap<NaiveDate, Vec<TradeOutcome>> = self
            .trading_days()
            .into_iter()
            .map(|day| (day, Vec::new()))
            .collect();
        for trade in &self.trades {
            view.entry(trade.trade_date())
                .or_default()
                .push(trade.outcome());
        }
        view
    }
}

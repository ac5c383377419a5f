//! Position tracker: per-symbol running position and closure detection.
//!
//! Each symbol moves Flat → Open → Flat any number of times. Every execution
//! adjusts the share count and folds its cash flow and fees into the open
//! trade's running value. The execution that brings the share count back to
//! exactly zero emits a [`RoundTrip`] and resets the accumulators; the symbol
//! stays tracked so it can reopen later.
//!
//! The tracker never rejects input. Share balancing is checked separately by
//! the aggregation layer.

use crate::domain::{Execution, RoundTrip};
use crate::fees::commission_and_ecn;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Whether a symbol currently holds shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    Flat,
    Open,
}

/// Running state for one symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionState {
    /// Signed share count: positive long, negative short.
    pub shares: i128,
    /// Net cash flow of the open trade, fees already taken out.
    pub trade_value: Decimal,
    /// Cash flow from prices alone.
    pub gross_value: Decimal,
    pub commissions: Decimal,
    pub ecn_fees: Decimal,
    pub opened_at: Option<NaiveDateTime>,
    pub execution_count: usize,
}

impl PositionState {
    pub fn status(&self) -> PositionStatus {
        if self.shares == 0 {
            PositionStatus::Flat
        } else {
            PositionStatus::Open
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Tracks every symbol seen in the execution stream.
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    positions: HashMap<String, PositionState>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one execution. Returns the completed trade if this execution
    /// returned the symbol's position to flat.
    pub fn apply(&mut self, execution: &Execution) -> Option<RoundTrip> {
        let state = self
            .positions
            .entry(execution.symbol.clone())
            .or_default();

        if state.execution_count == 0 {
            state.opened_at = Some(execution.executed_at);
        }
        state.execution_count += 1;

        let cash_flow = execution.signed_notional();
        let (commission, ecn) = commission_and_ecn(execution);

        state.shares += execution.share_delta();
        state.gross_value += cash_flow;
        state.commissions += commission;
        state.ecn_fees += ecn;
        state.trade_value += cash_flow;
        state.trade_value -= commission + ecn;

        if state.shares != 0 {
            return None;
        }

        let trade = RoundTrip {
            symbol: execution.symbol.clone(),
            opened_at: state.opened_at.unwrap_or(execution.executed_at),
            closed_at: execution.executed_at,
            execution_count: state.execution_count,
            gross_pnl: state.gross_value,
            commissions: state.commissions,
            ecn_fees: state.ecn_fees,
            net_pnl: state.trade_value,
        };
        state.reset();

        tracing::debug!(
            symbol = %trade.symbol,
            closed_at = %trade.closed_at,
            net_pnl = %trade.net_pnl,
            "round trip closed"
        );
        Some(trade)
    }

    /// Current state for a symbol, if it has been seen.
    pub fn position(&self, symbol: &str) -> Option<&PositionState> {
        self.positions.get(symbol)
    }

    pub fn status(&self, symbol: &str) -> PositionStatus {
        self.positions
            .get(symbol)
            .map(PositionState::status)
            .unwrap_or(PositionStatus::Flat)
    }

    /// Symbols that still hold shares, sorted.
    pub fn open_positions(&self) -> Vec<String> {
        let mut open: Vec<String> = self
            .positions
            .iter()
            .filter(|(_, s)| s.status() == PositionStatus::Open)
            .map(|(symbol, _)| symbol.clone())
            .collect();
        open.sort();
        open
    }

    /// Number of distinct symbols seen so far.
    pub fn symbol_count(&self) -> usize {
        self.positions.len()
    }
}

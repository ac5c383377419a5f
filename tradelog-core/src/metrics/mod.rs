//! Aggregation: pure reductions over the execution ledger and the round-trip book.
//!
//! Two inputs, two paths:
//! - gross, net, fee and share rollups come from raw executions ([`ledger`])
//! - win/loss, averages, profit factor and accuracy come from closed trades ([`trade_stats`])
//!
//! [`summary`] assembles both into [`AggregateMetrics`] and checks the paths agree.

pub mod ledger;
pub mod shares;
pub mod summary;
pub mod trade_stats;

pub use ledger::{ExecutionLedger, ExecutionTally};
pub use shares::ShareTotals;
pub use summary::{reconcile_net_pnl, AggregateMetrics, MetricsConfig, Reconciliation};
pub use trade_stats::{ProfitFactor, WinLoss, WinnerLoserAverages, DEFAULT_BREAKEVEN_THRESHOLD};

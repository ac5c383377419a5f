//! Report assembly: wires together feed, reconstruction and aggregation.
//!
//! Two entry points:
//! - `build_report()`: takes cleaned executions. Used by tests and benches.
//! - `run_report()`: loads the CSV first, then builds. Used by the CLI.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use tradelog_core::domain::{Execution, RoundTrip};
use tradelog_core::engine::{RoundTripBook, TradeViews};
use tradelog_core::metrics::{
    reconcile_net_pnl, AggregateMetrics, ExecutionLedger, Reconciliation,
};
use tradelog_core::AnalyticsError;

use crate::config::{ConfigError, ReportConfig};
use crate::feed::{load_executions, FeedError};

/// Errors from building a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("data integrity error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("failed to fingerprint executions: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete report for one execution log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Where the executions came from (file path or generator tag).
    pub source: String,
    /// BLAKE3 over the executions' canonical JSON.
    pub dataset_hash: String,
    pub execution_count: usize,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    pub metrics: AggregateMetrics,
    /// Closed round trips in closure order.
    pub trades: Vec<RoundTrip>,
    /// Round trips indexed by symbol/day, symbol/time, time and day.
    #[serde(default)]
    pub views: TradeViews,
    pub open_symbols: Vec<String>,
    pub reconciliation: Reconciliation,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Build a report from executions already in chronological order.
pub fn build_report(
    executions: &[Execution],
    config: &ReportConfig,
    source: &str,
) -> Result<Report, ReportError> {
    config.validate()?;

    let ledger = ExecutionLedger::from_executions(executions);
    let book = RoundTripBook::reconstruct(executions);
    let metrics = AggregateMetrics::compute(&ledger, &book, &config.metrics)?;
    let reconciliation = reconcile_net_pnl(&ledger, &book)?;
    if reconciliation == Reconciliation::SkippedOpenPositions {
        warn!(
            open = ?book.open_symbols(),
            "net PnL reconciliation skipped: positions left open"
        );
    }

    let dataset_hash = dataset_hash(executions)?;
    info!(
        source,
        executions = executions.len(),
        trades = book.len(),
        net_pnl = %metrics.net_pnl,
        "report built"
    );

    Ok(Report {
        schema_version: SCHEMA_VERSION,
        source: source.to_string(),
        dataset_hash,
        execution_count: executions.len(),
        first_day: executions.first().map(Execution::trade_date),
        last_day: executions.last().map(Execution::trade_date),
        metrics,
        trades: book.trades().to_vec(),
        views: book.views(),
        open_symbols: book.open_symbols().to_vec(),
        reconciliation,
    })
}

/// Load the CSV at `input` and build its report.
pub fn run_report(input: &Path, config: &ReportConfig) -> Result<Report, ReportError> {
    let executions = load_executions(input, &config.feed)?;
    build_report(&executions, config, &input.display().to_string())
}

/// Deterministic fingerprint of an execution stream.
///
/// Identical executions in identical order always hash the same, so two
/// reports with equal hashes were computed from the same data.
pub fn dataset_hash(executions: &[Execution]) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(executions)?;
    Ok(blake3::hash(&json).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;
    use tradelog_core::domain::Side;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn session() -> Vec<Execution> {
        vec![
            Execution::new("XYZ", Side::Buy, 100, dec!(10), at(6, 9, 30)),
            Execution::new("XYZ", Side::Sell, 100, dec!(12), at(6, 9, 45)),
            Execution::new("ABC", Side::Short, 10, dec!(50), at(7, 10, 0)),
            Execution::new("ABC", Side::Buy, 10, dec!(51), at(7, 10, 5)),
        ]
    }

    #[test]
    fn report_carries_metrics_and_trades() {
        let report = build_report(&session(), &ReportConfig::default(), "test").unwrap();
        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.execution_count, 4);
        assert_eq!(report.trades.len(), 2);
        assert_eq!(report.metrics.net_pnl, dec!(190));
        assert_eq!(report.first_day, NaiveDate::from_ymd_opt(2025, 1, 6));
        assert_eq!(report.last_day, NaiveDate::from_ymd_opt(2025, 1, 7));
        assert_eq!(report.reconciliation, Reconciliation::Matched);
        assert!(report.open_symbols.is_empty());

        let d6 = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert_eq!(report.views.by_symbol_and_day["XYZ"][&d6], dec!(200));
        assert_eq!(report.views.by_symbol_and_time["ABC"][&at(7, 10, 5)], dec!(-10));
        assert_eq!(report.views.by_time.len(), 2);
        assert_eq!(report.views.by_day[&d6].len(), 1);
    }

    #[test]
    fn dataset_hash_is_deterministic_and_order_sensitive() {
        let execs = session();
        let h1 = dataset_hash(&execs).unwrap();
        let h2 = dataset_hash(&execs).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);

        let mut swapped = execs.clone();
        swapped.swap(0, 1);
        assert_ne!(dataset_hash(&swapped).unwrap(), h1);
    }

    #[test]
    fn imbalance_surfaces_as_analytics_error() {
        let execs = vec![Execution::new("XYZ", Side::Buy, 100, dec!(10), at(6, 9, 30))];
        let err = build_report(&execs, &ReportConfig::default(), "test").unwrap_err();
        assert!(matches!(
            err,
            ReportError::Analytics(AnalyticsError::ShareImbalance { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected_before_computing() {
        let mut config = ReportConfig::default();
        config.metrics.breakeven_threshold = dec!(-2);
        let err = build_report(&session(), &config, "test").unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn empty_log_builds_an_empty_report() {
        let report = build_report(&[], &ReportConfig::default(), "empty").unwrap();
        assert_eq!(report.execution_count, 0);
        assert!(report.trades.is_empty());
        assert_eq!(report.first_day, None);
        assert!(report.metrics.profit_factor.is_infinite());
    }
}

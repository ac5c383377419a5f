//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! Three export formats for a report:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: round-trip tape for spreadsheets
//! - **Markdown**: human-readable summary with per-day, per-symbol and round-trip view tables
//!
//! Persisted JSON carries a `schema_version` field. Newer versions are
//! rejected on load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tradelog_core::domain::RoundTrip;
use tradelog_core::metrics::{Reconciliation, WinLoss};

use crate::report::{Report, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `Report` to pretty JSON.
pub fn export_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize Report to JSON")
}

/// Deserialize a `Report` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<Report> {
    let report: Report =
        serde_json::from_str(json).context("failed to deserialize Report from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the round-trip tape as CSV.
///
/// Columns: symbol, opened_at, closed_at, trade_date, executions,
/// gross_pnl, commissions, ecn_fees, net_pnl
pub fn export_trades_csv(trades: &[RoundTrip]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "symbol",
        "opened_at",
        "closed_at",
        "trade_date",
        "executions",
        "gross_pnl",
        "commissions",
        "ecn_fees",
        "net_pnl",
    ])?;

    for t in trades {
        wtr.write_record(&[
            t.symbol.clone(),
            t.opened_at.to_string(),
            t.closed_at.to_string(),
            t.trade_date().to_string(),
            t.execution_count.to_string(),
            format!("{:.2}", t.gross_pnl),
            format!("{:.2}", t.commissions),
            format!("{:.2}", t.ecn_fees),
            format!("{:.2}", t.net_pnl),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Paths of the files written by [`save_report`].
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub trades_csv: PathBuf,
    pub markdown: PathBuf,
}

/// Save the artifact set for a report under `output_dir`:
/// - `report.json`: the full `Report`
/// - `trades.csv`: round-trip tape
/// - `report.md`: Markdown summary
pub fn save_report(report: &Report, output_dir: &Path) -> Result<ReportPaths> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let paths = ReportPaths {
        json: output_dir.join("report.json"),
        trades_csv: output_dir.join("trades.csv"),
        markdown: output_dir.join("report.md"),
    };

    std::fs::write(&paths.json, export_json(report)?)
        .with_context(|| format!("failed to write {}", paths.json.display()))?;
    std::fs::write(&paths.trades_csv, export_trades_csv(&report.trades)?)
        .with_context(|| format!("failed to write {}", paths.trades_csv.display()))?;
    std::fs::write(&paths.markdown, generate_markdown(report))
        .with_context(|| format!("failed to write {}", paths.markdown.display()))?;

    tracing::info!(dir = %output_dir.display(), "report artifacts written");
    Ok(paths)
}

/// Load a `Report` from a directory written by [`save_report`].
pub fn load_report(dir: &Path) -> Result<Report> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report.
pub fn generate_markdown(report: &Report) -> String {
    let m = &report.metrics;
    let mut md = String::with_capacity(4096);

    md.push_str("# Trading Report\n\n");

    // Metadata
    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Source | {} |\n", report.source));
    if let (Some(first), Some(last)) = (report.first_day, report.last_day) {
        md.push_str(&format!("| Period | {} to {} |\n", first, last));
    }
    md.push_str(&format!("| Executions | {} |\n", report.execution_count));
    md.push_str(&format!("| Round Trips | {} |\n", m.closed_trades));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    md.push_str(&format!(
        "| Reconciliation | {} |\n",
        match report.reconciliation {
            Reconciliation::Matched => "matched",
            Reconciliation::SkippedOpenPositions => "skipped (open positions)",
        }
    ));
    if !report.open_symbols.is_empty() {
        md.push_str(&format!(
            "| Open Positions | **{}** |\n",
            report.open_symbols.join(", ")
        ));
    }
    md.push('\n');

    // Summary
    md.push_str("## Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Net PnL | {:.2} |\n", m.net_pnl));
    md.push_str(&format!("| Gross PnL | {:.2} |\n", m.gross_pnl));
    md.push_str(&format!("| Commissions | {:.2} |\n", m.commissions));
    md.push_str(&format!("| ECN Fees | {:.2} |\n", m.ecn_fees));
    md.push_str(&format!(
        "| Shares (Buy / Sell / Short) | {} / {} / {} |\n",
        m.shares.buy, m.shares.sell, m.shares.short
    ));
    md.push('\n');

    // Trade statistics
    md.push_str("## Trade Statistics\n\n");
    md.push_str(&format!(
        "Filtered columns ignore trades with |PnL| <= {}.\n\n",
        m.breakeven_threshold
    ));
    md.push_str("| Metric | All | Filtered |\n");
    md.push_str("| --- | --- | --- |\n");
    md.push_str(&format!(
        "| Winning Trades | {} | {} |\n",
        m.win_loss.wins, m.filtered_win_loss.wins
    ));
    md.push_str(&format!(
        "| Losing Trades | {} | {} |\n",
        m.win_loss.losses, m.filtered_win_loss.losses
    ));
    md.push_str(&format!(
        "| Accuracy | {:.2}% | {:.2}% |\n",
        m.accuracy_pct, m.filtered_accuracy_pct
    ));
    md.push_str(&format!(
        "| Avg Winner | {:.2} | {:.2} |\n",
        m.averages.avg_winner, m.filtered_averages.avg_winner
    ));
    md.push_str(&format!(
        "| Avg Loser | {:.2} | {:.2} |\n",
        m.averages.avg_loser, m.filtered_averages.avg_loser
    ));
    md.push_str(&format!(
        "| Profit Factor | {} | {} |\n",
        m.profit_factor, m.filtered_profit_factor
    ));
    md.push('\n');

    // Per day
    if !m.net_pnl_by_day.is_empty() {
        md.push_str("## Per Day\n\n");
        md.push_str(
            "| Day | Net | Gross | Cum. Net | Cum. Gross | Commissions | ECN | Shares (B / S / T) | Won | Lost |\n",
        );
        md.push_str("| --- | --- | --- | --- | --- | --- | --- | --- | --- | --- |\n");
        for (day, net) in &m.net_pnl_by_day {
            let wl = m.won_lost_by_day.get(day).copied().unwrap_or_default();
            let shares = m
                .shares_by_day
                .get(day)
                .map(|s| format!("{} / {} / {}", s.buy, s.sell, s.short))
                .unwrap_or_default();
            md.push_str(&format!(
                "| {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {} | {} | {} |\n",
                day,
                net,
                lookup(&m.gross_pnl_by_day, day),
                lookup(&m.cumulative_net_pnl_by_day, day),
                lookup(&m.cumulative_gross_pnl_by_day, day),
                lookup(&m.commissions_by_day, day),
                lookup(&m.ecn_fees_by_day, day),
                shares,
                wl.wins,
                wl.losses,
            ));
        }
        md.push('\n');
    }

    // Per symbol
    if !m.net_pnl_by_symbol.is_empty() {
        md.push_str("## Per Symbol\n\n");
        md.push_str("| Symbol | Net | Gross | Won | Lost |\n");
        md.push_str("| --- | --- | --- | --- | --- |\n");
        for (symbol, net) in &m.net_pnl_by_symbol {
            let wl: WinLoss = m
                .won_lost_by_symbol
                .get(symbol)
                .copied()
                .unwrap_or_default();
            md.push_str(&format!(
                "| {} | {:.2} | {:.2} | {} | {} |\n",
                symbol,
                net,
                lookup(&m.gross_pnl_by_symbol, symbol),
                wl.wins,
                wl.losses,
            ));
        }
        md.push('\n');
    }

    // Round-trip views
    let v = &report.views;
    if !v.by_symbol_and_day.is_empty() {
        md.push_str("## Trades per Symbol and Day\n\n");
        md.push_str("| Symbol | Day | Net |\n");
        md.push_str("| --- | --- | --- |\n");
        for (symbol, days) in &v.by_symbol_and_day {
            for (day, pnl) in days {
                md.push_str(&format!("| {} | {} | {:.2} |\n", symbol, day, pnl));
            }
        }
        md.push('\n');
    }

    if !v.by_symbol_and_time.is_empty() {
        md.push_str("## Trades per Symbol and Time\n\n");
        md.push_str("| Symbol | Closed | Net |\n");
        md.push_str("| --- | --- | --- |\n");
        for (symbol, closes) in &v.by_symbol_and_time {
            for (closed_at, pnl) in closes {
                md.push_str(&format!("| {} | {} | {:.2} |\n", symbol, closed_at, pnl));
            }
        }
        md.push('\n');
    }

    if !v.by_time.is_empty() {
        md.push_str("## Closures by Time\n\n");
        md.push_str("| Closed | Symbol | Net |\n");
        md.push_str("| --- | --- | --- |\n");
        for (closed_at, closed) in &v.by_time {
            md.push_str(&format!(
                "| {} | {} | {:.2} |\n",
                closed_at, closed.symbol, closed.pnl
            ));
        }
        md.push('\n');
    }

    if !v.by_day.is_empty() {
        md.push_str("## Trades per Day\n\n");
        md.push_str("| Day | Symbol | Net |\n");
        md.push_str("| --- | --- | --- |\n");
        for (day, trades) in &v.by_day {
            if trades.is_empty() {
                md.push_str(&format!("| {} | no closures | |\n", day));
            }
            for t in trades {
                md.push_str(&format!("| {} | {} | {:.2} |\n", day, t.symbol, t.pnl));
            }
        }
        md.push('\n');
    }

    // Round trips
    if !report.trades.is_empty() {
        md.push_str("## Round Trips\n\n");
        md.push_str("| # | Symbol | Opened | Closed | Fills | Gross | Fees | Net |\n");
        md.push_str("| --- | --- | --- | --- | --- | --- | --- | --- |\n");
        for (i, t) in report.trades.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {:.2} | {:.2} | {:.2} |\n",
                i + 1,
                t.symbol,
                t.opened_at,
                t.closed_at,
                t.execution_count,
                t.gross_pnl,
                t.commissions + t.ecn_fees,
                t.net_pnl,
            ));
        }
        md.push('\n');
    }

    md
}

fn lookup<K: Ord, V: Copy + Default>(map: &BTreeMap<K, V>, key: &K) -> V {
    map.get(key).copied().unwrap_or_default()
}

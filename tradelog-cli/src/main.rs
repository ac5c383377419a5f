//! TradeLog CLI: performance reports from broker execution exports.
//!
//! Commands:
//! - `report`: build the full report from an executions CSV
//! - `trades`: print the reconstructed round-trip tape as CSV
//! - `generate`: write a synthetic executions CSV for demos

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tradelog_core::metrics::Reconciliation;
use tradelog_report::{
    export_json, export_trades_csv, generate_markdown, generate_session, run_report,
    save_executions, save_report, Report, ReportConfig,
};

#[derive(Parser)]
#[command(
    name = "tradelog",
    about = "TradeLog CLI: round-trip reconstruction and trading performance reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full report from an executions CSV.
    Report {
        /// Executions CSV exported from the broker.
        #[arg(long)]
        input: PathBuf,

        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format printed to stdout.
        #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,

        /// Also write report.json, trades.csv and report.md here.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the round-trip tape as CSV.
    Trades {
        /// Executions CSV exported from the broker.
        #[arg(long)]
        input: PathBuf,

        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write a synthetic executions CSV.
    Generate {
        /// RNG seed; the same seed always produces the same file.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Comma-separated symbols.
        #[arg(long, value_delimiter = ',', default_value = "AAPL,MSFT,TSLA")]
        symbols: Vec<String>,

        /// Number of trading days.
        #[arg(long, default_value_t = 5)]
        days: u32,

        /// Destination CSV.
        #[arg(long)]
        output: PathBuf,

        /// Path to a TOML config file (controls row order and timestamp format).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Short plain-text summary.
    Summary,
    Markdown,
    Json,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            input,
            config,
            format,
            output_dir,
        } => run_report_cmd(&input, config.as_deref(), format, output_dir.as_deref()),
        Commands::Trades { input, config } => run_trades_cmd(&input, config.as_deref()),
        Commands::Generate {
            seed,
            symbols,
            days,
            output,
            config,
        } => run_generate_cmd(seed, symbols, days, &output, config.as_deref()),
    }
}

/// Logs go to stderr so report output on stdout stays pipeable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ReportConfig> {
    match path {
        Some(p) => ReportConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(ReportConfig::default()),
    }
}

fn run_report_cmd(
    input: &Path,
    config_path: Option<&Path>,
    format: OutputFormat,
    output_dir: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let report = run_report(input, &config)
        .with_context(|| format!("failed to build report for {}", input.display()))?;

    match format {
        OutputFormat::Summary => print_summary(&report),
        OutputFormat::Markdown => print!("{}", generate_markdown(&report)),
        OutputFormat::Json => println!("{}", export_json(&report)?),
    }

    if let Some(dir) = output_dir {
        let paths = save_report(&report, dir)?;
        eprintln!("Artifacts saved to: {}", paths.json.display());
    }

    Ok(())
}

fn run_trades_cmd(input: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let report = run_report(input, &config)
        .with_context(|| format!("failed to build report for {}", input.display()))?;
    print!("{}", export_trades_csv(&report.trades)?);
    Ok(())
}

fn run_generate_cmd(
    seed: u64,
    symbols: Vec<String>,
    days: u32,
    output: &Path,
    config_path: Option<&Path>,
) -> Result<()> {
    let symbols: Vec<String> = symbols
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    if symbols.is_empty() {
        bail!("--symbols must name at least one symbol");
    }
    if days == 0 {
        bail!("--days must be at least 1");
    }

    let config = load_config(config_path)?;
    let executions = generate_session(seed, &symbols, days);
    save_executions(output, &executions, &config.feed)
        .with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!(
        executions = executions.len(),
        path = %output.display(),
        "synthetic session written"
    );
    Ok(())
}

fn print_summary(report: &Report) {
    let m = &report.metrics;
    println!();
    println!("=== Trading Report ===");
    println!("Source:         {}", report.source);
    if let (Some(first), Some(last)) = (report.first_day, report.last_day) {
        println!("Period:         {} to {}", first, last);
    }
    println!("Executions:     {}", report.execution_count);
    println!("Round Trips:    {}", m.closed_trades);
    println!();
    println!("--- PnL ---");
    println!("Net PnL:        {:.2}", m.net_pnl);
    println!("Gross PnL:      {:.2}", m.gross_pnl);
    println!("Commissions:    {:.2}", m.commissions);
    println!("ECN Fees:       {:.2}", m.ecn_fees);
    println!();
    println!("--- Trades ---");
    println!(
        "Won / Lost:     {} / {} (filtered {} / {})",
        m.win_loss.wins, m.win_loss.losses, m.filtered_win_loss.wins, m.filtered_win_loss.losses
    );
    println!(
        "Accuracy:       {:.2}% (filtered {:.2}%)",
        m.accuracy_pct, m.filtered_accuracy_pct
    );
    println!(
        "Avg Winner:     {:.2} (filtered {:.2})",
        m.averages.avg_winner, m.filtered_averages.avg_winner
    );
    println!(
        "Avg Loser:      {:.2} (filtered {:.2})",
        m.averages.avg_loser, m.filtered_averages.avg_loser
    );
    println!(
        "Profit Factor:  {} (filtered {})",
        m.profit_factor, m.filtered_profit_factor
    );
    if report.reconciliation == Reconciliation::SkippedOpenPositions {
        println!();
        println!(
            "WARNING: positions left open: {}",
            report.open_symbols.join(", ")
        );
    }
}

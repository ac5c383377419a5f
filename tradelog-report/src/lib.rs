//! TradeLog Report: feed ingestion, configuration, report assembly and export.
//!
//! This crate builds on `tradelog-core` to provide:
//! - CSV execution feed reader/writer with cleaning and ordering checks
//! - TOML configuration with defaults matching a PropReports export
//! - Report assembly with dataset fingerprinting
//! - JSON, CSV and Markdown export
//! - Seeded synthetic sessions for demos and benchmarks

pub mod config;
pub mod export;
pub mod feed;
pub mod report;
pub mod synthetic;

pub use config::{ConfigError, FeedConfig, ReportConfig, RowOrder};
pub use export::{
    export_json, export_trades_csv, generate_markdown, import_json, load_report, save_report,
    ReportPaths,
};
pub use feed::{load_executions, read_executions, save_executions, write_executions, FeedError};
pub use report::{build_report, dataset_hash, run_report, Report, ReportError, SCHEMA_VERSION};
pub use synthetic::generate_session;

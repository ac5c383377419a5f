//! Execution feed: CSV executions export in, cleaned [`Execution`]s out.
//!
//! Expected columns (header names, any order, extras ignored):
//! `Date/Time, Symbol, B/S, Qty, Price, Comm, SEC, TAF, NSCC, CAT, Ecn Fee`.
//! The five fee columns and `Ecn Fee` may be missing or blank; both read as zero.
//!
//! Cleaning steps, in order:
//! 1. Parse each row, skipping (or rejecting) zero-quantity rows
//! 2. Reverse the rows if the file is newest-first
//! 3. Check the stream is non-decreasing in time

use crate::config::{FeedConfig, RowOrder};
use chrono::NaiveDateTime;
use csv::StringRecord;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};
use tradelog_core::domain::{Execution, FeeBreakdown, Side};

/// Column headers, in the order they are written.
pub const COLUMNS: [&str; 11] = [
    "Date/Time",
    "Symbol",
    "B/S",
    "Qty",
    "Price",
    "Comm",
    "SEC",
    "TAF",
    "NSCC",
    "CAT",
    "Ecn Fee",
];

/// Errors from reading or writing an executions file.
///
/// `line` is the 1-based line in the file, header included.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("line {line}: unknown side code '{value}' (expected B, S or T)")]
    InvalidSide { line: u64, value: String },

    #[error("line {line}: invalid {column} value '{value}'")]
    InvalidDecimal {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: invalid quantity '{value}'")]
    InvalidQuantity { line: u64, value: String },

    #[error("line {line}: zero quantity")]
    ZeroQuantity { line: u64 },

    #[error("line {line}: empty symbol")]
    EmptySymbol { line: u64 },

    #[error("line {line}: cannot parse timestamp '{value}' with format '{format}'")]
    InvalidTimestamp {
        line: u64,
        value: String,
        format: String,
    },

    #[error("line {line}: execution at {current} is earlier than the previous one at {previous}")]
    OutOfOrder {
        line: u64,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("cannot format timestamps with '{0}'")]
    InvalidDatetimeFormat(String),
}

// ─── Reading ────────────────────────────────────────────────────────

/// Header positions resolved once per file.
struct ColumnMap {
    date_time: usize,
    symbol: usize,
    side: usize,
    quantity: usize,
    price: usize,
    commission: Option<usize>,
    sec: Option<usize>,
    taf: Option<usize>,
    nscc: Option<usize>,
    cat: Option<usize>,
    ecn: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, FeedError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &'static str| find(name).ok_or(FeedError::MissingColumn(name));

        Ok(Self {
            date_time: require("Date/Time")?,
            symbol: require("Symbol")?,
            side: require("B/S")?,
            quantity: require("Qty")?,
            price: require("Price")?,
            commission: find("Comm"),
            sec: find("SEC"),
            taf: find("TAF"),
            nscc: find("NSCC"),
            cat: find("CAT"),
            ecn: find("Ecn Fee"),
        })
    }
}

/// Read executions from any CSV source, returning them oldest first.
pub fn read_executions<R: io::Read>(
    reader: R,
    config: &FeedConfig,
) -> Result<Vec<Execution>, FeedError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = ColumnMap::from_headers(rdr.headers()?)?;

    let mut rows: Vec<(u64, Execution)> = Vec::new();
    let mut skipped = 0usize;
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let line = i as u64 + 2;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        match parse_row(&record, &columns, line, config)? {
            Some(execution) => rows.push((line, execution)),
            None => skipped += 1,
        }
    }

    if config.row_order == RowOrder::NewestFirst {
        rows.reverse();
    }
    check_chronological(&rows)?;

    info!(executions = rows.len(), skipped, "loaded execution feed");
    Ok(rows.into_iter().map(|(_, execution)| execution).collect())
}

/// Read executions from a file on disk.
pub fn load_executions(path: &Path, config: &FeedConfig) -> Result<Vec<Execution>, FeedError> {
    let file = File::open(path).map_err(|source| FeedError::Open {
        path: path.display().to_string(),
        source,
    })?;
    read_executions(BufReader::new(file), config)
}

fn parse_row(
    record: &StringRecord,
    columns: &ColumnMap,
    line: u64,
    config: &FeedConfig,
) -> Result<Option<Execution>, FeedError> {
    let symbol = field(record, columns.symbol);
    if symbol.is_empty() {
        return Err(FeedError::EmptySymbol { line });
    }

    let quantity = parse_quantity(field(record, columns.quantity), line)?;
    if quantity == 0 {
        if config.skip_zero_quantity {
            warn!(line, symbol, "skipping zero-quantity execution");
            return Ok(None);
        }
        return Err(FeedError::ZeroQuantity { line });
    }

    let side_raw = field(record, columns.side);
    let side = Side::from_code(side_raw).ok_or_else(|| FeedError::InvalidSide {
        line,
        value: side_raw.to_string(),
    })?;

    let ts_raw = field(record, columns.date_time);
    let executed_at =
        NaiveDateTime::parse_from_str(ts_raw, &config.datetime_format).map_err(|_| {
            FeedError::InvalidTimestamp {
                line,
                value: ts_raw.to_string(),
                format: config.datetime_format.clone(),
            }
        })?;

    let price = parse_decimal(field(record, columns.price), "Price", line)?;
    let fees = FeeBreakdown {
        commission: parse_fee(record, columns.commission, "Comm", line)?,
        sec: parse_fee(record, columns.sec, "SEC", line)?,
        taf: parse_fee(record, columns.taf, "TAF", line)?,
        nscc: parse_fee(record, columns.nscc, "NSCC", line)?,
        cat: parse_fee(record, columns.cat, "CAT", line)?,
        ecn: parse_fee(record, columns.ecn, "Ecn Fee", line)?,
    };

    Ok(Some(
        Execution::new(symbol, side, quantity, price, executed_at).with_fees(fees),
    ))
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("").trim()
}

fn parse_decimal(raw: &str, column: &'static str, line: u64) -> Result<Decimal, FeedError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| FeedError::InvalidDecimal {
            line,
            column,
            value: raw.to_string(),
        })
}

/// Missing column or blank cell reads as zero.
fn parse_fee(
    record: &StringRecord,
    idx: Option<usize>,
    column: &'static str,
    line: u64,
) -> Result<Decimal, FeedError> {
    match idx.map(|i| field(record, i)) {
        None | Some("") => Ok(Decimal::ZERO),
        Some(raw) => parse_decimal(raw, column, line),
    }
}

/// Whole share counts up to [`Execution::MAX_QUANTITY`]; spreadsheet exports
/// sometimes write `100.0`.
fn parse_quantity(raw: &str, line: u64) -> Result<u64, FeedError> {
    let invalid = || FeedError::InvalidQuantity {
        line,
        value: raw.to_string(),
    };
    let quantity = match raw.parse::<u64>() {
        Ok(q) => q,
        Err(_) => {
            let value = Decimal::from_str(raw).map_err(|_| invalid())?;
            if value.fract() != Decimal::ZERO {
                return Err(invalid());
            }
            value.to_u64().ok_or_else(invalid)?
        }
    };
    if quantity > Execution::MAX_QUANTITY {
        return Err(invalid());
    }
    Ok(quantity)
}

fn check_chronological(rows: &[(u64, Execution)]) -> Result<(), FeedError> {
    for pair in rows.windows(2) {
        let (_, prev) = &pair[0];
        let (line, next) = &pair[1];
        if next.executed_at < prev.executed_at {
            return Err(FeedError::OutOfOrder {
                line: *line,
                previous: prev.executed_at,
                current: next.executed_at,
            });
        }
    }
    Ok(())
}

// ─── Writing ────────────────────────────────────────────────────────

/// Write executions in the same layout the reader accepts.
///
/// `executions` must be oldest first; rows are reversed for a newest-first config.
pub fn write_executions<W: io::Write>(
    writer: W,
    executions: &[Execution],
    config: &FeedConfig,
) -> Result<(), FeedError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(COLUMNS)?;

    let mut ordered: Vec<&Execution> = executions.iter().collect();
    if config.row_order == RowOrder::NewestFirst {
        ordered.reverse();
    }

    for e in ordered {
        let mut timestamp = String::new();
        write!(timestamp, "{}", e.executed_at.format(&config.datetime_format))
            .map_err(|_| FeedError::InvalidDatetimeFormat(config.datetime_format.clone()))?;
        wtr.write_record(&[
            timestamp,
            e.symbol.clone(),
            e.side.code().to_string(),
            e.quantity.to_string(),
            e.price.to_string(),
            e.fees.commission.to_string(),
            e.fees.sec.to_string(),
            e.fees.taf.to_string(),
            e.fees.nscc.to_string(),
            e.fees.cat.to_string(),
            e.fees.ecn.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write executions to a file on disk.
pub fn save_executions(
    path: &Path,
    executions: &[Execution],
    config: &FeedConfig,
) -> Result<(), FeedError> {
    let file = File::create(path).map_err(|source| FeedError::Open {
        path: path.display().to_string(),
        source,
    })?;
    write_executions(BufWriter::new(file), executions, config)
}

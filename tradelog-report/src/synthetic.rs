//! Synthetic execution sessions for demos and benchmarks.
//!
//! Produces a seeded random stream of intraday round trips. Every position
//! opens and closes on the same weekday, so the output always passes the
//! share-balance checks. These are clearly fake and should never be mixed
//! with real executions.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tradelog_core::domain::{Execution, FeeBreakdown, Side};

/// First calendar day of every generated session (a Monday).
pub fn session_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).unwrap_or_default()
}

const COMMISSION_PER_SHARE: Decimal = Decimal::from_parts(35, 0, 0, false, 4);
const ECN_PER_SHARE: Decimal = Decimal::from_parts(30, 0, 0, false, 4);

/// Generate `days` trading days of executions for `symbols`.
///
/// Weekends are skipped. The same seed always yields the same stream,
/// sorted by time.
pub fn generate_session<S: AsRef<str>>(seed: u64, symbols: &[S], days: u32) -> Vec<Execution> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut prices: Vec<i64> = symbols
        .iter()
        .map(|_| rng.gen_range(500..20_000))
        .collect();

    let mut executions = Vec::new();
    for day in trading_days(days) {
        let mut session: Vec<Execution> = Vec::new();
        for (symbol, price_cents) in symbols.iter().zip(prices.iter_mut()) {
            session.extend(symbol_day(&mut rng, symbol.as_ref(), day, price_cents));
        }
        // Stable: a symbol's own fills keep their order on timestamp ties.
        session.sort_by_key(|e| e.executed_at);
        executions.extend(session);
    }
    executions
}

fn trading_days(count: u32) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(count as usize);
    let mut current = session_start();
    while out.len() < count as usize {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(current);
        }
        current += Duration::days(1);
    }
    out
}

/// One to three round trips for one symbol, starting at the open.
fn symbol_day(
    rng: &mut StdRng,
    symbol: &str,
    day: NaiveDate,
    price_cents: &mut i64,
) -> Vec<Execution> {
    let open = NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default();
    let mut clock: NaiveDateTime = day.and_time(open);
    let mut fills = Vec::new();

    for _ in 0..rng.gen_range(1..=3) {
        let long = rng.gen_bool(0.5);
        let (open_side, close_side) = if long {
            (Side::Buy, Side::Sell)
        } else {
            (Side::Short, Side::Buy)
        };

        let opens: Vec<u64> = (0..rng.gen_range(1..=3))
            .map(|_| rng.gen_range(1..=10u64) * 10)
            .collect();
        let size: u64 = opens.iter().sum();
        let pieces = rng.gen_range(1..=3u64);
        let closes = split(rng, size, pieces);

        for (side, qty) in opens
            .into_iter()
            .map(|q| (open_side, q))
            .chain(closes.into_iter().map(|q| (close_side, q)))
        {
            clock += Duration::seconds(rng.gen_range(1..=300));
            *price_cents = (*price_cents + rng.gen_range(-50..=50)).max(100);
            fills.push(fill(rng, symbol, side, qty, *price_cents, clock));
        }
    }
    fills
}

/// Split `total` into `parts` positive pieces (fewer if `total` is too small).
fn split(rng: &mut StdRng, total: u64, parts: u64) -> Vec<u64> {
    let parts = parts.clamp(1, total.max(1));
    let mut remaining = total;
    let mut out = Vec::with_capacity(parts as usize);
    for left in (1..parts).rev() {
        let piece = rng.gen_range(1..=remaining - left);
        out.push(piece);
        remaining -= piece;
    }
    out.push(remaining);
    out
}

fn fill(
    rng: &mut StdRng,
    symbol: &str,
    side: Side,
    quantity: u64,
    price_cents: i64,
    at: NaiveDateTime,
) -> Execution {
    let shares = Decimal::from(quantity);
    let commission = (shares * COMMISSION_PER_SHARE).round_dp(2);
    // Roughly a third of fills add liquidity and earn a rebate.
    let ecn = if rng.gen_bool(0.35) {
        -(shares * ECN_PER_SHARE * Decimal::new(2, 1)).round_dp(3)
    } else {
        (shares * ECN_PER_SHARE).round_dp(3)
    };

    Execution::new(symbol, side, quantity, Decimal::new(price_cents, 2), at).with_fees(
        FeeBreakdown {
            commission,
            ecn,
            ..FeeBreakdown::default()
        },
    )
}

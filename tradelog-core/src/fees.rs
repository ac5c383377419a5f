//! Fee model: splits an execution's fees into commission and ECN components.
//!
//! Commission is the sum of the five cost fields and is always subtracted.
//! The ECN component is returned with its sign intact so callers subtract it
//! as-is: a rebate (negative) adds to PnL, a fee (positive) takes from it.
//! Fields the feed left empty arrive here as zero.

use crate::domain::Execution;
use rust_decimal::Decimal;

/// `(commission, ecn_fee)` for one execution.
pub fn commission_and_ecn(execution: &Execution) -> (Decimal, Decimal) {
    (execution.fees.commission_total(), execution.fees.ecn)
}

/// Total cost charged against PnL for one execution.
pub fn total_cost(execution: &Execution) -> Decimal {
    let (commission, ecn) = commission_and_ecn(execution);
    commission + ecn
}

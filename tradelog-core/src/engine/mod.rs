//! Reconstruction engine: execution stream in, closed round trips out.
//!
//! 1. [`position`]: per-symbol state machine that detects closures
//! 2. [`reconstruct`]: drives the tracker once and projects the index views

pub mod position;
pub mod reconstruct;

pub use position::{PositionState, PositionStatus, PositionTracker};
pub use reconstruct::{RoundTripBook, TradeViews};

//! Pure reconstruction engines: fill normalization, position netting, and
//! income-to-equity aggregation. No I/O and no suspension points; all state
//! lives on the stack of a single call.

pub mod income;
pub mod netting;
pub mod normalizer;

pub use income::aggregate_income;
pub use netting::{net_symbol_fills, NetState, PositionNetter};
pub use normalizer::normalize_fills;

/// Round to a fixed number of decimal places. Applied only at emission time;
/// intermediate accumulation stays unrounded.
pub(crate) fn round_dp(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

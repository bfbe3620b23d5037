//! Equity curve samples reconstructed from the account income ledger.

use crate::domain::TimeMs;
use serde::{Deserialize, Serialize};

/// One sample of the account equity curve.
///
/// Invariant: `balance[i] = balance[i-1] + change[i]`, with the starting
/// baseline standing in for `balance[-1]` on the first point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDataPoint {
    pub timestamp: TimeMs,
    /// Cumulative account balance.
    pub balance: f64,
    /// Cumulative realized pnl since the start of the window.
    pub realized_pnl: f64,
    /// Unrealized pnl carried forward (not reconstructed from income events).
    pub unrealized_pnl: f64,
    /// Delta versus the previous point's balance.
    pub change: f64,
}

//! Account income ledger entries used to reconstruct the equity curve.

use crate::domain::{Symbol, TimeMs};
use serde::{Deserialize, Serialize};

/// Classification of an income ledger entry.
///
/// Only `RealizedPnl` and `FundingFee` move the reconstructed balance; other
/// kinds are carried through untouched so callers can still see them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeKind {
    RealizedPnl,
    FundingFee,
    Commission,
    Other(String),
}

impl IncomeKind {
    /// Parse the exchange wire string (e.g., "REALIZED_PNL").
    pub fn from_wire(s: &str) -> Self {
        match s {
            "REALIZED_PNL" => IncomeKind::RealizedPnl,
            "FUNDING_FEE" => IncomeKind::FundingFee,
            "COMMISSION" => IncomeKind::Commission,
            other => IncomeKind::Other(other.to_string()),
        }
    }

    pub fn as_wire(&self) -> &str {
        match self {
            IncomeKind::RealizedPnl => "REALIZED_PNL",
            IncomeKind::FundingFee => "FUNDING_FEE",
            IncomeKind::Commission => "COMMISSION",
            IncomeKind::Other(s) => s,
        }
    }
}

/// One account ledger entry (realized pnl, funding fee, commission, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeEvent {
    /// Time of the ledger entry in milliseconds since Unix epoch.
    pub time: TimeMs,
    /// Entry classification.
    pub kind: IncomeKind,
    /// Signed amount in the account's margin currency.
    pub amount: f64,
    /// Instrument the entry relates to, when the exchange reports one.
    pub symbol: Option<Symbol>,
}

//! Reconstructed position records and the detail view built on top of them.

use crate::domain::{Fill, Symbol, TimeMs};
use serde::{Deserialize, Serialize};

/// Direction of a net exposure episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// Lifecycle state of a position record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// The reconstructed lifecycle of one net exposure episode on one symbol.
///
/// Closed records never mutate after emission. `exit_price`, `close_time`,
/// `pnl` and `roe` are absent while the record is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    pub id: String,
    pub symbol: Symbol,
    pub side: PositionSide,
    /// Closed or resting quantity, always > 0.
    pub size: f64,
    /// Weighted average cost of the exposure, rounded to 6 decimal places.
    pub entry_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<f64>,
    pub open_time: TimeMs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_time: Option<TimeMs>,
    /// Realized pnl of the closed slice, rounded to 4 decimal places.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl: Option<f64>,
    /// Return on the closed quantity's cost basis, percent, 2 decimal places.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roe: Option<f64>,
    pub status: PositionStatus,
    /// Constituent fills in execution order.
    pub trades: Vec<Fill>,
}

impl PositionRecord {
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    pub fn is_closed(&self) -> bool {
        self.status == PositionStatus::Closed
    }
}

/// One mark-to-market sample for the position detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PnlHistoryPoint {
    pub timestamp: TimeMs,
    pub price: f64,
    pub pnl: f64,
}

/// A position record enriched for the detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDetail {
    #[serde(flatten)]
    pub record: PositionRecord,
    pub pnl_history: Vec<PnlHistoryPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
}

/// Filter over a loaded position list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    /// Case-insensitive substring match on the symbol.
    pub symbol: Option<String>,
    pub side: Option<PositionSide>,
    /// `None` means all statuses.
    pub status: Option<PositionStatus>,
    /// Inclusive lower bound on open time.
    pub start_time: Option<TimeMs>,
    /// Inclusive upper bound on open time.
    pub end_time: Option<TimeMs>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: PositionStatus) -> PositionRecord {
        PositionRecord {
            id: "pos_BTCUSDT_1000".to_string(),
            symbol: Symbol::new("BTCUSDT"),
            side: PositionSide::Long,
            size: 1.0,
            entry_price: 100.0,
            exit_price: (status == PositionStatus::Closed).then_some(110.0),
            open_time: TimeMs::new(1000),
            close_time: (status == PositionStatus::Closed).then(|| TimeMs::new(2000)),
            pnl: (status == PositionStatus::Closed).then_some(10.0),
            roe: (status == PositionStatus::Closed).then_some(10.0),
            status,
            trades: vec![],
        }
    }

    #[test]
    fn test_status_helpers() {
        assert!(record(PositionStatus::Open).is_open());
        assert!(record(PositionStatus::Closed).is_closed());
    }

    #[test]
    fn test_open_record_omits_exit_fields() {
        let json = serde_json::to_value(record(PositionStatus::Open)).unwrap();
        assert!(json.get("exitPrice").is_none());
        assert!(json.get("closeTime").is_none());
        assert!(json.get("pnl").is_none());
        assert!(json.get("roe").is_none());
        assert_eq!(json["status"], "OPEN");
    }

    #[test]
    fn test_closed_record_serializes_exit_fields() {
        let json = serde_json::to_value(record(PositionStatus::Closed)).unwrap();
        assert_eq!(json["exitPrice"], 110.0);
        assert_eq!(json["side"], "LONG");
        assert_eq!(json["status"], "CLOSED");
    }
}

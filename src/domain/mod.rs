//! Domain types for the portfolio reconstruction engine.
//!
//! This module provides:
//! - Domain primitives: TimeMs, Symbol, Side, TimeDimension
//! - Fill and IncomeEvent inputs in canonical signed-quantity form
//! - PositionRecord / AssetDataPoint reconstruction outputs

pub mod account;
pub mod equity;
pub mod fill;
pub mod income;
pub mod position;
pub mod primitives;

pub use account::AccountSnapshot;
pub use equity::AssetDataPoint;
pub use fill::Fill;
pub use income::{IncomeEvent, IncomeKind};
pub use position::{
    FilterOptions, PnlHistoryPoint, PositionDetail, PositionRecord, PositionSide, PositionStatus,
};
pub use primitives::{Side, Symbol, TimeDimension, TimeMs};

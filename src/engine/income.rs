//! Income-to-equity aggregation.
//!
//! Folds account income events into a cumulative equity curve: realized pnl
//! moves both the running balance and the realized total, funding fees move
//! the balance only, and every consumed event emits a point so other income
//! kinds pass through with an unchanged balance.

use crate::domain::{AssetDataPoint, IncomeEvent, IncomeKind, TimeDimension};

use super::round_dp;

/// Aggregate income events into an equity time series.
///
/// Events are sorted ascending by time and consumed up to the dimension's
/// point cap (24 for a day window, 30 for a month, 365 for a year). Balances
/// are emitted at 2 decimal places; `change` is the delta versus the previous
/// emitted balance, measured against `starting_balance` for the first point.
pub fn aggregate_income(
    events: &[IncomeEvent],
    dimension: TimeDimension,
    starting_balance: f64,
) -> Vec<AssetDataPoint> {
    let mut ordered: Vec<&IncomeEvent> = events.iter().collect();
    ordered.sort_by_key(|event| event.time);
    ordered.truncate(dimension.point_cap());

    let mut balance = starting_balance;
    let mut total_realized_pnl = 0.0;
    let unrealized_pnl = 0.0; // not reconstructable from income events
    let mut points: Vec<AssetDataPoint> = Vec::with_capacity(ordered.len());

    for event in ordered {
        match event.kind {
            IncomeKind::RealizedPnl => {
                total_realized_pnl += event.amount;
                balance += event.amount;
            }
            IncomeKind::FundingFee => {
                balance += event.amount;
            }
            // Other kinds pass through without moving the balance.
            _ => {}
        }

        let emitted_balance = round_dp(balance, 2);
        let previous_balance = points
            .last()
            .map(|point| point.balance)
            .unwrap_or(starting_balance);

        points.push(AssetDataPoint {
            timestamp: event.time,
            balance: emitted_balance,
            realized_pnl: round_dp(total_realized_pnl, 2),
            unrealized_pnl,
            change: round_dp(emitted_balance - previous_balance, 2),
        });
    }

    points
}

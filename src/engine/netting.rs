//! Position netting state machine.
//!
//! Consumes one symbol's fills in ascending time order and emits immutable
//! position records: one per closed slice (partial close, full close, or the
//! matched leg of a reversal) plus at most one open record for the resting
//! exposure at end of input. Cost basis is weighted-average, not lot-level
//! FIFO.

use crate::domain::{Fill, PositionRecord, PositionSide, PositionStatus, Symbol, TimeMs};

use super::round_dp;

/// Quantities closer than this are considered equal when deciding between a
/// full close and a reversal, so float noise never produces a zero-size
/// reopened position.
const QTY_EPSILON: f64 = 1e-9;

/// Netting state for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum NetState {
    /// No exposure.
    Flat,
    /// A single-direction exposure accumulated from one or more fills.
    Open {
        /// Signed net quantity; positive = long, negative = short. Never zero.
        net_qty: f64,
        /// Unrounded cost of the held exposure. Always >= 0.
        total_cost: f64,
        /// Time the episode opened; survives partial closes.
        open_time: TimeMs,
        /// Fills accumulated into the current exposure, in order.
        fills: Vec<Fill>,
    },
}

/// State machine that nets one symbol's fills into position records.
#[derive(Debug)]
pub struct PositionNetter {
    symbol: Symbol,
    state: NetState,
    records: Vec<PositionRecord>,
}

impl PositionNetter {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            state: NetState::Flat,
            records: Vec::new(),
        }
    }

    pub fn state(&self) -> &NetState {
        &self.state
    }

    /// Process a single fill. Fills must arrive in ascending time order;
    /// use [`normalize_fills`](super::normalize_fills) first.
    pub fn process_fill(&mut self, fill: Fill) {
        let directed = fill.directed_qty();

        match std::mem::replace(&mut self.state, NetState::Flat) {
            NetState::Flat => {
                self.state = NetState::Open {
                    net_qty: directed,
                    total_cost: fill.notional(),
                    open_time: fill.timestamp,
                    fills: vec![fill],
                };
            }
            NetState::Open {
                net_qty,
                total_cost,
                open_time,
                mut fills,
            } => {
                if net_qty.signum() == directed.signum() {
                    // Add: accumulate cost, no emission.
                    fills.push(fill.clone());
                    self.state = NetState::Open {
                        net_qty: net_qty + directed,
                        total_cost: total_cost + fill.notional(),
                        open_time,
                        fills,
                    };
                } else {
                    self.reduce(fill, net_qty, total_cost, open_time, fills);
                }
            }
        }
    }

    /// Opposing fill against an open exposure: partial close, full close, or
    /// reversal depending on the matched quantity.
    fn reduce(
        &mut self,
        fill: Fill,
        net_qty: f64,
        total_cost: f64,
        open_time: TimeMs,
        mut fills: Vec<Fill>,
    ) {
        let abs_net = net_qty.abs();
        let abs_directed = fill.directed_qty().abs();
        let avg_entry = total_cost / abs_net;
        let side = if net_qty > 0.0 {
            PositionSide::Long
        } else {
            PositionSide::Short
        };

        if abs_directed < abs_net - QTY_EPSILON {
            // Partial close: emit the closed slice, keep the episode open with
            // the same open_time (the remainder is a continuation).
            let closed_qty = abs_directed;
            let pnl = Self::closed_pnl(side, fill.price, avg_entry, closed_qty);

            let mut record_trades = fills.clone();
            record_trades.push(fill.clone());
            self.records.push(self.closed_record(
                format!(
                    "pos_{}_{}_partial_{}",
                    self.symbol,
                    open_time.as_ms(),
                    fill.timestamp.as_ms()
                ),
                side,
                closed_qty,
                avg_entry,
                &fill,
                open_time,
                pnl,
                record_trades,
            ));

            let remaining = net_qty + fill.directed_qty();
            fills.push(fill);
            self.state = NetState::Open {
                net_qty: remaining,
                // Proportional reduction keeps the cost basis at avg_entry.
                total_cost: remaining.abs() * avg_entry,
                open_time,
                fills,
            };
        } else {
            // Full close of the existing exposure; exact quantity matches are
            // a full close, never a zero-leftover reversal.
            let closed_qty = abs_net;
            let pnl = Self::closed_pnl(side, fill.price, avg_entry, closed_qty);

            let mut record_trades = fills;
            record_trades.push(fill.clone());
            self.records.push(self.closed_record(
                format!("pos_{}_{}", self.symbol, open_time.as_ms()),
                side,
                closed_qty,
                avg_entry,
                &fill,
                open_time,
                pnl,
                record_trades,
            ));

            let leftover = abs_directed - abs_net;
            if leftover > QTY_EPSILON {
                // Reversal: the same fill immediately reopens the leftover in
                // the opposite direction at the fill price.
                self.state = NetState::Open {
                    net_qty: fill.side.sign() * leftover,
                    total_cost: leftover * fill.price,
                    open_time: fill.timestamp,
                    fills: vec![fill],
                };
            }
        }
    }

    fn closed_pnl(side: PositionSide, exit_price: f64, avg_entry: f64, closed_qty: f64) -> f64 {
        match side {
            PositionSide::Long => (exit_price - avg_entry) * closed_qty,
            PositionSide::Short => (avg_entry - exit_price) * closed_qty,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn closed_record(
        &self,
        id: String,
        side: PositionSide,
        closed_qty: f64,
        avg_entry: f64,
        closing_fill: &Fill,
        open_time: TimeMs,
        pnl: f64,
        trades: Vec<Fill>,
    ) -> PositionRecord {
        let roe = pnl / (closed_qty * avg_entry) * 100.0;
        PositionRecord {
            id,
            symbol: self.symbol.clone(),
            side,
            size: closed_qty,
            entry_price: round_dp(avg_entry, 6),
            exit_price: Some(closing_fill.price),
            open_time,
            close_time: Some(closing_fill.timestamp),
            pnl: Some(round_dp(pnl, 4)),
            roe: Some(round_dp(roe, 2)),
            status: PositionStatus::Closed,
            trades,
        }
    }

    /// Finish the input stream. A resting exposure becomes one open record
    /// with no exit price, pnl, roe, or close time.
    pub fn finish(mut self) -> Vec<PositionRecord> {
        if let NetState::Open {
            net_qty,
            total_cost,
            open_time,
            fills,
        } = self.state
        {
            let size = net_qty.abs();
            self.records.push(PositionRecord {
                id: format!("pos_{}_{}_open", self.symbol, open_time.as_ms()),
                symbol: self.symbol.clone(),
                side: if net_qty > 0.0 {
                    PositionSide::Long
                } else {
                    PositionSide::Short
                },
                size,
                entry_price: round_dp(total_cost / size, 6),
                exit_price: None,
                open_time,
                close_time: None,
                pnl: None,
                roe: None,
                status: PositionStatus::Open,
                trades: fills,
            });
        }
        self.records
    }
}

/// Net one symbol's already-normalized fills into position records.
pub fn net_symbol_fills(symbol: Symbol, fills: Vec<Fill>) -> Vec<PositionRecord> {
    let mut netter = PositionNetter::new(symbol);
    for fill in fills {
        netter.process_fill(fill);
    }
    netter.finish()
}

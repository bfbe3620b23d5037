//! Synthetic fallback data generator.
//!
//! Produces schema-valid equity series and position records for demo mode and
//! for upstream failures, using the exact output types the presentation layer
//! consumes. The RNG is injectable: seed it for reproducible datasets in
//! tests, entropy-seed it in production.

use crate::domain::{
    AssetDataPoint, Fill, PnlHistoryPoint, PositionDetail, PositionRecord, PositionSide,
    PositionStatus, Side, Symbol, TimeDimension, TimeMs,
};
use crate::engine::round_dp;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Management fee model for synthetic fills: 0.04% of notional.
const SYNTHETIC_FEE_RATE: f64 = 0.0004;

const SYNTHETIC_SYMBOLS: [&str; 5] =
    ["BTCUSDT", "ETHUSDT", "ADAUSDT", "DOTUSDT", "LINKUSDT"];

/// Generator of schema-compatible random datasets.
#[derive(Debug)]
pub struct SyntheticGenerator {
    rng: StdRng,
    reference_time: Option<TimeMs>,
}

impl SyntheticGenerator {
    /// Seeded generator; identical seeds produce identical value sequences.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            reference_time: None,
        }
    }

    /// Entropy-seeded generator for production fallback data.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            reference_time: None,
        }
    }

    /// Pin the "now" timestamps are anchored to, making seeded output fully
    /// deterministic. Without it the wall clock is sampled per dataset.
    pub fn with_reference_time(mut self, now: TimeMs) -> Self {
        self.reference_time = Some(now);
        self
    }

    fn now(&self) -> TimeMs {
        self.reference_time.unwrap_or_else(TimeMs::now)
    }

    /// A plausible equity curve: one point per day over the dimension's
    /// window, mild upward drift, `change` consistent with `balance`.
    pub fn asset_series(
        &mut self,
        dimension: TimeDimension,
        starting_balance: f64,
    ) -> Vec<AssetDataPoint> {
        let days = dimension.days();
        let now = self.now().as_ms();
        let mut points = Vec::with_capacity(days as usize + 1);

        let mut balance = round_dp(starting_balance, 2);
        let mut realized_pnl = 0.0;

        for i in (0..=days).rev() {
            let timestamp = TimeMs::new(now - i * DAY_MS);
            let step_pnl = (self.rng.gen::<f64>() - 0.4) * 500.0;
            let funding = (self.rng.gen::<f64>() - 0.5) * 20.0;
            realized_pnl += step_pnl;

            let next_balance = round_dp(balance + step_pnl + funding, 2);
            let change = if points.is_empty() {
                0.0
            } else {
                round_dp(next_balance - balance, 2)
            };
            if !points.is_empty() {
                balance = next_balance;
            }

            points.push(AssetDataPoint {
                timestamp,
                balance,
                realized_pnl: round_dp(realized_pnl, 2),
                unrealized_pnl: round_dp((self.rng.gen::<f64>() - 0.5) * 300.0, 2),
                change,
            });
        }

        points
    }

    /// A plausible position list: one record per demo symbol, mixed open and
    /// closed, sorted by open time descending like the real reconstruction.
    pub fn positions(&mut self) -> Vec<PositionRecord> {
        let now = self.now().as_ms();
        let mut records: Vec<PositionRecord> = SYNTHETIC_SYMBOLS
            .iter()
            .enumerate()
            .map(|(index, symbol)| {
                let side = if self.rng.gen_bool(0.5) {
                    PositionSide::Long
                } else {
                    PositionSide::Short
                };
                let entry_price = 40000.0 + self.rng.gen::<f64>() * 20000.0;
                let size = self.rng.gen::<f64>() * 0.1 + 0.01;
                let open_time = now - (self.rng.gen::<f64>() * 30.0 * DAY_MS as f64) as i64;
                let closed = self.rng.gen_bool(0.7);

                let (exit_price, close_time, pnl, roe, status) = if closed {
                    let exit = entry_price + (self.rng.gen::<f64>() - 0.5) * 2000.0;
                    let direction = match side {
                        PositionSide::Long => 1.0,
                        PositionSide::Short => -1.0,
                    };
                    let pnl = (exit - entry_price) * size * direction;
                    let roe = pnl / (size * entry_price) * 100.0;
                    (
                        Some(exit),
                        Some(TimeMs::new(
                            open_time + (self.rng.gen::<f64>() * DAY_MS as f64) as i64,
                        )),
                        Some(round_dp(pnl, 4)),
                        Some(round_dp(roe, 2)),
                        PositionStatus::Closed,
                    )
                } else {
                    (None, None, None, None, PositionStatus::Open)
                };

                PositionRecord {
                    id: format!("pos_{}", index + 1),
                    symbol: Symbol::new(*symbol),
                    side,
                    size,
                    entry_price: round_dp(entry_price, 6),
                    exit_price,
                    open_time: TimeMs::new(open_time),
                    close_time,
                    pnl,
                    roe,
                    status,
                    trades: Vec::new(),
                }
            })
            .collect();

        records.sort_by_key(|record| std::cmp::Reverse(record.open_time));
        records
    }

    /// Plausible constituent fills for a position that has none recorded.
    pub fn trades_for(&mut self, record: &PositionRecord) -> Vec<Fill> {
        let count = self.rng.gen_range(1..=5);
        (0..count)
            .map(|i| {
                let quantity = record.size / count as f64;
                let price = record.entry_price + (self.rng.gen::<f64>() - 0.5) * 100.0;
                Fill {
                    id: format!("trade_{}_{}", record.id, i),
                    symbol: record.symbol.clone(),
                    order_id: format!("order_{}_{}", record.id, i),
                    side: if self.rng.gen_bool(0.5) {
                        Side::Buy
                    } else {
                        Side::Sell
                    },
                    quantity,
                    price,
                    fee: quantity * record.entry_price * SYNTHETIC_FEE_RATE,
                    timestamp: TimeMs::new(record.open_time.as_ms() + i as i64 * 60_000),
                    is_maker: self.rng.gen_bool(0.5),
                }
            })
            .collect()
    }

    /// Mark-to-market pnl samples between open and close (or a trailing day
    /// for open positions), at most 50 points, one per five minutes.
    pub fn pnl_history(&mut self, record: &PositionRecord) -> Vec<PnlHistoryPoint> {
        let duration = record
            .close_time
            .map(|close| close.as_ms() - record.open_time.as_ms())
            .unwrap_or(DAY_MS)
            .max(1);
        let points = (duration / (5 * 60 * 1000)).min(50).max(1);
        let direction = match record.side {
            PositionSide::Long => 1.0,
            PositionSide::Short => -1.0,
        };

        (0..=points)
            .map(|i| {
                let timestamp = TimeMs::new(record.open_time.as_ms() + duration / points * i);
                let price = record.entry_price + (self.rng.gen::<f64>() - 0.5) * 1000.0;
                let pnl = (price - record.entry_price) * record.size * direction;
                PnlHistoryPoint {
                    timestamp,
                    price,
                    pnl,
                }
            })
            .collect()
    }

    /// Enrich a record into the detail view with synthetic history and
    /// occasional protective levels.
    pub fn detail_for(&mut self, record: &PositionRecord) -> PositionDetail {
        let mut record = record.clone();
        if record.trades.is_empty() {
            record.trades = self.trades_for(&record);
        }
        let pnl_history = self.pnl_history(&record);
        let (stop_loss, take_profit) = match record.side {
            _ if !self.rng.gen_bool(0.3) => (None, None),
            PositionSide::Long => {
                (Some(record.entry_price * 0.95), Some(record.entry_price * 1.1))
            }
            PositionSide::Short => {
                (Some(record.entry_price * 1.05), Some(record.entry_price * 0.9))
            }
        };

        PositionDetail {
            record,
            pnl_history,
            stop_loss,
            take_profit,
        }
    }
}

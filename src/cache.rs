//! In-memory, process-lifetime cache of reconstructed datasets with TTL
//! freshness tracking. Keys are typed so unrelated queries never collide.

use crate::domain::{AssetDataPoint, PositionRecord, TimeDimension};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default maximum age before a cached dataset is considered stale.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Discriminated cache key: dataset kind plus query dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Equity series for one time dimension.
    Equity(TimeDimension),
    /// The full reconstructed position list.
    Positions,
}

impl std::fmt::Display for CacheKey {
    /// Wire format of the key: `asset_{dimension}` / `positions_all`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Equity(dimension) => write!(f, "asset_{}", dimension),
            CacheKey::Positions => write!(f, "positions_all"),
        }
    }
}

/// Keyed store of derived datasets with per-key last-update tracking.
#[derive(Debug, Default)]
pub struct DataCache {
    equity: HashMap<CacheKey, Vec<AssetDataPoint>>,
    positions: HashMap<CacheKey, Vec<PositionRecord>>,
    last_update: HashMap<CacheKey, Instant>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the dataset under `key` exists and is younger than `max_age`.
    pub fn is_fresh(&self, key: CacheKey, max_age: Duration) -> bool {
        self.last_update
            .get(&key)
            .map(|updated| updated.elapsed() < max_age)
            .unwrap_or(false)
    }

    pub fn get_equity(&self, dimension: TimeDimension) -> Option<&Vec<AssetDataPoint>> {
        self.equity.get(&CacheKey::Equity(dimension))
    }

    pub fn put_equity(&mut self, dimension: TimeDimension, data: Vec<AssetDataPoint>) {
        let key = CacheKey::Equity(dimension);
        self.equity.insert(key, data);
        self.last_update.insert(key, Instant::now());
    }

    pub fn get_positions(&self) -> Option<&Vec<PositionRecord>> {
        self.positions.get(&CacheKey::Positions)
    }

    pub fn put_positions(&mut self, data: Vec<PositionRecord>) {
        self.positions.insert(CacheKey::Positions, data);
        self.last_update.insert(CacheKey::Positions, Instant::now());
    }

    /// Drop every cached dataset. Called when the upstream account identity
    /// changes so another account's data is never served.
    pub fn invalidate_all(&mut self) {
        self.equity.clear();
        self.positions.clear();
        self.last_update.clear();
    }
}

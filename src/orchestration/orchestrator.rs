use crate::cache::{CacheKey, DataCache};
use crate::config::Config;
use crate::datasource::{IncomeQuery, MarketDataSource};
use crate::domain::{
    AssetDataPoint, Fill, FilterOptions, PositionDetail, PositionRecord, Symbol, TimeDimension,
    TimeMs,
};
use crate::engine::{aggregate_income, net_symbol_fills, normalize_fills};
use crate::synthetic::SyntheticGenerator;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Cumulative pnl of the currently loaded equity series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PnlSummary {
    pub realized: f64,
    pub unrealized: f64,
}

/// Owns the cache, the currently loaded datasets, and the error state;
/// sequences every public query. Built from an immutable [`Config`] — a
/// configuration change builds a fresh instance instead of mutating this one.
pub struct Orchestrator {
    config: Config,
    datasource: Option<Arc<dyn MarketDataSource>>,
    cache: DataCache,
    generator: SyntheticGenerator,
    equity: Vec<AssetDataPoint>,
    positions: Vec<PositionRecord>,
    last_error: Option<String>,
}

impl Orchestrator {
    pub fn new(config: Config, datasource: Option<Arc<dyn MarketDataSource>>) -> Self {
        let generator = match config.synthetic_seed {
            Some(seed) => SyntheticGenerator::from_seed(seed),
            None => SyntheticGenerator::from_entropy(),
        };
        Self {
            config,
            datasource,
            cache: DataCache::new(),
            generator,
            equity: Vec::new(),
            positions: Vec::new(),
            last_error: None,
        }
    }

    /// Whether an exchange collaborator is bound (false = demo mode).
    pub fn is_configured(&self) -> bool {
        self.datasource.is_some()
    }

    /// Message from the most recent collaborator failure, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Load the equity curve for one time dimension.
    ///
    /// Serves the cached series when it is fresh and `use_cache` allows it;
    /// otherwise fetches income history, aggregates it, and caches the
    /// result. Falls back to synthetic data in demo mode, on an empty income
    /// history, and on collaborator failure — only the failure records an
    /// error state.
    pub async fn load_equity_series(
        &mut self,
        dimension: TimeDimension,
        use_cache: bool,
    ) -> Vec<AssetDataPoint> {
        let key = CacheKey::Equity(dimension);
        if use_cache && self.cache.is_fresh(key, self.config.cache_ttl) {
            if let Some(cached) = self.cache.get_equity(dimension) {
                debug!("serving {} from cache", key);
                self.equity = cached.clone();
                return self.equity.clone();
            }
        }

        let Some(datasource) = self.datasource.clone() else {
            info!("no market-data client configured; serving synthetic equity data");
            return self.fallback_equity(dimension);
        };

        let end_time = TimeMs::now();
        let start_time = TimeMs::new(end_time.as_ms() - dimension.days() * DAY_MS);
        let query = IncomeQuery {
            start_time: Some(start_time),
            end_time: Some(end_time),
            limit: Some(1000),
            ..Default::default()
        };

        match datasource.income_history(query).await {
            Ok(events) if events.is_empty() => {
                // Legitimately flat account, not a failure.
                info!("income history is empty; serving synthetic equity data");
                self.last_error = None;
                self.fallback_equity(dimension)
            }
            Ok(events) => {
                let data = aggregate_income(&events, dimension, self.config.starting_balance);
                info!("aggregated {} income events into {} equity points", events.len(), data.len());
                self.last_error = None;
                self.cache.put_equity(dimension, data.clone());
                self.equity = data.clone();
                data
            }
            Err(e) => {
                error!("failed to load income history: {}", e);
                self.last_error = Some(e.to_string());
                self.fallback_equity(dimension)
            }
        }
    }

    /// Load the full reconstructed position list, newest episode first.
    pub async fn load_positions(&mut self, use_cache: bool) -> Vec<PositionRecord> {
        if use_cache && self.cache.is_fresh(CacheKey::Positions, self.config.cache_ttl) {
            if let Some(cached) = self.cache.get_positions() {
                debug!("serving {} from cache", CacheKey::Positions);
                self.positions = cached.clone();
                return self.positions.clone();
            }
        }

        let Some(datasource) = self.datasource.clone() else {
            info!("no market-data client configured; serving synthetic positions");
            return self.fallback_positions();
        };

        let fills = match datasource.all_user_trades().await {
            Ok(fills) => fills,
            Err(e) => {
                error!("failed to load user trades: {}", e);
                self.last_error = Some(e.to_string());
                return self.fallback_positions();
            }
        };

        if fills.is_empty() {
            info!("no trades returned; serving synthetic positions");
            self.last_error = None;
            return self.fallback_positions();
        }

        let mut records = Vec::new();
        for (symbol, symbol_fills) in group_by_symbol(fills) {
            let normalized = normalize_fills(symbol_fills);
            debug!("netting {} fills for {}", normalized.len(), symbol);
            records.extend(net_symbol_fills(symbol, normalized));
        }

        if records.is_empty() {
            // Every fill was malformed; nothing reconstructable.
            info!("no positions reconstructed; serving synthetic positions");
            self.last_error = None;
            return self.fallback_positions();
        }

        records.sort_by_key(|record| std::cmp::Reverse(record.open_time));
        self.last_error = None;
        self.cache.put_positions(records.clone());
        self.positions = records.clone();
        records
    }

    /// Load the detail view for one position from the current list,
    /// loading positions first if none are held yet.
    pub async fn load_position_detail(&mut self, id: &str) -> Option<PositionDetail> {
        if self.positions.is_empty() {
            self.load_positions(true).await;
        }
        let record = self.positions.iter().find(|p| p.id == id)?.clone();
        Some(self.generator.detail_for(&record))
    }

    /// Filter the currently loaded positions.
    pub fn filter_positions(&self, options: &FilterOptions) -> Vec<PositionRecord> {
        self.positions
            .iter()
            .filter(|record| {
                options
                    .symbol
                    .as_deref()
                    .map(|needle| {
                        record
                            .symbol
                            .as_str()
                            .to_lowercase()
                            .contains(&needle.to_lowercase())
                    })
                    .unwrap_or(true)
                    && options.side.map(|side| record.side == side).unwrap_or(true)
                    && options
                        .status
                        .map(|status| record.status == status)
                        .unwrap_or(true)
                    && options
                        .start_time
                        .map(|start| record.open_time >= start)
                        .unwrap_or(true)
                    && options
                        .end_time
                        .map(|end| record.open_time <= end)
                        .unwrap_or(true)
            })
            .cloned()
            .collect()
    }

    /// Latest balance of the currently loaded equity series.
    pub fn total_balance(&self) -> f64 {
        self.equity.last().map(|point| point.balance).unwrap_or(0.0)
    }

    /// Cumulative pnl of the currently loaded equity series.
    pub fn total_pnl(&self) -> PnlSummary {
        self.equity
            .last()
            .map(|point| PnlSummary {
                realized: point.realized_pnl,
                unrealized: point.unrealized_pnl,
            })
            .unwrap_or_default()
    }

    pub fn open_positions_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_open()).count()
    }

    pub fn closed_positions_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_closed()).count()
    }

    fn fallback_equity(&mut self, dimension: TimeDimension) -> Vec<AssetDataPoint> {
        let data = self
            .generator
            .asset_series(dimension, self.config.starting_balance);
        self.cache.put_equity(dimension, data.clone());
        self.equity = data.clone();
        data
    }

    fn fallback_positions(&mut self) -> Vec<PositionRecord> {
        let data = self.generator.positions();
        self.cache.put_positions(data.clone());
        self.positions = data.clone();
        data
    }
}

/// Group fills by symbol, deterministically ordered, preserving per-symbol
/// source order.
fn group_by_symbol(fills: Vec<Fill>) -> BTreeMap<Symbol, Vec<Fill>> {
    let mut groups: BTreeMap<Symbol, Vec<Fill>> = BTreeMap::new();
    for fill in fills {
        groups.entry(fill.symbol.clone()).or_default().push(fill);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PositionSide, PositionStatus, Side};

    fn fill(symbol: &str, time_ms: i64, side: Side, quantity: f64, price: f64) -> Fill {
        Fill {
            id: format!("{}_{}", symbol, time_ms),
            symbol: Symbol::new(symbol),
            order_id: "1".to_string(),
            side,
            quantity,
            price,
            fee: 0.0,
            timestamp: TimeMs::new(time_ms),
            is_maker: false,
        }
    }

    fn seeded_config() -> Config {
        Config {
            synthetic_seed: Some(42),
            ..Config::default()
        }
    }

    #[test]
    fn test_group_by_symbol_preserves_order() {
        let groups = group_by_symbol(vec![
            fill("ETHUSDT", 2000, Side::Buy, 1.0, 100.0),
            fill("BTCUSDT", 1000, Side::Buy, 1.0, 100.0),
            fill("BTCUSDT", 3000, Side::Sell, 1.0, 110.0),
        ]);
        let symbols: Vec<_> = groups.keys().map(|s| s.as_str().to_string()).collect();
        assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(groups[&Symbol::new("BTCUSDT")].len(), 2);
    }

    #[tokio::test]
    async fn test_demo_mode_serves_synthetic_positions() {
        let mut orchestrator = Orchestrator::new(seeded_config(), None);
        let positions = orchestrator.load_positions(true).await;
        assert!(!positions.is_empty());
        assert!(orchestrator.last_error().is_none());
        assert!(!orchestrator.is_configured());
    }

    #[tokio::test]
    async fn test_summaries_track_loaded_equity() {
        let mut orchestrator = Orchestrator::new(seeded_config(), None);
        assert_eq!(orchestrator.total_balance(), 0.0);

        let series = orchestrator.load_equity_series(TimeDimension::Day, true).await;
        assert_eq!(orchestrator.total_balance(), series.last().unwrap().balance);
        assert_eq!(
            orchestrator.total_pnl().realized,
            series.last().unwrap().realized_pnl
        );
    }

    #[tokio::test]
    async fn test_filter_positions() {
        let mut orchestrator = Orchestrator::new(seeded_config(), None);
        let positions = orchestrator.load_positions(true).await;

        let open_only = orchestrator.filter_positions(&FilterOptions {
            status: Some(PositionStatus::Open),
            ..Default::default()
        });
        assert_eq!(open_only.len(), orchestrator.open_positions_count());

        let btc_only = orchestrator.filter_positions(&FilterOptions {
            symbol: Some("btc".to_string()),
            ..Default::default()
        });
        assert!(btc_only.iter().all(|p| p.symbol.as_str().contains("BTC")));
        assert!(btc_only.len() <= positions.len());

        let long_only = orchestrator.filter_positions(&FilterOptions {
            side: Some(PositionSide::Long),
            ..Default::default()
        });
        assert!(long_only.iter().all(|p| p.side == PositionSide::Long));
    }

    #[tokio::test]
    async fn test_position_detail_for_unknown_id() {
        let mut orchestrator = Orchestrator::new(seeded_config(), None);
        orchestrator.load_positions(true).await;
        assert!(orchestrator.load_position_detail("no_such_id").await.is_none());
    }

    #[tokio::test]
    async fn test_position_detail_enriches_record() {
        let mut orchestrator = Orchestrator::new(seeded_config(), None);
        let positions = orchestrator.load_positions(true).await;
        let detail = orchestrator
            .load_position_detail(&positions[0].id)
            .await
            .unwrap();
        assert_eq!(detail.record.id, positions[0].id);
        assert!(!detail.pnl_history.is_empty());
    }
}

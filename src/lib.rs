pub mod cache;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod orchestration;
pub mod synthetic;

pub use cache::{CacheKey, DataCache, DEFAULT_TTL};
pub use config::{Config, ConfigError};
pub use datasource::{
    BinanceDataSource, DataSourceError, IncomeQuery, MarketDataSource, MockDataSource, TradeQuery,
};
pub use domain::{
    AccountSnapshot, AssetDataPoint, Fill, FilterOptions, IncomeEvent, IncomeKind, PnlHistoryPoint,
    PositionDetail, PositionRecord, PositionSide, PositionStatus, Side, Symbol, TimeDimension,
    TimeMs,
};
pub use orchestration::{Orchestrator, PnlSummary};
pub use synthetic::SyntheticGenerator;

//! Market-data client abstraction: the signed exchange collaborator the
//! orchestrator fetches fills, income events, and account snapshots from.

use crate::domain::{AccountSnapshot, Fill, IncomeEvent, TimeMs};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod binance;
pub mod mock;

pub use binance::BinanceDataSource;
pub use mock::MockDataSource;

/// Query parameters for the income-history endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomeQuery {
    pub symbol: Option<String>,
    /// Wire income type filter (e.g., "REALIZED_PNL").
    pub income_type: Option<String>,
    pub start_time: Option<TimeMs>,
    pub end_time: Option<TimeMs>,
    pub limit: Option<u32>,
}

/// Query parameters for the per-symbol trade endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeQuery {
    pub symbol: String,
    pub start_time: Option<TimeMs>,
    pub end_time: Option<TimeMs>,
    pub from_id: Option<i64>,
    pub limit: Option<u32>,
}

impl TradeQuery {
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        TradeQuery {
            symbol: symbol.into(),
            start_time: None,
            end_time: None,
            from_id: None,
            limit: None,
        }
    }
}

/// Signed market-data client consumed by the orchestrator.
///
/// Implementations must tolerate partial failures in `all_user_trades`: a
/// fetch failure for one symbol is logged and skipped while the remaining
/// symbols are still fetched.
#[async_trait]
pub trait MarketDataSource: Send + Sync + fmt::Debug {
    /// Fetch account income ledger entries.
    async fn income_history(&self, query: IncomeQuery) -> Result<Vec<IncomeEvent>, DataSourceError>;

    /// Fetch executed fills for one symbol.
    async fn user_trades(&self, query: TradeQuery) -> Result<Vec<Fill>, DataSourceError>;

    /// Fetch fills across every symbol the account has ever traded, derived
    /// by discovering symbols from realized-pnl income records and then
    /// fetching fills per symbol sequentially.
    async fn all_user_trades(&self) -> Result<Vec<Fill>, DataSourceError>;

    /// Fetch the live account snapshot (display only, not reconstruction).
    async fn account_info(&self) -> Result<AccountSnapshot, DataSourceError>;
}

/// Error type for market-data client operations.
#[derive(Debug, Clone, Error)]
pub enum DataSourceError {
    /// Connection-level failure (timeout, DNS, TLS).
    #[error("Network error: {0}")]
    Network(String),
    /// Transport-level HTTP failure.
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    /// The exchange rejected the request with an application error code.
    #[error("Exchange error {code}: {message}")]
    Api { code: i64, message: String },
    /// Response body could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),
    /// Rate limit exceeded.
    #[error("Rate limited")]
    RateLimited,
}

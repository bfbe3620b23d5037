//! Mock market-data source for testing without network calls.

use super::{DataSourceError, IncomeQuery, MarketDataSource, TradeQuery};
use crate::domain::{AccountSnapshot, Fill, IncomeEvent};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Mock data source returning predefined data, with optional failure
/// injection and call counting for cache behavior tests.
#[derive(Debug, Default)]
pub struct MockDataSource {
    fills: Vec<Fill>,
    income: Vec<IncomeEvent>,
    account: Option<AccountSnapshot>,
    fail: AtomicBool,
    income_calls: AtomicUsize,
    trade_calls: AtomicUsize,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fill to the mock data source.
    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fills.push(fill);
        self
    }

    /// Add multiple fills to the mock data source.
    pub fn with_fills(mut self, fills: Vec<Fill>) -> Self {
        self.fills.extend(fills);
        self
    }

    /// Add an income event to the mock data source.
    pub fn with_income(mut self, event: IncomeEvent) -> Self {
        self.income.push(event);
        self
    }

    /// Add multiple income events to the mock data source.
    pub fn with_income_events(mut self, events: Vec<IncomeEvent>) -> Self {
        self.income.extend(events);
        self
    }

    /// Set the account snapshot returned by `account_info`.
    pub fn with_account(mut self, account: AccountSnapshot) -> Self {
        self.account = Some(account);
        self
    }

    /// Make every call fail with a network error.
    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    /// Toggle failure injection at runtime.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of `income_history` calls issued so far.
    pub fn income_calls(&self) -> usize {
        self.income_calls.load(Ordering::SeqCst)
    }

    /// Number of trade-fetch calls (`user_trades` + `all_user_trades`).
    pub fn trade_calls(&self) -> usize {
        self.trade_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), DataSourceError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(DataSourceError::Network("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MarketDataSource for MockDataSource {
    async fn income_history(
        &self,
        query: IncomeQuery,
    ) -> Result<Vec<IncomeEvent>, DataSourceError> {
        self.income_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        Ok(self
            .income
            .iter()
            .filter(|event| {
                query
                    .income_type
                    .as_deref()
                    .map(|wire| event.kind.as_wire() == wire)
                    .unwrap_or(true)
                    && query.start_time.map(|start| event.time >= start).unwrap_or(true)
                    && query.end_time.map(|end| event.time <= end).unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    async fn user_trades(&self, query: TradeQuery) -> Result<Vec<Fill>, DataSourceError> {
        self.trade_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        Ok(self
            .fills
            .iter()
            .filter(|fill| fill.symbol.as_str() == query.symbol)
            .cloned()
            .collect())
    }

    async fn all_user_trades(&self) -> Result<Vec<Fill>, DataSourceError> {
        self.trade_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.fills.clone())
    }

    async fn account_info(&self) -> Result<AccountSnapshot, DataSourceError> {
        self.check_failure()?;
        self.account
            .clone()
            .ok_or_else(|| DataSourceError::Parse("no account configured".to_string()))
    }
}

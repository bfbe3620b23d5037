//! Cache, TTL, and fallback behavior of the orchestrator against the mock
//! collaborator.

use perpfolio::{
    Config, Fill, IncomeEvent, IncomeKind, MarketDataSource, MockDataSource, Orchestrator, Side,
    Symbol, TimeDimension, TimeMs,
};
use std::sync::Arc;
use std::time::Duration;

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

fn income(time_ms: i64, kind: IncomeKind, amount: f64) -> IncomeEvent {
    IncomeEvent {
        time: TimeMs::new(time_ms),
        kind,
        amount,
        symbol: None,
    }
}

fn config_with_ttl(ttl: Duration) -> Config {
    Config {
        synthetic_seed: Some(7),
        cache_ttl: ttl,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_cache_hit_avoids_second_collaborator_call() {
    let mock = Arc::new(
        MockDataSource::new()
            .with_fill(fill("BTCUSDT", 1000, Side::Buy, 1.0, 100.0))
            .with_fill(fill("BTCUSDT", 2000, Side::Sell, 1.0, 110.0)),
    );
    let datasource: Arc<dyn MarketDataSource> = mock.clone();
    let mut orchestrator =
        Orchestrator::new(config_with_ttl(Duration::from_secs(300)), Some(datasource));

    let first = orchestrator.load_positions(true).await;
    assert_eq!(mock.trade_calls(), 1);

    let second = orchestrator.load_positions(true).await;
    assert_eq!(mock.trade_calls(), 1, "fresh cache must suppress the fetch");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_ttl_expiry_reinvokes_collaborator() {
    let mock = Arc::new(
        MockDataSource::new()
            .with_fill(fill("BTCUSDT", 1000, Side::Buy, 1.0, 100.0))
            .with_fill(fill("BTCUSDT", 2000, Side::Sell, 1.0, 110.0)),
    );
    let datasource: Arc<dyn MarketDataSource> = mock.clone();
    let mut orchestrator =
        Orchestrator::new(config_with_ttl(Duration::from_millis(20)), Some(datasource));

    orchestrator.load_positions(true).await;
    assert_eq!(mock.trade_calls(), 1);

    tokio::time::sleep(Duration::from_millis(40)).await;
    orchestrator.load_positions(true).await;
    assert_eq!(mock.trade_calls(), 2, "stale cache must refetch");
}

#[tokio::test]
async fn test_cache_bypass_when_disallowed() {
    let mock = Arc::new(MockDataSource::new().with_fill(fill(
        "BTCUSDT",
        1000,
        Side::Buy,
        1.0,
        100.0,
    )));
    let datasource: Arc<dyn MarketDataSource> = mock.clone();
    let mut orchestrator =
        Orchestrator::new(config_with_ttl(Duration::from_secs(300)), Some(datasource));

    orchestrator.load_positions(true).await;
    orchestrator.load_positions(false).await;
    assert_eq!(mock.trade_calls(), 2);
}

#[tokio::test]
async fn test_equity_series_from_income_events() {
    let now = TimeMs::now().as_ms();
    let mock = Arc::new(
        MockDataSource::new()
            .with_income(income(now - 2000, IncomeKind::RealizedPnl, 50.0))
            .with_income(income(now - 1000, IncomeKind::FundingFee, -2.0)),
    );
    let datasource: Arc<dyn MarketDataSource> = mock.clone();
    let mut orchestrator =
        Orchestrator::new(config_with_ttl(Duration::from_secs(300)), Some(datasource));

    let series = orchestrator.load_equity_series(TimeDimension::Day, true).await;
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].balance, 10050.0);
    assert_eq!(series[0].change, 50.0);
    assert_eq!(series[1].balance, 10048.0);
    assert_eq!(series[1].change, -2.0);
    assert!(orchestrator.last_error().is_none());

    // Cached on success; a second call must not hit the collaborator again.
    orchestrator.load_equity_series(TimeDimension::Day, true).await;
    assert_eq!(mock.income_calls(), 1);
}

#[tokio::test]
async fn test_equity_dimensions_cached_independently() {
    let now = TimeMs::now().as_ms();
    let mock = Arc::new(
        MockDataSource::new().with_income(income(now - 1000, IncomeKind::RealizedPnl, 10.0)),
    );
    let datasource: Arc<dyn MarketDataSource> = mock.clone();
    let mut orchestrator =
        Orchestrator::new(config_with_ttl(Duration::from_secs(300)), Some(datasource));

    orchestrator.load_equity_series(TimeDimension::Day, true).await;
    orchestrator.load_equity_series(TimeDimension::Month, true).await;
    assert_eq!(mock.income_calls(), 2, "each dimension has its own cache key");
}

#[tokio::test]
async fn test_collaborator_failure_falls_back_and_records_error() {
    let mock = Arc::new(MockDataSource::new().failing());
    let datasource: Arc<dyn MarketDataSource> = mock.clone();
    let mut orchestrator =
        Orchestrator::new(config_with_ttl(Duration::from_secs(300)), Some(datasource));

    let positions = orchestrator.load_positions(true).await;
    assert!(!positions.is_empty(), "fallback must still produce data");
    assert!(orchestrator.last_error().is_some());
    for record in &positions {
        assert!(record.size > 0.0);
        assert!(record.entry_price > 0.0);
    }

    let series = orchestrator.load_equity_series(TimeDimension::Day, false).await;
    assert!(!series.is_empty());
    for window in series.windows(2) {
        assert!(window[0].timestamp < window[1].timestamp);
    }
}

#[tokio::test]
async fn test_empty_result_falls_back_without_error_state() {
    let mock = Arc::new(MockDataSource::new());
    let datasource: Arc<dyn MarketDataSource> = mock.clone();
    let mut orchestrator =
        Orchestrator::new(config_with_ttl(Duration::from_secs(300)), Some(datasource));

    let positions = orchestrator.load_positions(true).await;
    assert!(!positions.is_empty(), "empty upstream result still yields data");
    assert!(
        orchestrator.last_error().is_none(),
        "an empty result is not a failure"
    );
}

#[tokio::test]
async fn test_success_clears_previous_error_state() {
    let now = TimeMs::now().as_ms();
    let mock = Arc::new(
        MockDataSource::new()
            .with_income(income(now - 1000, IncomeKind::RealizedPnl, 1.0))
            .failing(),
    );
    let datasource: Arc<dyn MarketDataSource> = mock.clone();
    let mut orchestrator = Orchestrator::new(config_with_ttl(Duration::ZERO), Some(datasource));

    orchestrator.load_equity_series(TimeDimension::Day, true).await;
    assert!(orchestrator.last_error().is_some());

    mock.set_failing(false);
    orchestrator.load_equity_series(TimeDimension::Day, true).await;
    assert!(
        orchestrator.last_error().is_none(),
        "a successful load must clear the recorded error"
    );
}

#[tokio::test]
async fn test_demo_mode_is_reproducible_with_seed() {
    let mut a = Orchestrator::new(config_with_ttl(Duration::from_secs(300)), None);
    let mut b = Orchestrator::new(config_with_ttl(Duration::from_secs(300)), None);

    let positions_a = a.load_positions(true).await;
    let positions_b = b.load_positions(true).await;
    assert_eq!(positions_a.len(), positions_b.len());
    // Timestamps anchor to the wall clock; every drawn value must match.
    for (left, right) in positions_a.iter().zip(&positions_b) {
        assert_eq!(left.id, right.id);
        assert_eq!(left.symbol, right.symbol);
        assert_eq!(left.side, right.side);
        assert_eq!(left.status, right.status);
        assert_eq!(left.size, right.size);
        assert_eq!(left.entry_price, right.entry_price);
        assert_eq!(left.exit_price, right.exit_price);
    }
}

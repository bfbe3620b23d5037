use perpfolio::datasource::BinanceDataSource;
use perpfolio::{Config, MarketDataSource, Orchestrator, TimeDimension};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env()?;

    let datasource: Option<Arc<dyn MarketDataSource>> =
        match (&config.api_key, &config.api_secret) {
            (Some(key), Some(secret)) => Some(Arc::new(BinanceDataSource::new(
                config.base_url.clone(),
                key.clone(),
                secret.clone(),
            ))),
            _ => {
                tracing::info!("no API credentials configured; running in demo mode");
                None
            }
        };

    let mut orchestrator = Orchestrator::new(config, datasource);

    let equity = orchestrator.load_equity_series(TimeDimension::Day, true).await;
    let positions = orchestrator.load_positions(true).await;

    let pnl = orchestrator.total_pnl();
    tracing::info!(
        "balance={:.2} realized_pnl={:.2} unrealized_pnl={:.2} ({} equity points)",
        orchestrator.total_balance(),
        pnl.realized,
        pnl.unrealized,
        equity.len()
    );
    tracing::info!(
        "{} positions ({} open, {} closed)",
        positions.len(),
        orchestrator.open_positions_count(),
        orchestrator.closed_positions_count()
    );
    for position in positions.iter().take(10) {
        tracing::info!(
            "{} {} {} size={:.4} entry={:.2} pnl={}",
            position.id,
            position.symbol,
            position.side,
            position.size,
            position.entry_price,
            position
                .pnl
                .map(|p| format!("{:.4}", p))
                .unwrap_or_else(|| "-".to_string())
        );
    }

    if let Some(error) = orchestrator.last_error() {
        tracing::warn!("served fallback data after collaborator failure: {}", error);
    }

    Ok(())
}

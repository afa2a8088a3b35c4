use anyhow::{Context, Result};
use faktur_platform::{AppConfig, InvoiceBook, open_store};
use faktur_recurring::{RecurrenceEngine, run_polling};
use tracing::{info, warn};

const DEFAULT_LOG_FILTER: &str = "faktur_scheduler=info,faktur_recurring=info";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        )
        .init();

    let config = AppConfig::from_env().context("invalid scheduler configuration")?;
    let store = open_store(&config).await?;
    let book = InvoiceBook::new(store, RecurrenceEngine::new(config.advancement))
        .with_default_currency(config.default_currency);
    let scheduler = book.recurrence_scheduler();

    info!(
        data_dir = %config.data_dir.display(),
        interval_secs = config.poll_interval.as_secs(),
        advancement = ?config.advancement,
        currency = %config.default_currency,
        currency_name = config.default_currency.config().name,
        "recurring invoice scheduler started"
    );

    run_polling(&scheduler, config.poll_interval, shutdown_signal()).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}

pub mod cli;
pub mod config;

use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;

use common::clock::{Clock, SystemClock};
use common::logger::init_logger;
use feed::connector::BinanceFeed;
use market::detector::MarketEngine;
use market::types::Tick;
use notifier::admission::AdmissionController;
use notifier::pushover::PushoverClient;
use notifier::quota::QuotaLimits;

use crate::cli::Cli;
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger("pricewatch");

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let instruments = cli.instruments();
    let thresholds = cli.thresholds();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    tracing::info!(instruments = ?instruments, "starting price monitor");

    let sink = Arc::new(PushoverClient::new(
        config.pushover_api_token,
        config.pushover_user_key,
    )?);
    let (controller, pending_rx) =
        AdmissionController::new(sink, Arc::clone(&clock), QuotaLimits::default());

    // Deferred-notification drain runs for the process lifetime.
    tokio::spawn(Arc::clone(&controller).run_drain_loop(pending_rx));

    let (tick_tx, mut tick_rx) = mpsc::channel::<Tick>(1024);

    let binance = BinanceFeed::new(cli.ws_url.clone(), instruments.clone(), Arc::clone(&clock));
    tokio::spawn(async move {
        if let Err(e) = binance.run(tick_tx).await {
            tracing::error!(error = ?e, "price feed task exited");
        }
    });

    // Single consumer: each tick's checks and history append complete
    // before the next tick is processed.
    let mut engine = MarketEngine::new(&instruments, thresholds, clock.now_utc());
    let admission = Arc::clone(&controller);
    tokio::spawn(async move {
        while let Some(tick) = tick_rx.recv().await {
            for notification in engine.on_tick(&tick) {
                admission.request(notification).await;
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");

    Ok(())
}

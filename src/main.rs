use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod analysis;
mod api;
mod config;
mod error;
mod models;
mod solana;

use crate::analysis::holdings::HoldingsEnricher;
use crate::analysis::pipeline::LaunchPipeline;
use crate::analysis::report::ReportBuilder;
use crate::analysis::sink::ReportWriter;
use crate::analysis::watcher::{LaunchWatcher, WatcherConfig};
use crate::api::jupiter::PriceClient;
use crate::api::pumpfun::PumpfunClient;
use crate::config::Config;
use crate::solana::client::SolanaClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load environment variables
    dotenv().ok();

    let config = Config::load()?;
    info!("Configuration loaded successfully");

    let solana_client = SolanaClient::new(&config.solana_rpc_url)?;

    // The report writer owns the merged store and the output file; completed
    // mint reports reach it over this channel.
    let (report_tx, report_rx) = mpsc::channel(64);
    let writer = ReportWriter::new(config.output_file.clone().into(), report_rx);
    tokio::spawn(writer.run());

    let builder = ReportBuilder::new(
        HoldingsEnricher::new(solana_client.clone()),
        PriceClient::new(),
    );
    let pipeline = Arc::new(LaunchPipeline::new(
        solana_client,
        PumpfunClient::new(),
        builder,
        report_tx,
    ));

    let watcher = Arc::new(LaunchWatcher::new(
        WatcherConfig {
            websocket_url: config.solana_ws_url.clone(),
            watch_address: config.watch_address.clone(),
            ..Default::default()
        },
        pipeline,
    ));
    info!("Watching {} for launches", config.watch_address);
    let watcher_task = watcher.clone();
    tokio::spawn(async move { watcher_task.run().await });

    tokio::signal::ctrl_c().await?;
    let stats = watcher.get_stats().await;
    info!(
        "Shutdown requested; {} logs seen, {} launches, {} duplicates, {} reconnects",
        stats.logs_received, stats.launches_detected, stats.duplicates_skipped, stats.reconnect_attempts
    );
    Ok(())
}

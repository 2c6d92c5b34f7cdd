use anyhow::Result;
use futures::StreamExt;
use solana_client::{
    nonblocking::pubsub_client::PubsubClient,
    rpc_config::{RpcTransactionLogsConfig, RpcTransactionLogsFilter},
    rpc_response::{Response, RpcLogsResponse},
};
use solana_sdk::commitment_config::CommitmentConfig;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::analysis::pipeline::LaunchPipeline;
use crate::error::WatchError;

/// Log line marking a new liquidity pool initialization.
const INIT_LOG_MARKER: &str = "Program log: initialize2: InitializeInstruction2";

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// WebSocket URL of the RPC node.
    pub websocket_url: String,
    /// Address whose log mentions are subscribed to.
    pub watch_address: String,
    /// Commitment level for the subscription.
    pub commitment: CommitmentConfig,
    /// Delay before resubscribing after a connection loss.
    pub reconnect_delay_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            websocket_url: String::new(),
            watch_address: String::new(),
            commitment: CommitmentConfig::finalized(),
            reconnect_delay_ms: 5000,
        }
    }
}

/// Statistics for the watcher.
#[derive(Debug, Default, Clone)]
pub struct WatcherStats {
    /// Total log notifications received
    pub logs_received: u64,
    /// Launch events handed to a pipeline
    pub launches_detected: u64,
    /// Notifications dropped as already-seen signatures
    pub duplicates_skipped: u64,
    /// Total reconnection attempts
    pub reconnect_attempts: u64,
    /// Unix time of the last successful subscribe
    pub connected_since: Option<i64>,
}

/// What to do with one log notification.
#[derive(Debug, PartialEq)]
enum LogDecision {
    Launch,
    Duplicate,
    Ignored,
}

// ============================================================================
// LAUNCH WATCHER
// ============================================================================

/// Standing `logsSubscribe` watcher for token launches.
///
/// Keeps one subscription alive against the configured address, drops
/// signatures it has already seen, and spawns a detached pipeline task for
/// every log batch carrying the initialize marker. Reconnects with a fixed
/// delay on every connection loss, indefinitely.
pub struct LaunchWatcher {
    config: WatcherConfig,
    pipeline: Arc<LaunchPipeline>,
    seen_signatures: Arc<RwLock<HashSet<String>>>,
    stats: Arc<RwLock<WatcherStats>>,
}

impl LaunchWatcher {
    pub fn new(config: WatcherConfig, pipeline: Arc<LaunchPipeline>) -> Self {
        Self {
            config,
            pipeline,
            seen_signatures: Arc::new(RwLock::new(HashSet::new())),
            stats: Arc::new(RwLock::new(WatcherStats::default())),
        }
    }

    /// Get current statistics.
    pub async fn get_stats(&self) -> WatcherStats {
        self.stats.read().await.clone()
    }

    /// Run until process shutdown. Never returns under normal operation.
    pub async fn run(&self) {
        loop {
            match self.run_subscription().await {
                Ok(()) => warn!("Log subscription stream closed"),
                Err(e) => error!("Log subscription error: {:?}", e),
            }

            {
                let mut stats = self.stats.write().await;
                stats.reconnect_attempts += 1;
                stats.connected_since = None;
            }

            info!("Reconnecting in {}ms", self.config.reconnect_delay_ms);
            tokio::time::sleep(Duration::from_millis(self.config.reconnect_delay_ms)).await;
        }
    }

    async fn run_subscription(&self) -> Result<()> {
        info!("Connecting to {}", self.config.websocket_url);
        let pubsub_client = PubsubClient::new(&self.config.websocket_url)
            .await
            .map_err(|e| WatchError::SubscriptionError(format!("connect failed: {}", e)))?;

        let (mut logs_stream, unsubscribe) = pubsub_client
            .logs_subscribe(
                RpcTransactionLogsFilter::Mentions(vec![self.config.watch_address.clone()]),
                RpcTransactionLogsConfig {
                    commitment: Some(self.config.commitment),
                },
            )
            .await
            .map_err(|e| WatchError::SubscriptionError(format!("subscribe failed: {}", e)))?;

        info!("Subscribed to logs mentioning {}", self.config.watch_address);
        {
            let mut stats = self.stats.write().await;
            stats.connected_since = Some(chrono::Utc::now().timestamp());
        }

        while let Some(response) = logs_stream.next().await {
            self.handle_log_event(response).await;
        }

        unsubscribe().await;
        Ok(())
    }

    async fn handle_log_event(&self, response: Response<RpcLogsResponse>) {
        let event = response.value;

        {
            let mut stats = self.stats.write().await;
            stats.logs_received += 1;
        }

        // A transaction that failed on-chain cannot be a launch.
        if event.err.is_some() {
            return;
        }

        match classify_event(&self.seen_signatures, &event.signature, &event.logs).await {
            LogDecision::Duplicate => {
                debug!("Skipping duplicate signature: {}", event.signature);
                let mut stats = self.stats.write().await;
                stats.duplicates_skipped += 1;
            }
            LogDecision::Ignored => {}
            LogDecision::Launch => {
                info!("🚀 Launch detected: {}", event.signature);
                {
                    let mut stats = self.stats.write().await;
                    stats.launches_detected += 1;
                }

                let pipeline = self.pipeline.clone();
                let signature = event.signature;
                tokio::spawn(async move {
                    if let Err(e) = pipeline.process_launch(&signature).await {
                        warn!("Launch pipeline for {} failed: {:?}", signature, e);
                    }
                });
            }
        }
    }
}

/// Dedup-then-match. The write-locked insert is the atomic not-seen check,
/// so two concurrent notifications for the same signature yield exactly one
/// `Launch`. Every signature is recorded, marker match or not.
async fn classify_event(
    seen: &Arc<RwLock<HashSet<String>>>,
    signature: &str,
    logs: &[String],
) -> LogDecision {
    if !seen.write().await.insert(signature.to_string()) {
        return LogDecision::Duplicate;
    }
    if logs.iter().any(|log| log.contains(INIT_LOG_MARKER)) {
        LogDecision::Launch
    } else {
        LogDecision::Ignored
    }
}

// ============================================================================
// TESTS
// ============================================================================

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::WatchError;
use crate::models::trade::TradeRecord;

const PUMPFUN_API_URL: &str = "https://frontend-api.pump.fun";

/// Trade-history client for the pump.fun frontend API.
#[derive(Debug, Clone)]
pub struct PumpfunClient {
    base_url: String,
    client: Client,
}

impl PumpfunClient {
    pub fn new() -> Self {
        Self::with_base_url(PUMPFUN_API_URL.to_string())
    }

    fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client for pump.fun"),
        }
    }

    /// Full trade history for a mint, in the order the feed returns it.
    pub async fn get_all_trades(&self, mint: &str) -> Result<Vec<TradeRecord>> {
        let url = format!("{}/trades/all/{}", self.base_url, mint);

        debug!("Fetching trades from pump.fun for {}", mint);

        let response = self
            .client
            .get(&url)
            .query(&[("limit", "1000"), ("offset", "0"), ("minimumSize", "0")])
            .send()
            .await
            .context("Failed to send request to pump.fun trades endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("pump.fun trades API error for {}: {} - {}", mint, status, error_text);
            return Err(WatchError::TradeApiError(format!("{} - {}", status, error_text)).into());
        }

        let trades: Vec<TradeRecord> = response
            .json()
            .await
            .context("Failed to parse pump.fun trades response")?;

        debug!("Got {} trades for {}", trades.len(), mint);
        Ok(trades)
    }
}

impl Default for PumpfunClient {
    fn default() -> Self {
        Self::new()
    }
}

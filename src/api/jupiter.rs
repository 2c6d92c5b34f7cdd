use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::rate_limit::IntervalLimiter;
use crate::error::WatchError;

const JUPITER_PRICE_URL: &str = "https://api.jup.ag/price/v2";
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Mints per price request; the quote API caps the ids list at 100.
pub const PRICE_BATCH_SIZE: usize = 100;
/// 5 requests/second.
const PRICE_REQUEST_INTERVAL: Duration = Duration::from_millis(200);

/// Batched price-quote client for the Jupiter price v2 API.
#[derive(Debug)]
pub struct PriceClient {
    base_url: String,
    client: Client,
    limiter: IntervalLimiter,
}

// --- Response Structs ---

#[derive(Debug, Deserialize)]
struct PriceV2Response {
    data: HashMap<String, Option<PriceEntry>>,
}

// Prices arrive as decimal strings, e.g. {"price": "1.0000015"}.
#[derive(Debug, Deserialize)]
struct PriceEntry {
    price: Option<String>,
}

impl PriceClient {
    pub fn new() -> Self {
        Self::with_base_url(JUPITER_PRICE_URL.to_string())
    }

    fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client for Jupiter"),
            limiter: IntervalLimiter::new(PRICE_REQUEST_INTERVAL),
        }
    }

    /// Fetch USD prices for every mint in `mints`, 100 per request, throttled
    /// to 5 requests/second. A failed batch is logged and contributes no
    /// prices; mints the API does not quote are simply absent from the result.
    pub async fn fetch_prices(&self, mints: &HashSet<String>) -> HashMap<String, f64> {
        let mut prices = HashMap::new();
        let mint_list: Vec<&String> = mints.iter().collect();

        for batch in mint_list.chunks(PRICE_BATCH_SIZE) {
            self.limiter.acquire().await;

            match self.fetch_batch(batch).await {
                Ok(batch_prices) => prices.extend(batch_prices),
                Err(e) => warn!("Price batch of {} mints failed: {:?}", batch.len(), e),
            }
        }

        debug!("Priced {} of {} requested mints", prices.len(), mints.len());
        prices
    }

    async fn fetch_batch(&self, mints: &[&String]) -> Result<HashMap<String, f64>> {
        let ids = mints
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("ids", ids.as_str())])
            .send()
            .await
            .context("Failed to send request to Jupiter price API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(WatchError::PriceApiError(format!("{} - {}", status, error_text)).into());
        }

        let response_data: PriceV2Response = response
            .json()
            .await
            .context("Failed to parse Jupiter price API response")?;

        Ok(response_data
            .data
            .into_iter()
            .map(|(mint, entry)| {
                let price = entry
                    .and_then(|e| e.price)
                    .and_then(|p| p.parse::<f64>().ok())
                    .unwrap_or(0.0);
                (mint, price)
            })
            .collect())
    }
}

impl Default for PriceClient {
    fn default() -> Self {
        Self::new()
    }
}

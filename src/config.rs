use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Address watched for launch logs (Raydium liquidity pool program authority).
pub const DEFAULT_WATCH_ADDRESS: &str = "39azUYFWPz3VHgKCf3VChUwbpURdCHRxjWVowf5jUJjg";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub solana_rpc_url: String,
    pub solana_ws_url: String,
    pub watch_address: String,
    pub output_file: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            solana_rpc_url: env::var("SOLANA_RPC_URL")
                .context("SOLANA_RPC_URL not set in environment")?,
            solana_ws_url: env::var("SOLANA_WS_URL")
                .context("SOLANA_WS_URL not set in environment")?,
            watch_address: env::var("WATCH_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_WATCH_ADDRESS.to_string()),
            output_file: env::var("OUTPUT_FILE")
                .unwrap_or_else(|_| "launch_reports.json".to_string()),
        })
    }
}

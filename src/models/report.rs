use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stablecoin and native mints that are always priced and never dropped by
/// the per-trader holding rank cutoff.
pub const ALWAYS_INCLUDE_MINTS: [&str; 3] = [
    "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", // USDT
    "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", // USDC
    "So11111111111111111111111111111111111111112",  // wrapped SOL
];

/// Subset of the allowlist counted into a trader's stablecoin value.
pub const STABLECOIN_MINTS: [&str; 2] = [
    "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
    "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",
];

pub fn is_allowlisted(mint: &str) -> bool {
    ALWAYS_INCLUDE_MINTS.contains(&mint)
}

pub fn is_stablecoin(mint: &str) -> bool {
    STABLECOIN_MINTS.contains(&mint)
}

/// One token account held by a trader. `price` and `value` stay 0 until the
/// batch price pass fills them in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingAccount {
    pub mint: String,
    pub owner: String,
    pub ui_amount: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderReport {
    pub trader: String,
    pub accounts: Vec<HoldingAccount>,
    pub native_balance: f64,
    pub net_token_amount: f64,
    #[serde(default)]
    pub total_value: f64,
    #[serde(default)]
    pub stablecoin_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReport {
    pub total_traders_before_filter: usize,
    pub total_tokens_sold_by_exited_traders: f64,
    pub time_to_bond: String,
    pub traders: Vec<TraderReport>,
}

/// Root output artifact: mint address -> report. BTreeMap keeps the
/// serialized key order stable across identical runs.
pub type Report = BTreeMap<String, MintReport>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist_covers_stablecoins() {
        for mint in STABLECOIN_MINTS {
            assert!(is_allowlisted(mint));
        }
        assert!(!is_stablecoin("So11111111111111111111111111111111111111112"));
    }

    #[test]
    fn test_mint_report_serializes_camel_case() {
        let report = MintReport {
            total_traders_before_filter: 2,
            total_tokens_sold_by_exited_traders: 500_000.0,
            time_to_bond: "0 days, 0 hours, 5 minutes, 0 seconds".to_string(),
            traders: vec![],
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"totalTradersBeforeFilter\":2"));
        assert!(json.contains("\"totalTokensSoldByExitedTraders\":500000.0"));
        assert!(json.contains("\"timeToBond\""));
    }
}

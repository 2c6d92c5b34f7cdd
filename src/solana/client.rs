use anyhow::Result;
use solana_account_decoder::UiAccountData;
use solana_client::{
    rpc_client::RpcClient, rpc_config::RpcTransactionConfig, rpc_request::TokenAccountsFilter,
};
use solana_sdk::{
    commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature,
};
use solana_transaction_status::{option_serializer::OptionSerializer, UiTransactionEncoding};
use std::{str::FromStr, sync::Arc};
use tracing::{error, info};

use crate::api::jupiter::SOL_MINT;
use crate::error::WatchError;
use crate::models::report::HoldingAccount;

// Use Arc for shared ownership across concurrent launch pipelines
#[derive(Clone)]
pub struct SolanaClient {
    rpc_client: Arc<RpcClient>,
}

impl SolanaClient {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let commitment_config = CommitmentConfig::confirmed();
        let rpc_client = RpcClient::new_with_commitment(rpc_url.to_string(), commitment_config);
        match rpc_client.get_latest_blockhash() {
            Ok(_) => info!("Successfully connected to Solana RPC: {}", rpc_url),
            Err(e) => {
                error!("Failed to connect to Solana RPC {}: {}", rpc_url, e);
                return Err(WatchError::RpcError(format!(
                    "Failed to connect to RPC {}: {}",
                    rpc_url, e
                ))
                .into());
            }
        }

        Ok(Self {
            rpc_client: Arc::new(rpc_client),
        })
    }

    // Helper to run blocking RPC calls in a tokio task
    async fn run_blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(Arc<RpcClient>) -> solana_client::client_error::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let client = self.rpc_client.clone();
        let result = tokio::task::spawn_blocking(move || f(client))
            .await?
            .map_err(|e| WatchError::RpcError(format!("RPC client error: {}", e)))?;
        Ok(result)
    }

    /// Resolve a launch signature to its token mint: the first entry in the
    /// transaction's pre-token-balances whose mint is not wrapped SOL.
    /// Returns None when the transaction has no usable balance data, which
    /// means the log line was not a real launch.
    pub async fn get_launch_mint(&self, signature: &str) -> Result<Option<String>> {
        let signature = Signature::from_str(signature)
            .map_err(|e| WatchError::RpcError(format!("Invalid signature: {}", e)))?;

        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };

        let transaction = self
            .run_blocking(move |client| client.get_transaction_with_config(&signature, config))
            .await?;

        let meta = match transaction.transaction.meta {
            Some(meta) => meta,
            None => return Ok(None),
        };

        let pre_token_balances = match meta.pre_token_balances {
            OptionSerializer::Some(balances) => balances,
            _ => return Ok(None),
        };

        Ok(pre_token_balances
            .into_iter()
            .map(|balance| balance.mint)
            .find(|mint| mint != SOL_MINT))
    }

    /// All SPL token accounts owned by an address, parsed into holdings.
    /// Accounts the RPC cannot return in parsed form are skipped.
    pub async fn get_token_accounts(&self, owner: &str) -> Result<Vec<HoldingAccount>> {
        let owner_key = Pubkey::from_str(owner)
            .map_err(|e| WatchError::RpcError(format!("Invalid owner address: {}", e)))?;

        let accounts = self
            .run_blocking(move |client| {
                client.get_token_accounts_by_owner(
                    &owner_key,
                    TokenAccountsFilter::ProgramId(spl_token::id()),
                )
            })
            .await?;

        Ok(accounts
            .into_iter()
            .filter_map(|keyed| parse_token_account(&keyed.account.data))
            .collect())
    }

    pub async fn get_sol_balance(&self, address: &str) -> Result<f64> {
        let pubkey = Pubkey::from_str(address)
            .map_err(|e| WatchError::RpcError(format!("Invalid address: {}", e)))?;
        let lamports = self
            .run_blocking(move |client| client.get_balance(&pubkey))
            .await?;
        Ok(lamports as f64 / 1_000_000_000.0)
    }
}

/// Pull mint/owner/amount out of a jsonParsed token account. The UI amount
/// string is preferred; it survives amounts that overflow f64 formatting.
fn parse_token_account(data: &UiAccountData) -> Option<HoldingAccount> {
    let parsed = match data {
        UiAccountData::Json(account) => &account.parsed,
        _ => return None,
    };

    let info = parsed.get("info")?;
    let mint = info.get("mint")?.as_str()?.to_string();
    let owner = info.get("owner")?.as_str()?.to_string();

    let token_amount = info.get("tokenAmount")?;
    let ui_amount = token_amount
        .get("uiAmountString")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| token_amount.get("uiAmount").and_then(|v| v.as_f64()))
        .unwrap_or(0.0);

    Some(HoldingAccount {
        mint,
        owner,
        ui_amount,
        price: 0.0,
        value: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_account_decoder::parse_account_data::ParsedAccount;

    fn parsed_account(json: serde_json::Value) -> UiAccountData {
        UiAccountData::Json(ParsedAccount {
            program: "spl-token".to_string(),
            parsed: json,
            space: 165,
        })
    }

    #[test]
    fn test_parse_token_account() {
        let data = parsed_account(serde_json::json!({
            "type": "account",
            "info": {
                "mint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
                "owner": "TraderA",
                "tokenAmount": {
                    "amount": "123450000",
                    "decimals": 6,
                    "uiAmount": 123.45,
                    "uiAmountString": "123.45"
                }
            }
        }));

        let holding = parse_token_account(&data).unwrap();
        assert_eq!(holding.mint, "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
        assert_eq!(holding.owner, "TraderA");
        assert_eq!(holding.ui_amount, 123.45);
        assert_eq!(holding.price, 0.0);
    }

    #[test]
    fn test_parse_token_account_missing_fields() {
        let data = parsed_account(serde_json::json!({"type": "account", "info": {}}));
        assert!(parse_token_account(&data).is_none());
    }

    #[test]
    fn test_parse_token_account_rejects_binary_data() {
        let data = UiAccountData::LegacyBinary("AAAA".to_string());
        assert!(parse_token_account(&data).is_none());
    }
}

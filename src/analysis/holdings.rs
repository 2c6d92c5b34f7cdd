use tracing::{debug, warn};

use crate::models::report::{is_allowlisted, HoldingAccount, TraderReport};
use crate::solana::client::SolanaClient;

/// Holdings kept per trader after ranking by amount; allowlisted mints are
/// exempt from the cutoff.
pub const MAX_RANKED_HOLDINGS: usize = 15;

/// Fetches a trader's current token accounts and native balance.
#[derive(Clone)]
pub struct HoldingsEnricher {
    solana: SolanaClient,
}

impl HoldingsEnricher {
    pub fn new(solana: SolanaClient) -> Self {
        Self { solana }
    }

    /// Current holdings for one trader, or None when the account enumeration
    /// fails or comes back empty. A failed balance lookup degrades to 0
    /// rather than dropping the trader.
    pub async fn enrich(&self, trader: &str, net_token_amount: f64) -> Option<TraderReport> {
        let accounts = match self.solana.get_token_accounts(trader).await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!("Token account lookup failed for {}: {:?}", trader, e);
                return None;
            }
        };

        if accounts.is_empty() {
            debug!("No token accounts for {}", trader);
            return None;
        }

        let native_balance = match self.solana.get_sol_balance(trader).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!("Balance lookup failed for {}: {:?}; using 0", trader, e);
                0.0
            }
        };

        Some(TraderReport {
            trader: trader.to_string(),
            accounts: select_holdings(accounts),
            native_balance,
            net_token_amount,
            total_value: 0.0,
            stablecoin_value: 0.0,
        })
    }
}

/// Sort descending by amount and keep the top 15, plus any allowlisted mint
/// regardless of rank.
fn select_holdings(mut accounts: Vec<HoldingAccount>) -> Vec<HoldingAccount> {
    accounts.sort_by(|a, b| {
        b.ui_amount
            .partial_cmp(&a.ui_amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    accounts
        .into_iter()
        .enumerate()
        .filter(|(index, account)| *index < MAX_RANKED_HOLDINGS || is_allowlisted(&account.mint))
        .map(|(_, account)| account)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(mint: &str, ui_amount: f64) -> HoldingAccount {
        HoldingAccount {
            mint: mint.to_string(),
            owner: "TraderA".to_string(),
            ui_amount,
            price: 0.0,
            value: 0.0,
        }
    }

    #[test]
    fn test_select_holdings_caps_at_fifteen() {
        let accounts: Vec<_> = (0..20).map(|i| holding(&format!("Mint{}", i), i as f64)).collect();
        let selected = select_holdings(accounts);

        assert_eq!(selected.len(), MAX_RANKED_HOLDINGS);
        // Highest amounts survive.
        assert_eq!(selected[0].ui_amount, 19.0);
        assert_eq!(selected.last().unwrap().ui_amount, 5.0);
    }

    #[test]
    fn test_select_holdings_keeps_allowlisted_past_cutoff() {
        let mut accounts: Vec<_> = (0..20).map(|i| holding(&format!("Mint{}", i), 1000.0 - i as f64)).collect();
        accounts.push(holding("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", 0.5));
        let selected = select_holdings(accounts);

        assert_eq!(selected.len(), MAX_RANKED_HOLDINGS + 1);
        assert!(selected
            .iter()
            .any(|a| a.mint == "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"));
    }
}

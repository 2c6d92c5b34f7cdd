use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::analysis::holdings::HoldingsEnricher;
use crate::api::jupiter::PriceClient;
use crate::models::report::{is_allowlisted, is_stablecoin, MintReport, TraderReport};
use crate::models::trade::{MintTimeSpan, TraderAccumulator};

/// Minimum net token position for a trader to be enriched and reported.
pub const SIGNIFICANT_NET_TOKEN_AMOUNT: f64 = 2_000_000.0;
/// Holdings below this raw amount are not worth a price lookup unless
/// allowlisted.
pub const PRICE_CANDIDATE_MIN_AMOUNT: f64 = 20_000.0;
/// Priced holdings below this dollar value are dropped from the output.
pub const DUST_VALUE_THRESHOLD: f64 = 20.0;

/// Pure first pass over a mint's accumulators: headline numbers plus the
/// ranked list of traders worth enriching.
struct MintSummary {
    total_traders_before_filter: usize,
    total_tokens_sold_by_exited_traders: f64,
    time_to_bond: String,
    significant: Vec<(String, TraderAccumulator)>,
}

pub struct ReportBuilder {
    enricher: HoldingsEnricher,
    prices: PriceClient,
}

impl ReportBuilder {
    pub fn new(enricher: HoldingsEnricher, prices: PriceClient) -> Self {
        Self { enricher, prices }
    }

    /// Build one mint's report: filter to significant traders, enrich each
    /// with live holdings, price the union of their holdings in one batched
    /// pass, then value and prune.
    pub async fn build_mint_report(
        &self,
        mint: &str,
        accumulators: HashMap<String, TraderAccumulator>,
        span: MintTimeSpan,
    ) -> MintReport {
        let summary = summarize(accumulators, span);
        info!(
            "{}: {} of {} traders above significance threshold",
            mint,
            summary.significant.len(),
            summary.total_traders_before_filter
        );

        let mut traders = Vec::new();
        for (trader, acc) in &summary.significant {
            if let Some(report) = self.enricher.enrich(trader, acc.net_token_amount()).await {
                traders.push(report);
            }
        }

        let price_mints = collect_price_mints(&traders);
        debug!("{} unique mints to price for {}", price_mints.len(), mint);
        let prices = self.prices.fetch_prices(&price_mints).await;
        apply_prices(&mut traders, &prices);

        MintReport {
            total_traders_before_filter: summary.total_traders_before_filter,
            total_tokens_sold_by_exited_traders: summary.total_tokens_sold_by_exited_traders,
            time_to_bond: summary.time_to_bond,
            traders,
        }
    }
}

fn summarize(
    accumulators: HashMap<String, TraderAccumulator>,
    span: MintTimeSpan,
) -> MintSummary {
    let total_traders_before_filter = accumulators.len();

    let total_tokens_sold_by_exited_traders = accumulators
        .values()
        .filter(|acc| acc.buy_token_amount == 0.0 && acc.sell_token_amount > 0.0)
        .map(|acc| acc.sell_token_amount)
        .sum();

    let mut significant: Vec<(String, TraderAccumulator)> = accumulators
        .into_iter()
        .filter(|(_, acc)| acc.net_token_amount() >= SIGNIFICANT_NET_TOKEN_AMOUNT)
        .collect();
    significant.sort_by(|a, b| {
        b.1.combined_volume()
            .partial_cmp(&a.1.combined_volume())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    MintSummary {
        total_traders_before_filter,
        total_tokens_sold_by_exited_traders,
        time_to_bond: format_duration(span.span_seconds()),
        significant,
    }
}

/// Union of mints worth pricing across every enriched trader: large balances
/// plus the allowlist.
fn collect_price_mints(traders: &[TraderReport]) -> HashSet<String> {
    let mut mints = HashSet::new();
    for trader in traders {
        for account in &trader.accounts {
            if account.ui_amount >= PRICE_CANDIDATE_MIN_AMOUNT || is_allowlisted(&account.mint) {
                mints.insert(account.mint.clone());
            }
        }
    }
    mints
}

/// Value every holding, total per trader, then drop dust accounts from the
/// output. Totals are computed over the full account list before the dust
/// filter, so sub-threshold value still counts toward the trader's totals.
fn apply_prices(traders: &mut [TraderReport], prices: &HashMap<String, f64>) {
    for trader in traders.iter_mut() {
        let mut total_value = 0.0;
        let mut stablecoin_value = 0.0;

        for account in trader.accounts.iter_mut() {
            let price = prices.get(&account.mint).copied().unwrap_or(0.0);
            account.price = price;
            account.value = account.ui_amount * price;

            total_value += account.value;
            if is_stablecoin(&account.mint) {
                stablecoin_value += account.value;
            }
        }

        trader.accounts.retain(|account| account.value >= DUST_VALUE_THRESHOLD);
        trader.accounts.sort_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        trader.total_value = total_value + trader.native_balance;
        trader.stablecoin_value = stablecoin_value;
    }
}

pub fn format_duration(total_seconds: i64) -> String {
    let days = total_seconds / 86_400;
    let mut rest = total_seconds % 86_400;
    let hours = rest / 3_600;
    rest %= 3_600;
    let minutes = rest / 60;
    let seconds = rest % 60;

    format!(
        "{} days, {} hours, {} minutes, {} seconds",
        days, hours, minutes, seconds
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::aggregate_trades;
    use crate::models::report::HoldingAccount;
    use crate::models::trade::TradeRecord;

    fn trade(user: &str, token_amount: f64, sol_amount: f64, is_buy: bool, timestamp: i64) -> TradeRecord {
        TradeRecord {
            user: user.to_string(),
            token_amount,
            sol_amount,
            is_buy,
            timestamp,
        }
    }

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
    fn test_format_duration_zero() {
        assert_eq!(format_duration(0), "0 days, 0 hours, 0 minutes, 0 seconds");
    }

    #[test]
    fn test_format_duration_mixed_units() {
        assert_eq!(format_duration(90061), "1 days, 1 hours, 1 minutes, 1 seconds");
    }

    #[test]
    fn test_exited_trader_scenario() {
        // A buys 5M tokens for 10 SOL then sells 1M for 3 SOL; B only sells
        // 500k for 1 SOL.
        let trades = vec![
            trade("A", 5_000_000_000_000.0, 10_000_000_000.0, true, 1700000000),
            trade("A", 1_000_000_000_000.0, 3_000_000_000.0, false, 1700000100),
            trade("B", 500_000_000_000.0, 1_000_000_000.0, false, 1700000200),
        ];
        let (accumulators, span) = aggregate_trades(&trades);
        let summary = summarize(accumulators, span);

        assert_eq!(summary.total_traders_before_filter, 2);
        assert_eq!(summary.total_tokens_sold_by_exited_traders, 500_000.0);
        assert_eq!(summary.significant.len(), 1);
        assert_eq!(summary.significant[0].0, "A");
        assert_eq!(summary.significant[0].1.net_token_amount(), 4_000_000.0);
        assert_eq!(summary.time_to_bond, "0 days, 0 hours, 3 minutes, 20 seconds");
    }

    #[test]
    fn test_significance_filter_is_monotonic() {
        let trades = vec![
            trade("A", 5_000_000_000_000.0, 0.0, true, 0),
            trade("B", 2_500_000_000_000.0, 0.0, true, 1),
            trade("C", 1_000_000_000_000.0, 0.0, true, 2),
        ];
        let (accumulators, _) = aggregate_trades(&trades);

        let count_at = |threshold: f64| {
            accumulators
                .values()
                .filter(|acc| acc.net_token_amount() >= threshold)
                .count()
        };

        assert!(count_at(SIGNIFICANT_NET_TOKEN_AMOUNT) >= count_at(SIGNIFICANT_NET_TOKEN_AMOUNT * 2.0));
        assert_eq!(count_at(SIGNIFICANT_NET_TOKEN_AMOUNT), 2);
        assert_eq!(count_at(4_000_000_000.0), 0);
    }

    #[test]
    fn test_significant_traders_ranked_by_combined_volume() {
        let trades = vec![
            trade("A", 3_000_000_000_000.0, 0.0, true, 0),
            trade("B", 9_000_000_000_000.0, 0.0, true, 1),
            trade("B", 4_000_000_000_000.0, 0.0, false, 2),
        ];
        let (accumulators, span) = aggregate_trades(&trades);
        let summary = summarize(accumulators, span);

        let order: Vec<&str> = summary.significant.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);
    }

    #[test]
    fn test_collect_price_mints_threshold_and_allowlist() {
        let traders = vec![TraderReport {
            trader: "A".to_string(),
            accounts: vec![
                holding("BigMint", 25_000.0),
                holding("SmallMint", 100.0),
                holding("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", 5.0),
            ],
            native_balance: 0.0,
            net_token_amount: 0.0,
            total_value: 0.0,
            stablecoin_value: 0.0,
        }];

        let mints = collect_price_mints(&traders);
        assert!(mints.contains("BigMint"));
        assert!(!mints.contains("SmallMint"));
        assert!(mints.contains("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"));
    }

    #[test]
    fn test_apply_prices_values_and_prunes() {
        let mut traders = vec![TraderReport {
            trader: "A".to_string(),
            accounts: vec![
                holding("BigMint", 50_000.0),
                holding("DustMint", 10.0),
                holding("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", 30.0),
            ],
            native_balance: 2.0,
            net_token_amount: 4_000_000.0,
            total_value: 0.0,
            stablecoin_value: 0.0,
        }];

        let prices: HashMap<String, f64> = [
            ("BigMint".to_string(), 0.001),
            ("DustMint".to_string(), 0.5),
            ("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(), 1.0),
        ]
        .into_iter()
        .collect();

        apply_prices(&mut traders, &prices);

        let trader = &traders[0];
        // DustMint is worth $5, below the cutoff, but still counted in the
        // totals.
        assert_eq!(trader.accounts.len(), 2);
        assert_eq!(trader.total_value, 50.0 + 5.0 + 30.0 + 2.0);
        assert_eq!(trader.stablecoin_value, 30.0);
        // Accounts end up ordered by value.
        assert_eq!(trader.accounts[0].mint, "BigMint");
        assert_eq!(trader.accounts[0].value, 50.0);
    }

    #[test]
    fn test_apply_prices_defaults_missing_price_to_zero() {
        let mut traders = vec![TraderReport {
            trader: "A".to_string(),
            accounts: vec![holding("UnknownMint", 1_000_000.0)],
            native_balance: 0.0,
            net_token_amount: 0.0,
            total_value: 0.0,
            stablecoin_value: 0.0,
        }];

        apply_prices(&mut traders, &HashMap::new());

        assert!(traders[0].accounts.is_empty());
        assert_eq!(traders[0].total_value, 0.0);
    }
}

use serde::{Deserialize, Serialize};

/// A single raw trade as returned by the pump.fun trade-history API.
///
/// Amounts arrive in raw on-chain units: token amounts carry 6 decimals,
/// SOL amounts are lamports. `sol_amount` is occasionally absent from the
/// feed and defaults to 0.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradeRecord {
    pub user: String,
    pub token_amount: f64,
    #[serde(default)]
    pub sol_amount: f64,
    pub is_buy: bool,
    pub timestamp: i64,
}

/// Per-trader running totals for one mint. Every field only ever grows as
/// trades are folded in; net position is derived at report time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraderAccumulator {
    pub buy_token_amount: f64,
    pub sell_token_amount: f64,
    pub buy_sol_amount: f64,
    pub sell_sol_amount: f64,
    pub buys: u32,
    pub sells: u32,
}

impl TraderAccumulator {
    pub fn net_token_amount(&self) -> f64 {
        self.buy_token_amount - self.sell_token_amount
    }

    /// Combined traded volume, the ranking key for the report.
    pub fn combined_volume(&self) -> f64 {
        self.buy_token_amount + self.sell_token_amount
    }
}

/// First/last trade timestamps observed for one mint.
#[derive(Debug, Clone, Copy, Default)]
pub struct MintTimeSpan {
    pub min_timestamp: Option<i64>,
    pub max_timestamp: Option<i64>,
}

impl MintTimeSpan {
    pub fn observe(&mut self, timestamp: i64) {
        if self.min_timestamp.map_or(true, |min| timestamp < min) {
            self.min_timestamp = Some(timestamp);
        }
        if self.max_timestamp.map_or(true, |max| timestamp > max) {
            self.max_timestamp = Some(timestamp);
        }
    }

    /// Seconds between first and last trade, 0 if fewer than two distinct
    /// timestamps were seen.
    pub fn span_seconds(&self) -> i64 {
        match (self.min_timestamp, self.max_timestamp) {
            (Some(min), Some(max)) => max - min,
            _ => 0,
        }
    }
}

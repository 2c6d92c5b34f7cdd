use std::collections::HashMap;

use crate::models::trade::{MintTimeSpan, TradeRecord, TraderAccumulator};

/// Pump.fun token amounts carry 6 decimals.
pub const TOKEN_AMOUNT_DIVISOR: f64 = 1_000_000.0;
/// SOL amounts arrive as lamports.
pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Fold a mint's trade history into per-trader totals and the first/last
/// trade span. Pure; no I/O.
pub fn aggregate_trades(
    trades: &[TradeRecord],
) -> (HashMap<String, TraderAccumulator>, MintTimeSpan) {
    let mut accumulators: HashMap<String, TraderAccumulator> = HashMap::new();
    let mut span = MintTimeSpan::default();

    for trade in trades {
        span.observe(trade.timestamp);

        let token_amount = trade.token_amount / TOKEN_AMOUNT_DIVISOR;
        let sol_amount = trade.sol_amount / LAMPORTS_PER_SOL;

        let acc = accumulators.entry(trade.user.clone()).or_default();
        if trade.is_buy {
            acc.buy_token_amount += token_amount;
            acc.buy_sol_amount += sol_amount;
            acc.buys += 1;
        } else {
            acc.sell_token_amount += token_amount;
            acc.sell_sol_amount += sol_amount;
            acc.sells += 1;
        }
    }

    (accumulators, span)
}

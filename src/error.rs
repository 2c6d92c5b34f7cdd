use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Subscription error: {0}")]
    SubscriptionError(String),

    #[error("Solana RPC error: {0}")]
    RpcError(String),

    #[error("Trade API error: {0}")]
    TradeApiError(String),

    #[error("Price API error: {0}")]
    PriceApiError(String),
}

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::analysis::aggregator::aggregate_trades;
use crate::analysis::report::ReportBuilder;
use crate::api::pumpfun::PumpfunClient;
use crate::models::report::MintReport;
use crate::solana::client::SolanaClient;

/// One launch's sequential processing chain. Each detected launch runs its
/// own instance to completion inside a spawned task; all state here is
/// per-pipeline, only the report channel is shared.
pub struct LaunchPipeline {
    solana: SolanaClient,
    trades: PumpfunClient,
    builder: ReportBuilder,
    report_tx: mpsc::Sender<(String, MintReport)>,
}

impl LaunchPipeline {
    pub fn new(
        solana: SolanaClient,
        trades: PumpfunClient,
        builder: ReportBuilder,
        report_tx: mpsc::Sender<(String, MintReport)>,
    ) -> Self {
        Self {
            solana,
            trades,
            builder,
            report_tx,
        }
    }

    /// Resolve the signature to its launch mint, pull the full trade
    /// history, aggregate it, build the mint's report, and hand it to the
    /// report writer. A signature that resolves to no mint is dropped
    /// without error; anything else propagates for the caller to log.
    pub async fn process_launch(&self, signature: &str) -> Result<()> {
        let mint = match self.solana.get_launch_mint(signature).await? {
            Some(mint) => mint,
            None => {
                debug!("No non-native mint in pre-balances for {}", signature);
                return Ok(());
            }
        };
        info!("Resolved launch {} to mint {}", signature, mint);

        let trades = self.trades.get_all_trades(&mint).await?;
        let (accumulators, span) = aggregate_trades(&trades);

        let report = self.builder.build_mint_report(&mint, accumulators, span).await;

        self.report_tx
            .send((mint, report))
            .await
            .map_err(|_| anyhow!("Report writer is gone"))?;
        Ok(())
    }
}

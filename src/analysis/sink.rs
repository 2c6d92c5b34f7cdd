use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::models::report::{MintReport, Report};

/// Owns the merged mint -> report store and the output artifact. Completed
/// reports arrive over the channel; the file is rewritten wholesale after
/// each merge so it always holds every mint processed since startup.
pub struct ReportWriter {
    output_file: PathBuf,
    store: Report,
    report_rx: mpsc::Receiver<(String, MintReport)>,
}

impl ReportWriter {
    pub fn new(output_file: PathBuf, report_rx: mpsc::Receiver<(String, MintReport)>) -> Self {
        Self {
            output_file,
            store: Report::new(),
            report_rx,
        }
    }

    pub async fn run(mut self) {
        while let Some((mint, report)) = self.report_rx.recv().await {
            self.store.insert(mint, report);
            if let Err(e) = self.write().await {
                error!("Failed to write report file: {:?}", e);
            }
        }
    }

    async fn write(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.store)
            .context("Failed to serialize report store")?;
        tokio::fs::write(&self.output_file, json)
            .await
            .with_context(|| format!("Failed to write {}", self.output_file.display()))?;
        info!("Results written to {}", self.output_file.display());
        Ok(())
    }
}

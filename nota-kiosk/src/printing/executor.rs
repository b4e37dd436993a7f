//! Receipt print executor
//!
//! Runs the whole pipeline for one receipt: layout, protocol encoding and
//! submission to a print service.

use nota_printer::{
    CancellationToken, EncodedJob, Encoder, EncodingError, JobEncoder, JobResult, JobSubmitter,
    PaperProfile, PrintError, PrintService, Substitution,
};
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::layout::{LayoutEngine, LayoutError};
use super::types::Receipt;
use crate::core::Config;

#[derive(Debug, Error)]
pub enum PrintExecutorError {
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Invalid printer config: {0}")]
    Config(#[from] PrintError),
}

pub type PrintExecutorResult<T> = Result<T, PrintExecutorError>;

/// Outcome of printing one receipt
#[derive(Debug, Clone)]
pub struct PrintReport {
    pub job: JobResult,
    /// Characters printed as the substitute glyph
    pub substitutions: Vec<Substitution>,
    /// Size of the submitted job in bytes
    pub bytes: usize,
}

/// Receipt print executor
///
/// Layout or encoding problems are errors: nothing is sent. Once bytes
/// exist, every submission outcome is reported in [`PrintReport::job`].
#[derive(Debug, Clone)]
pub struct ReceiptPrinter {
    layout: LayoutEngine,
    encoder: Encoder,
    profile: PaperProfile,
    submitter: JobSubmitter,
}

impl ReceiptPrinter {
    pub fn new(
        layout: LayoutEngine,
        encoder: Encoder,
        profile: PaperProfile,
        submitter: JobSubmitter,
    ) -> Self {
        Self {
            layout,
            encoder,
            profile,
            submitter,
        }
    }

    /// Build the pipeline from configuration
    pub fn from_config(config: &Config) -> PrintExecutorResult<Self> {
        let profile = config.paper_profile()?;
        profile.encoding().ensure_supported()?;
        Ok(Self::new(
            LayoutEngine::new(config.price_format),
            config.protocol.encoder(config.encode),
            profile,
            JobSubmitter::new(config.retry),
        ))
    }

    pub fn profile(&self) -> &PaperProfile {
        &self.profile
    }

    /// Lay out and encode a receipt without sending it
    pub fn prepare(&self, receipt: &Receipt) -> PrintExecutorResult<EncodedJob> {
        let lines = self.layout.render(receipt, &self.profile)?;
        Ok(self.encoder.encode(&lines, &self.profile)?)
    }

    /// Print a receipt on `printer_id`
    #[instrument(skip(self, receipt, service, cancel), fields(order_id = receipt.order_id()))]
    pub async fn print<S: PrintService>(
        &self,
        receipt: &Receipt,
        printer_id: &str,
        service: &S,
        cancel: &CancellationToken,
    ) -> PrintExecutorResult<PrintReport> {
        let job = self.prepare(receipt)?;
        let result = self
            .submitter
            .submit(&job.bytes, printer_id, service, cancel)
            .await;

        if result.is_submitted() {
            info!(
                printer_id = result.printer_id.as_deref(),
                bytes = job.bytes.len(),
                attempts = result.attempts,
                substitutions = job.substitution_count(),
                "Receipt printed"
            );
        } else {
            let detail = result.error_detail().unwrap_or_default();
            warn!(printer_id, status = ?result.status, error = %detail, "Receipt not printed");
        }

        Ok(PrintReport {
            bytes: job.bytes.len(),
            substitutions: job.substitutions,
            job: result,
        })
    }
}

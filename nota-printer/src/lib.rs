//! # nota-printer
//!
//! Thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - Code pages with lossy-but-total text encoding (CP437, WPC1252, CP866,
//!   GBK, ASCII and UTF-8 folded to ASCII)
//! - ESC/POS command building and protocol encoders (ESC/POS, plain text)
//! - The print-service contract and raw TCP printing (port 9100)
//! - Job submission with bounded retry, deadline and cancellation
//!
//! Business logic (WHAT to print) stays in application code:
//! - Receipt layout → nota-kiosk
//!
//! ## Example
//!
//! ```ignore
//! use nota_printer::{
//!     EncodeOptions, FormattedLine, JobEncoder, JobSubmitter, PaperProfile, Protocol,
//! };
//!
//! let profile = PaperProfile::mm58();
//! let lines = vec![FormattedLine::left("Terima kasih")];
//! let job = Protocol::EscPosRaw
//!     .encoder(EncodeOptions::default())
//!     .encode(&lines, &profile)?;
//!
//! let result = JobSubmitter::default()
//!     .submit(&job.bytes, "POS58 Printer", &service, &cancel)
//!     .await;
//! ```

mod encoder;
mod encoding;
mod error;
mod escpos;
mod line;
mod printer;
mod profile;
mod submitter;

// Re-exports
pub use encoder::{
    EncodeOptions, EncodedJob, Encoder, EscPosEncoder, JobEncoder, PlainTextEncoder, Protocol,
    Substitution,
};
pub use encoding::{CodePage, EncodedText, SUBSTITUTE};
pub use error::{EncodingError, EncodingResult, PrintError, PrintResult, SubmissionError};
pub use escpos::EscPosBuilder;
pub use line::{Align, FormattedLine, TextStyle};
pub use printer::{JobOutcome, NetworkPrintService, NetworkPrinter, PrintService, Printer, PrinterInfo};
pub use profile::PaperProfile;
pub use submitter::{JobResult, JobStatus, JobSubmitter, RetryPolicy};

// Cancellation token accepted by `JobSubmitter::submit`
pub use tokio_util::sync::CancellationToken;

//! Error types for the printer library

use thiserror::Error;

use crate::encoding::CodePage;

/// Printer transport and configuration errors
#[derive(Debug, Error)]
pub enum PrintError {
    /// Network connection error
    #[error("Connection failed: {0}")]
    Connection(String),

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Timeout waiting for printer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer or paper configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;

/// Encoder errors
///
/// Per-character substitution never fails; only a code page the encoder has
/// no mapping for does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("Unsupported code page: {0}")]
    UnsupportedCodePage(CodePage),
}

/// Result type for encoding
pub type EncodingResult<T> = Result<T, EncodingError>;

/// Submission failures, classified for the retry policy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Printer id is not among the collaborator's services (permanent)
    #[error("Printer not found: {0}")]
    PrinterNotFound(String),

    /// Device unreachable or busy (transient)
    #[error("Device busy: {0}")]
    DeviceBusy(String),

    /// Job rejected by the print service (permanent)
    #[error("Job rejected: {0}")]
    Rejected(String),

    /// Total wall-clock ceiling reached
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Cancellation token fired between attempts
    #[error("cancelled")]
    Cancelled,
}

impl SubmissionError {
    /// Whether another attempt may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DeviceBusy(_))
    }
}

//! Receipt Printing Module
//!
//! WHAT the kiosk prints:
//! - Receipt model and price formatting
//! - Layout to fixed-width lines for a paper profile
//! - The render → encode → submit pipeline

pub mod executor;
pub mod layout;
pub mod price;
pub mod types;

pub use executor::{PrintExecutorError, PrintExecutorResult, PrintReport, ReceiptPrinter};
pub use layout::{LayoutEngine, LayoutError, LayoutResult};
pub use price::PriceFormat;
pub use types::*;

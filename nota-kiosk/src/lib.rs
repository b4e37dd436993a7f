//! # nota-kiosk
//!
//! Receipt printing for a shop kiosk: receipt model, price formatting,
//! fixed-width layout and the pipeline onto `nota-printer`.

pub mod core;
pub mod printing;
pub mod utils;

pub use core::Config;
pub use printing::{
    LayoutEngine, LayoutError, LineItem, PriceFormat, PrintExecutorError, PrintReport, Receipt,
    ReceiptBuilder, ReceiptError, ReceiptPrinter,
};

/// Load `.env` and initialize logging from the environment
///
/// Returns the loaded configuration.
pub fn setup_environment() -> Config {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    utils::init_logger_with_file(
        Some(config.log_level.as_str()),
        config.log_json,
        config.log_dir.as_deref(),
    );
    config
}

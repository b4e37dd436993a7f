use std::str::FromStr;
use std::time::Duration;

use nota_printer::{CodePage, EncodeOptions, PaperProfile, PrintResult, Protocol, RetryPolicy};
use serde::{Deserialize, Serialize};

use crate::printing::PriceFormat;

/// Kiosk printing configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | PRINTER_ID | POS58 Printer | Printer id or display name (case-insensitive) |
/// | PRINTER_ADDR | 192.168.1.100:9100 | Raw TCP address of the printer |
/// | PAPER_COLUMNS | 32 | Characters per line (58mm: 32, 80mm: 48) |
/// | CODE_PAGE | cp437 | ascii, cp437, cp866, wpc1252, gbk, utf8 |
/// | PRICE_FORMAT | thousands | decimal, grouped, thousands |
/// | CURRENCY_SYMBOL | Rp | Symbol printed before amounts |
/// | PRINT_PROTOCOL | escpos | escpos, plain_text |
/// | CUT_PAPER | true | Feed and cut after the receipt |
/// | OPEN_DRAWER | false | Pulse the cash drawer |
/// | FEED_LINES | 3 | Lines fed before the cut |
/// | MAX_RETRIES | 2 | Retries for transient failures |
/// | RETRY_BACKOFF_MS | 500 | First retry delay, doubled per retry |
/// | MAX_BACKOFF_MS | 10000 | Cap on a single retry delay |
/// | DEADLINE_MS | 60000 | Ceiling across all attempts, 0 for none |
/// | LOG_LEVEL | info | tracing filter directive |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_DIR | (unset) | Directory for daily rolling log files |
///
/// # Example
///
/// ```ignore
/// PRINTER_ADDR=10.0.0.7:9100 PAPER_COLUMNS=48 PRICE_FORMAT=grouped cargo run
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub printer_id: String,
    pub printer_addr: String,
    pub paper_columns: usize,
    pub code_page: CodePage,
    pub price_format: PriceFormat,
    pub currency_symbol: String,
    pub protocol: Protocol,
    pub encode: EncodeOptions,
    pub retry: RetryPolicy,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let encode = EncodeOptions::default();
        let retry = RetryPolicy::default();

        Self {
            printer_id: lookup("PRINTER_ID").unwrap_or_else(|| "POS58 Printer".into()),
            printer_addr: lookup("PRINTER_ADDR").unwrap_or_else(|| "192.168.1.100:9100".into()),
            paper_columns: parse_or(&lookup, "PAPER_COLUMNS", 32),
            code_page: parse_or(&lookup, "CODE_PAGE", CodePage::Cp437),
            price_format: parse_or(&lookup, "PRICE_FORMAT", PriceFormat::default()),
            currency_symbol: lookup("CURRENCY_SYMBOL").unwrap_or_else(|| "Rp".into()),
            protocol: parse_or(&lookup, "PRINT_PROTOCOL", Protocol::default()),
            encode: EncodeOptions {
                cut: parse_or(&lookup, "CUT_PAPER", encode.cut),
                open_drawer: parse_or(&lookup, "OPEN_DRAWER", encode.open_drawer),
                feed_lines: parse_or(&lookup, "FEED_LINES", encode.feed_lines),
            },
            retry: RetryPolicy {
                max_retries: parse_or(&lookup, "MAX_RETRIES", retry.max_retries),
                retry_backoff: parse_millis(&lookup, "RETRY_BACKOFF_MS", retry.retry_backoff),
                max_backoff: parse_millis(&lookup, "MAX_BACKOFF_MS", retry.max_backoff),
                deadline: match parse_var::<u64>(&lookup, "DEADLINE_MS") {
                    Some(0) => None,
                    Some(ms) => Some(Duration::from_millis(ms)),
                    None => retry.deadline,
                },
            },
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: parse_or(&lookup, "LOG_JSON", false),
            log_dir: lookup("LOG_DIR").filter(|dir| !dir.is_empty()),
        }
    }

    /// Paper profile for the configured width and code page
    pub fn paper_profile(&self) -> PrintResult<PaperProfile> {
        PaperProfile::new(self.paper_columns, self.code_page)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let value = lookup(key)?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value = %value, "Ignoring invalid config value");
            None
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    parse_var(lookup, key).unwrap_or(default)
}

fn parse_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Duration {
    parse_var(lookup, key)
        .map(Duration::from_millis)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.printer_id, "POS58 Printer");
        assert_eq!(config.paper_columns, 32);
        assert_eq!(config.code_page, CodePage::Cp437);
        assert_eq!(config.price_format, PriceFormat::Thousands);
        assert_eq!(config.protocol, Protocol::EscPosRaw);
        assert_eq!(config.encode, EncodeOptions::default());
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(config.log_dir.is_none());
        assert_eq!(config.paper_profile().unwrap(), PaperProfile::mm58());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PRINTER_ID", "kitchen"),
            ("PAPER_COLUMNS", "48"),
            ("CODE_PAGE", "gbk"),
            ("PRICE_FORMAT", "grouped"),
            ("PRINT_PROTOCOL", "plain_text"),
            ("OPEN_DRAWER", "true"),
            ("MAX_RETRIES", "5"),
            ("RETRY_BACKOFF_MS", "250"),
            ("DEADLINE_MS", "0"),
            ("LOG_DIR", "/var/log/nota"),
        ]);
        assert_eq!(config.printer_id, "kitchen");
        assert_eq!(config.paper_columns, 48);
        assert_eq!(config.code_page, CodePage::Gbk);
        assert_eq!(config.price_format, PriceFormat::Grouped);
        assert_eq!(config.protocol, Protocol::PlainText);
        assert!(config.encode.open_drawer);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.retry_backoff, Duration::from_millis(250));
        assert_eq!(config.retry.deadline, None);
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/nota"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[("PAPER_COLUMNS", "wide"), ("CODE_PAGE", "ebcdic")]);
        assert_eq!(config.paper_columns, 32);
        assert_eq!(config.code_page, CodePage::Cp437);
    }

    #[test]
    fn test_zero_columns_rejected_by_profile() {
        let config = config_from(&[("PAPER_COLUMNS", "0")]);
        assert!(config.paper_profile().is_err());
    }
}

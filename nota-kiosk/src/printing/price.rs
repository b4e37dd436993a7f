//! Price formatting
//!
//! Amounts are integer minor units; each [`PriceFormat`] is a row in a rule
//! table, so formatting is integer arithmetic only.

use std::str::FromStr;

use nota_printer::PrintError;
use serde::{Deserialize, Serialize};

/// How minor-unit amounts are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceFormat {
    /// Two fraction digits: `12000 → Rp120.00`
    Decimal,
    /// Whole units with dot grouping: `120000 → Rp 120.000`
    Grouped,
    /// Thousands with a `k` suffix: `120000 → Rp120k`, `12500 → Rp12.5k`
    #[default]
    Thousands,
}

struct FormatRule {
    divisor: u64,
    fraction_digits: usize,
    trim_fraction: bool,
    decimal_sep: char,
    group_sep: Option<char>,
    symbol_gap: &'static str,
    suffix: &'static str,
}

impl PriceFormat {
    const fn rule(self) -> FormatRule {
        match self {
            Self::Decimal => FormatRule {
                divisor: 100,
                fraction_digits: 2,
                trim_fraction: false,
                decimal_sep: '.',
                group_sep: None,
                symbol_gap: "",
                suffix: "",
            },
            Self::Grouped => FormatRule {
                divisor: 1,
                fraction_digits: 0,
                trim_fraction: false,
                decimal_sep: ',',
                group_sep: Some('.'),
                symbol_gap: " ",
                suffix: "",
            },
            Self::Thousands => FormatRule {
                divisor: 1000,
                fraction_digits: 3,
                trim_fraction: true,
                decimal_sep: '.',
                group_sep: None,
                symbol_gap: "",
                suffix: "k",
            },
        }
    }

    /// Format `minor` units with a currency symbol
    pub fn format(self, minor: u64, symbol: &str) -> String {
        let rule = self.rule();
        let whole = minor / rule.divisor;
        let fraction = minor % rule.divisor;

        let mut out = String::from(symbol);
        if !symbol.is_empty() {
            out.push_str(rule.symbol_gap);
        }
        out.push_str(&group_digits(whole, rule.group_sep));

        if rule.fraction_digits > 0 {
            let mut digits = format!("{:0width$}", fraction, width = rule.fraction_digits);
            if rule.trim_fraction {
                digits.truncate(digits.trim_end_matches('0').len());
            }
            if !digits.is_empty() {
                out.push(rule.decimal_sep);
                out.push_str(&digits);
            }
        }

        out.push_str(rule.suffix);
        out
    }
}

impl FromStr for PriceFormat {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "decimal" => Ok(Self::Decimal),
            "grouped" => Ok(Self::Grouped),
            "thousands" => Ok(Self::Thousands),
            other => Err(PrintError::InvalidConfig(format!(
                "Unknown price format: {}",
                other
            ))),
        }
    }
}

fn group_digits(value: u64, sep: Option<char>) -> String {
    let digits = value.to_string();
    let Some(sep) = sep else {
        return digits;
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal() {
        assert_eq!(PriceFormat::Decimal.format(12000, "Rp"), "Rp120.00");
        assert_eq!(PriceFormat::Decimal.format(5, "$"), "$0.05");
        assert_eq!(PriceFormat::Decimal.format(199, ""), "1.99");
    }

    #[test]
    fn test_grouped() {
        assert_eq!(PriceFormat::Grouped.format(120000, "Rp"), "Rp 120.000");
        assert_eq!(PriceFormat::Grouped.format(1234567, "Rp"), "Rp 1.234.567");
        assert_eq!(PriceFormat::Grouped.format(0, "Rp"), "Rp 0");
        assert_eq!(PriceFormat::Grouped.format(999, ""), "999");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(PriceFormat::Thousands.format(120000, "Rp"), "Rp120k");
        assert_eq!(PriceFormat::Thousands.format(50000, "Rp"), "Rp50k");
        assert_eq!(PriceFormat::Thousands.format(12500, "Rp"), "Rp12.5k");
        assert_eq!(PriceFormat::Thousands.format(12050, "Rp"), "Rp12.05k");
        assert_eq!(PriceFormat::Thousands.format(50, "Rp"), "Rp0.05k");
    }

    #[test]
    fn test_extreme_amount() {
        assert_eq!(
            PriceFormat::Grouped.format(u64::MAX, ""),
            "18.446.744.073.709.551.615"
        );
    }

    #[test]
    fn test_rule_table_consistent() {
        for format in [PriceFormat::Decimal, PriceFormat::Grouped, PriceFormat::Thousands] {
            let rule = format.rule();
            assert_eq!(rule.divisor, 10u64.pow(rule.fraction_digits as u32));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Grouped".parse::<PriceFormat>().unwrap(), PriceFormat::Grouped);
        assert!(matches!(
            "guess".parse::<PriceFormat>(),
            Err(PrintError::InvalidConfig(msg)) if msg.contains("guess")
        ));
    }
}

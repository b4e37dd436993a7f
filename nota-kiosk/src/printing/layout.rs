//! Receipt layout
//!
//! Turns a [`Receipt`] into fixed-width [`FormattedLine`]s for a
//! [`PaperProfile`]. Widths are measured in printed columns of the profile's
//! code page, so every line fits the paper before it reaches an encoder.
//!
//! Layout:
//!
//! ```text
//!         TOKO BUNGA ARDI         <- first header line, bold + double height
//! ================================
//! ID      : 000123
//! Tanggal : 19/10/2026 14:05
//! --------------------------------
//! Bucket Roses            1x Rp50k
//! Lily White              2x Rp70k
//! --------------------------------
//! TOTAL                     Rp120k <- bold
//! ================================
//!           Terima kasih
//! ```

use nota_printer::{Align, CodePage, FormattedLine, PaperProfile, SUBSTITUTE, TextStyle};
use thiserror::Error;

use super::price::PriceFormat;
use super::types::{LineItem, Receipt};

/// Narrowest name column before item rows fall back to stacked lines
const MIN_NAME_WIDTH: usize = 4;

const TOTAL_LABEL: &str = "TOTAL";
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),
}

pub type LayoutResult<T> = Result<T, LayoutError>;

/// Receipt layout engine
///
/// Pure and deterministic: the same receipt and profile always give the
/// same lines, and the receipt is only read.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutEngine {
    price_format: PriceFormat,
}

impl LayoutEngine {
    pub fn new(price_format: PriceFormat) -> Self {
        Self { price_format }
    }

    pub fn price_format(&self) -> PriceFormat {
        self.price_format
    }

    /// Lay out a receipt for the given paper
    pub fn render(
        &self,
        receipt: &Receipt,
        profile: &PaperProfile,
    ) -> LayoutResult<Vec<FormattedLine>> {
        let page = Page {
            width: profile.columns(),
            code_page: profile.encoding(),
        };
        let mut lines = Vec::new();

        // Header
        for (i, text) in receipt.header().iter().enumerate() {
            let style = if i == 0 { TextStyle::TITLE } else { TextStyle::PLAIN };
            lines.push(page.centered(text).with_style(style));
        }
        if !lines.is_empty() {
            lines.push(page.separator('='));
        }

        // Order id, timestamp, details
        let meta = self.render_meta(receipt, &page);
        if !meta.is_empty() {
            lines.extend(meta);
            lines.push(page.separator('-'));
        }

        // Items
        let total = self.render_items(receipt, &page, &mut lines)?;
        if !receipt.items().is_empty() {
            lines.push(page.separator('-'));
        }

        // Total
        let total_text = self.price_format.format(total, receipt.currency_symbol());
        self.render_total(&total_text, &page, &mut lines);

        // Notes and footer
        if receipt.notes().is_some() || !receipt.footer().is_empty() {
            lines.push(page.separator('='));
        }
        if let Some(notes) = receipt.notes() {
            for part in page.wrap(notes, page.width) {
                lines.push(page.centered(&part));
            }
        }
        for text in receipt.footer() {
            lines.push(page.centered(text));
        }

        tracing::debug!(
            lines = lines.len(),
            columns = page.width,
            items = receipt.items().len(),
            "Receipt laid out"
        );
        Ok(lines)
    }

    fn render_meta(&self, receipt: &Receipt, page: &Page) -> Vec<FormattedLine> {
        let mut rows: Vec<(&str, String)> = Vec::new();
        if let Some(id) = receipt.order_id() {
            rows.push(("ID", format!("{:0>6}", id)));
        }
        if let Some(at) = receipt.issued_at() {
            rows.push(("Tanggal", at.format(TIMESTAMP_FORMAT).to_string()));
        }
        for (label, value) in receipt.details() {
            rows.push((label.as_str(), value.clone()));
        }

        let label_width = rows
            .iter()
            .map(|(label, _)| page.code_page.text_width(label))
            .max()
            .unwrap_or(0);

        let mut lines = Vec::new();
        for (label, value) in rows {
            let prefix = format!("{} : ", page.code_page.pad(label, label_width, false));
            let prefix_width = page.code_page.text_width(&prefix);

            if page.width >= prefix_width + MIN_NAME_WIDTH {
                let indent = " ".repeat(prefix_width);
                let parts = page.wrap(&value, page.width - prefix_width);
                for (i, part) in parts.into_iter().enumerate() {
                    let lead = if i == 0 { &prefix } else { &indent };
                    lines.push(FormattedLine::left(format!("{}{}", lead, part)));
                }
            } else {
                for part in page.wrap(&format!("{}{}", prefix.trim_end(), value), page.width) {
                    lines.push(FormattedLine::left(part));
                }
            }
        }
        lines
    }

    /// Item rows; returns the receipt total
    fn render_items(
        &self,
        receipt: &Receipt,
        page: &Page,
        lines: &mut Vec<FormattedLine>,
    ) -> LayoutResult<u64> {
        let mut rows = Vec::with_capacity(receipt.items().len());
        for item in receipt.items() {
            let subtotal = subtotal(item)?;
            rows.push(ItemRow {
                name: item.name(),
                quantity: format!("{}x", item.quantity()),
                price: self.price_format.format(subtotal, receipt.currency_symbol()),
                subtotal,
            });
        }

        let total = rows.iter().try_fold(0u64, |sum, row| {
            sum.checked_add(row.subtotal)
                .ok_or_else(|| LayoutError::AmountOverflow("receipt total".to_string()))
        })?;

        let qty_width = rows
            .iter()
            .map(|row| page.code_page.text_width(&row.quantity))
            .max()
            .unwrap_or(0);
        let price_width = rows
            .iter()
            .map(|row| page.code_page.text_width(&row.price))
            .max()
            .unwrap_or(0);
        let name_width = page.width.saturating_sub(qty_width + price_width + 2);

        for row in &rows {
            if name_width >= MIN_NAME_WIDTH {
                let parts = page.wrap(row.name, name_width);
                for (i, part) in parts.iter().enumerate() {
                    let (qty, price) = if i == 0 {
                        (row.quantity.as_str(), row.price.as_str())
                    } else {
                        ("", "")
                    };
                    lines.push(FormattedLine::left(format!(
                        "{} {} {}",
                        page.code_page.pad(part, name_width, false),
                        page.code_page.pad(qty, qty_width, true),
                        page.code_page.pad(price, price_width, true),
                    )));
                }
            } else {
                // Too narrow for three columns: name, then amounts on their own line
                for part in page.wrap(row.name, page.width) {
                    lines.push(FormattedLine::left(part));
                }
                for part in page.wrap(&format!("{} {}", row.quantity, row.price), page.width) {
                    lines.push(page.right(&part));
                }
            }
        }

        Ok(total)
    }

    fn render_total(&self, total_text: &str, page: &Page, lines: &mut Vec<FormattedLine>) {
        let label_width = TOTAL_LABEL.len();
        let value_width = page.code_page.text_width(total_text);

        if label_width + 1 + value_width <= page.width {
            let gap = page.width - label_width - value_width;
            lines.push(FormattedLine::new(
                format!("{}{}{}", TOTAL_LABEL, " ".repeat(gap), total_text),
                Align::Right,
                TextStyle::BOLD,
            ));
            return;
        }

        for part in page.wrap(TOTAL_LABEL, page.width) {
            lines.push(FormattedLine::left(part).with_style(TextStyle::BOLD));
        }
        for part in page.wrap(total_text, page.width) {
            lines.push(page.right(&part).with_style(TextStyle::BOLD));
        }
    }
}

struct ItemRow<'a> {
    name: &'a str,
    quantity: String,
    price: String,
    subtotal: u64,
}

fn subtotal(item: &LineItem) -> LayoutResult<u64> {
    item.subtotal_minor()
        .ok_or_else(|| LayoutError::AmountOverflow(item.name().to_string()))
}

/// Paper width and the code page that measures it
struct Page {
    width: usize,
    code_page: CodePage,
}

impl Page {
    /// Center text, left-padded with `floor((W - L) / 2)` spaces
    ///
    /// Text as wide as the paper or wider is truncated with no padding.
    fn centered(&self, text: &str) -> FormattedLine {
        FormattedLine::new(center(text, self.width, self.code_page), Align::Center, TextStyle::PLAIN)
    }

    fn right(&self, text: &str) -> FormattedLine {
        FormattedLine::new(
            self.code_page.pad(text.trim(), self.width, true),
            Align::Right,
            TextStyle::PLAIN,
        )
    }

    fn separator(&self, ch: char) -> FormattedLine {
        FormattedLine::left(ch.to_string().repeat(self.width))
    }

    fn wrap(&self, text: &str, width: usize) -> Vec<String> {
        wrap(text, width, self.code_page)
    }
}

fn center(text: &str, width: usize, code_page: CodePage) -> String {
    let text = text.trim();
    let text_width = code_page.text_width(text);
    if text_width >= width {
        return code_page.truncate(text, width);
    }
    format!("{}{}", " ".repeat((width - text_width) / 2), text)
}

/// Word-wrap to `width` columns
///
/// Words wider than the line are hard-broken. Always returns at least one
/// line, and no line is wider than `width`.
fn wrap(text: &str, width: usize, code_page: CodePage) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = code_page.text_width(word);

        if current_width > 0 && current_width + 1 + word_width <= width {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
            continue;
        }
        if current_width > 0 {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if word_width <= width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }

        for c in word.chars() {
            let (c, char_width) = match code_page.char_width(c) {
                w if w > width => (SUBSTITUTE, 1),
                w => (c, w),
            };
            if current_width + char_width > width {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(c);
            current_width += char_width;
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

//! Receipt printing types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiptError {
    #[error("Quantity must be at least 1 for item: {0}")]
    ZeroQuantity(String),
}

/// One purchased product
///
/// Amounts are integer minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LineItemFields")]
pub struct LineItem {
    name: String,
    quantity: u32,
    unit_price_minor: u64,
}

#[derive(Deserialize)]
struct LineItemFields {
    name: String,
    quantity: u32,
    unit_price_minor: u64,
}

impl TryFrom<LineItemFields> for LineItem {
    type Error = ReceiptError;

    fn try_from(fields: LineItemFields) -> Result<Self, Self::Error> {
        Self::new(fields.name, fields.quantity, fields.unit_price_minor)
    }
}

impl LineItem {
    pub fn new(
        name: impl Into<String>,
        quantity: u32,
        unit_price_minor: u64,
    ) -> Result<Self, ReceiptError> {
        let name = name.into();
        if quantity == 0 {
            return Err(ReceiptError::ZeroQuantity(name));
        }
        Ok(Self {
            name,
            quantity,
            unit_price_minor,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price_minor(&self) -> u64 {
        self.unit_price_minor
    }

    /// `quantity × unit price`, `None` on overflow
    pub fn subtotal_minor(&self) -> Option<u64> {
        self.unit_price_minor.checked_mul(u64::from(self.quantity))
    }
}

/// A receipt to lay out, immutable once built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    header: Vec<String>,
    items: Vec<LineItem>,
    footer: Vec<String>,
    currency_symbol: String,
    order_id: Option<String>,
    issued_at: Option<NaiveDateTime>,
    details: Vec<(String, String)>,
    notes: Option<String>,
}

impl Receipt {
    pub fn builder() -> ReceiptBuilder {
        ReceiptBuilder::default()
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn footer(&self) -> &[String] {
        &self.footer
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    pub fn issued_at(&self) -> Option<NaiveDateTime> {
        self.issued_at
    }

    /// Labelled detail rows (buyer, recipient, payment method ...)
    pub fn details(&self) -> &[(String, String)] {
        &self.details
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Builder for [`Receipt`]
#[derive(Debug, Clone)]
pub struct ReceiptBuilder {
    receipt: Receipt,
}

impl Default for ReceiptBuilder {
    fn default() -> Self {
        Self {
            receipt: Receipt {
                header: Vec::new(),
                items: Vec::new(),
                footer: Vec::new(),
                currency_symbol: "Rp".to_string(),
                order_id: None,
                issued_at: None,
                details: Vec::new(),
                notes: None,
            },
        }
    }
}

impl ReceiptBuilder {
    pub fn header_line(mut self, line: impl Into<String>) -> Self {
        self.receipt.header.push(line.into());
        self
    }

    pub fn item(mut self, item: LineItem) -> Self {
        self.receipt.items.push(item);
        self
    }

    pub fn items(mut self, items: impl IntoIterator<Item = LineItem>) -> Self {
        self.receipt.items.extend(items);
        self
    }

    pub fn footer_line(mut self, line: impl Into<String>) -> Self {
        self.receipt.footer.push(line.into());
        self
    }

    pub fn currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.receipt.currency_symbol = symbol.into();
        self
    }

    pub fn order_id(mut self, id: impl Into<String>) -> Self {
        self.receipt.order_id = Some(id.into());
        self
    }

    pub fn issued_at(mut self, at: NaiveDateTime) -> Self {
        self.receipt.issued_at = Some(at);
        self
    }

    pub fn detail(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.receipt.details.push((label.into(), value.into()));
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.receipt.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> Receipt {
        self.receipt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_quantity_rejected() {
        assert_eq!(
            LineItem::new("Lily White", 0, 35000),
            Err(ReceiptError::ZeroQuantity("Lily White".to_string()))
        );
    }

    #[test]
    fn test_subtotal_is_integer_exact() {
        let item = LineItem::new("Lily White", 2, 35000).unwrap();
        assert_eq!(item.subtotal_minor(), Some(70000));

        let huge = LineItem::new("Gold", 3, u64::MAX / 2).unwrap();
        assert_eq!(huge.subtotal_minor(), None);
    }

    #[test]
    fn test_deserialize_validates_quantity() {
        let ok: LineItem =
            serde_json::from_str(r#"{"name":"Roses","quantity":1,"unit_price_minor":50000}"#)
                .unwrap();
        assert_eq!(ok.unit_price_minor(), 50000);

        let zero = serde_json::from_str::<LineItem>(
            r#"{"name":"Roses","quantity":0,"unit_price_minor":50000}"#,
        );
        assert!(zero.is_err());
    }

    #[test]
    fn test_builder_defaults() {
        let receipt = Receipt::builder()
            .header_line("TOKO BUNGA ARDI")
            .item(LineItem::new("Bucket Roses", 1, 50000).unwrap())
            .build();
        assert_eq!(receipt.currency_symbol(), "Rp");
        assert_eq!(receipt.items().len(), 1);
        assert!(receipt.order_id().is_none());
        assert!(receipt.footer().is_empty());
    }
}

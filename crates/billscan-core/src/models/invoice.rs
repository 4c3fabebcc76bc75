//! Invoice record produced by the text parser.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Structured invoice data extracted from OCR text.
///
/// Header fields that were not found keep their defaults: empty strings and a
/// zero total. The record is built once per parse and exposes read-only
/// accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    invoice_number: String,
    vendor_name: String,
    date: String,
    total_amount: Decimal,
    line_items: Vec<LineItem>,
}

/// A single purchased item row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    description: String,
    quantity: u32,
    unit_price: Decimal,
}

impl InvoiceRecord {
    /// Assemble a record from already extracted values.
    pub fn new(
        invoice_number: impl Into<String>,
        vendor_name: impl Into<String>,
        date: impl Into<String>,
        total_amount: Decimal,
        line_items: Vec<LineItem>,
    ) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            vendor_name: vendor_name.into(),
            date: date.into(),
            total_amount,
            line_items,
        }
    }

    /// Invoice number digits as they appeared in the text.
    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    /// Name following the `BILLED TO:` marker.
    pub fn vendor_name(&self) -> &str {
        &self.vendor_name
    }

    /// Free-form date text, e.g. `14 March 2024`.
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Line items in source order.
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Interpret the free-form date as a calendar date.
    ///
    /// Accepts full and abbreviated English month names (`14 March 2024`,
    /// `14 Mar 2024`). Returns `None` for anything else, including dates that
    /// do not exist.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%d %B %Y").ok()
    }

    /// Sum of `quantity * unit_price` over all line items.
    ///
    /// `None` when a line total or the sum exceeds the `Decimal` range.
    pub fn line_items_total(&self) -> Option<Decimal> {
        self.line_items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line_total()?))
    }

    /// Whether any header field is empty or the total is zero.
    ///
    /// Absent and malformed fields are indistinguishable here; use
    /// [`crate::invoice::ExtractionResult`] when the difference matters.
    pub fn is_low_confidence(&self) -> bool {
        self.invoice_number.is_empty()
            || self.vendor_name.is_empty()
            || self.date.is_empty()
            || self.total_amount.is_zero()
    }
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Quantity multiplied by unit price, `None` on overflow.
    pub fn line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

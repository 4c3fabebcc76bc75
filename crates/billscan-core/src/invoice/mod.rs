//! Invoice field extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, FieldReport, FieldStatus, LineInvoiceParser};

use crate::models::invoice::InvoiceRecord;

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Extract the invoice together with per-field diagnostics.
    fn extract(&self, text: &str) -> ExtractionResult;

    /// Extract only the invoice record.
    fn parse(&self, text: &str) -> InvoiceRecord {
        self.extract(text).invoice
    }
}

/// Parse OCR text into an invoice record.
///
/// Never fails: unmatched or malformed content leaves the affected fields at
/// their defaults.
pub fn parse(text: &str) -> InvoiceRecord {
    LineInvoiceParser::new().parse(text)
}

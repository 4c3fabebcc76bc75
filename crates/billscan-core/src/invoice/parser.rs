//! Line-oriented invoice parser.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::models::invoice::{InvoiceRecord, LineItem};

use super::InvoiceParser;
use super::rules::{LineMatch, classify_line};

/// Confidence lost per missing header field or empty item list.
const CONFIDENCE_PENALTY: f32 = 0.2;

/// Outcome of looking for a header field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// No line carried the field's marker.
    #[default]
    Missing,
    /// The last matching line produced a usable value.
    Found,
    /// The last matching line had the marker but no usable value.
    Malformed,
}

/// Status of every header field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldReport {
    pub invoice_number: FieldStatus,
    pub vendor_name: FieldStatus,
    pub date: FieldStatus,
    pub total_amount: FieldStatus,
}

impl FieldReport {
    fn entries(&self) -> [(&'static str, FieldStatus); 4] {
        [
            ("invoice number", self.invoice_number),
            ("vendor name", self.vendor_name),
            ("date", self.date),
            ("total amount", self.total_amount),
        ]
    }
}

/// Result of invoice extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub invoice: InvoiceRecord,
    /// Per-field diagnostics.
    pub fields: FieldReport,
    /// Item-shaped lines dropped because a number did not parse.
    pub rejected_lines: usize,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Heuristic confidence (0.0 - 1.0).
    pub confidence: f32,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Parser that reads the text one line at a time, letting the first matching
/// rule claim each line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineInvoiceParser;

impl LineInvoiceParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }
}

impl InvoiceParser for LineInvoiceParser {
    fn extract(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        info!("Parsing invoice from {} characters of text", text.len());

        let builder = text
            .split('\n')
            .fold(RecordBuilder::default(), RecordBuilder::apply);

        let mut result = builder.finish();
        result.processing_time_ms = start.elapsed().as_millis() as u64;

        debug!(
            "Extracted invoice '{}' with {} line items, confidence {:.2}",
            result.invoice.invoice_number(),
            result.invoice.line_items().len(),
            result.confidence
        );

        result
    }
}

/// In-progress invoice, threaded through the fold over lines.
#[derive(Debug, Default)]
struct RecordBuilder {
    invoice_number: String,
    vendor_name: String,
    date: String,
    total_amount: Decimal,
    line_items: Vec<LineItem>,
    fields: FieldReport,
    rejected_lines: usize,
}

impl RecordBuilder {
    fn apply(mut self, line: &str) -> Self {
        match classify_line(line) {
            LineMatch::InvoiceNumber(number) => {
                self.invoice_number = number;
                self.fields.invoice_number = FieldStatus::Found;
            }
            LineMatch::VendorName(vendor) => {
                self.fields.vendor_name = if vendor.is_empty() {
                    FieldStatus::Malformed
                } else {
                    FieldStatus::Found
                };
                self.vendor_name = vendor;
            }
            LineMatch::Date(date) => {
                self.date = date;
                self.fields.date = FieldStatus::Found;
            }
            LineMatch::Total(Some(amount)) => {
                self.total_amount = amount;
                self.fields.total_amount = FieldStatus::Found;
            }
            LineMatch::Total(None) => {
                self.fields.total_amount = FieldStatus::Malformed;
            }
            LineMatch::Item(item) => self.line_items.push(item),
            LineMatch::RejectedItem => self.rejected_lines += 1,
            LineMatch::Unmatched => {}
        }
        self
    }

    fn finish(self) -> ExtractionResult {
        let mut warnings = Vec::new();
        let mut penalties = 0u8;

        for (name, status) in self.fields.entries() {
            match status {
                FieldStatus::Found => {}
                FieldStatus::Missing => {
                    warnings.push(format!("Could not find {}", name));
                    penalties += 1;
                }
                FieldStatus::Malformed => {
                    warnings.push(format!("Found malformed {}", name));
                    penalties += 1;
                }
            }
        }

        if self.line_items.is_empty() {
            warnings.push("Could not extract line items".to_string());
            penalties += 1;
        }

        if self.rejected_lines > 0 {
            warnings.push(format!(
                "Dropped {} item-shaped lines with unparseable numbers",
                self.rejected_lines
            ));
        }

        ExtractionResult {
            invoice: InvoiceRecord::new(
                self.invoice_number,
                self.vendor_name,
                self.date,
                self.total_amount,
                self.line_items,
            ),
            fields: self.fields,
            rejected_lines: self.rejected_lines,
            warnings,
            confidence: (1.0 - CONFIDENCE_PENALTY * f32::from(penalties)).max(0.0),
            processing_time_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::parse;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const SAMPLE: &str = "ACME SUPPLY CO\n\
        Invoice No. 004521\n\
        BILLED TO: Globex Corporation\n\
        14 March 2024\n\
        \n\
        Item Qty Price Amount\n\
        Widget A 3 $10.50 $31.50\n\
        Gadget 2 $4.25 $8.50\n\
        Cable, braided 10 $1,000.00 $10,000.00\n\
        Sub Total $10,040.00\n\
        Tax 0.00\n\
        Total $10,040.00\n";

    #[test]
    fn test_parse_sample_invoice() {
        let record = parse(SAMPLE);

        assert_eq!(record.invoice_number(), "004521");
        assert_eq!(record.vendor_name(), "Globex Corporation");
        assert_eq!(record.date(), "14 March 2024");
        assert_eq!(record.total_amount(), dec("10040.00"));

        let items: Vec<(&str, u32, Decimal)> = record
            .line_items()
            .iter()
            .map(|i| (i.description(), i.quantity(), i.unit_price()))
            .collect();
        assert_eq!(
            items,
            vec![
                ("Widget A", 3, dec("10.50")),
                ("Gadget", 2, dec("4.25")),
                ("Cable, braided", 10, dec("1000.00")),
            ]
        );
    }

    #[test]
    fn test_single_field_lines() {
        assert_eq!(parse("Invoice No. 4521\n").invoice_number(), "4521");
        assert_eq!(parse("BILLED TO: Acme Corp\n").vendor_name(), "Acme Corp");
        assert_eq!(parse("Total $1,234.56\n").total_amount(), dec("1234.56"));

        let record = parse("Widget A 3 $10.50 x\n");
        assert_eq!(record.line_items(), &[LineItem::new("Widget A", 3, dec("10.50"))]);
    }

    #[test]
    fn test_header_line_excludes_item() {
        let record = parse("Total 5 $2.00 x");
        assert_eq!(record.total_amount(), dec("5"));
        assert!(record.line_items().is_empty());
    }

    #[test]
    fn test_last_total_wins() {
        let record = parse("Total $100.00\nSome note\nTotal $80.00\n");
        assert_eq!(record.total_amount(), dec("80.00"));
    }

    #[test]
    fn test_repeated_headers_overwrite() {
        let record = parse(
            "Invoice No. 1\nBILLED TO: First\n1 May 2024\nInvoice No. 2\nBILLED TO: Second\n2 June 2024",
        );
        assert_eq!(record.invoice_number(), "2");
        assert_eq!(record.vendor_name(), "Second");
        assert_eq!(record.date(), "2 June 2024");
    }

    #[test]
    fn test_malformed_total_keeps_previous_value() {
        let parser = LineInvoiceParser::new();
        let result = parser.extract("Total $50.00\nTotal 1.2.3\n");

        assert_eq!(result.invoice.total_amount(), dec("50.00"));
        assert_eq!(result.fields.total_amount, FieldStatus::Malformed);
        assert!(result.invoice.line_items().is_empty());
    }

    #[test]
    fn test_empty_input() {
        let parser = LineInvoiceParser::new();
        let result = parser.extract("");

        assert_eq!(result.invoice, InvoiceRecord::default());
        assert_eq!(result.fields, FieldReport::default());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.warnings.len(), 5);
    }

    #[test]
    fn test_crlf_lines() {
        let record = parse("Invoice No. 9\r\nBILLED TO: Acme\r\nBolt 4 0.25 1.00\r\n");
        assert_eq!(record.invoice_number(), "9");
        assert_eq!(record.vendor_name(), "Acme");
        assert_eq!(record.line_items().len(), 1);
    }

    #[test]
    fn test_garbage_never_panics() {
        let inputs = [
            "\n\n\n",
            "Total $",
            "Total ,,,",
            "Invoice No.",
            "BILLED TO:",
            "$ $ $ $ $",
            "a b 99999999999999 $1 x",
            "x y 1 $99999999999999999999999999999999999 z",
            "\u{0}\u{feff} Total \u{2003}12",
        ];

        for input in inputs {
            let _ = parse(input);
        }
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse(SAMPLE), parse(SAMPLE));
    }

    #[test]
    fn test_line_item_order_follows_source() {
        let record = parse("Zeta part 1 1.00 1.00\nAlpha part 2 2.00 4.00\nMid part 3 3.00 9.00\n");
        let names: Vec<&str> = record.line_items().iter().map(|i| i.description()).collect();
        assert_eq!(names, vec!["Zeta part", "Alpha part", "Mid part"]);
    }

    #[test]
    fn test_diagnostics_for_complete_invoice() {
        let result = LineInvoiceParser::new().extract(SAMPLE);

        assert_eq!(result.fields.invoice_number, FieldStatus::Found);
        assert_eq!(result.fields.vendor_name, FieldStatus::Found);
        assert_eq!(result.fields.date, FieldStatus::Found);
        assert_eq!(result.fields.total_amount, FieldStatus::Found);
        // "Item Qty Price Amount" is item-shaped but carries no numbers
        assert_eq!(result.rejected_lines, 1);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_empty_vendor_is_malformed() {
        let result = LineInvoiceParser::new().extract("BILLED TO:   \n");
        assert_eq!(result.invoice.vendor_name(), "");
        assert_eq!(result.fields.vendor_name, FieldStatus::Malformed);
    }
}

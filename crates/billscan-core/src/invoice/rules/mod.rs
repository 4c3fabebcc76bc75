//! Rule-based field matchers for invoice text lines.

pub mod amounts;
pub mod header;
pub mod items;
pub mod patterns;

pub use amounts::{parse_amount, parse_quantity};
pub use header::{match_date, match_invoice_number, match_total, match_vendor_name};
pub use items::{MIN_ITEM_TOKENS, parse_line_item};

use rust_decimal::Decimal;

use crate::models::invoice::LineItem;

/// What a single line contributes to the invoice.
///
/// Header rules are tried in priority order and the first pattern that
/// matches claims the line, even when its value turns out to be malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    InvoiceNumber(String),
    VendorName(String),
    Date(String),
    /// `None` when the `Total` marker matched but the amount did not parse.
    Total(Option<Decimal>),
    Item(LineItem),
    /// Item-shaped line whose quantity or unit price did not parse.
    RejectedItem,
    Unmatched,
}

/// Classify one line of text.
pub fn classify_line(line: &str) -> LineMatch {
    if let Some(number) = match_invoice_number(line) {
        return LineMatch::InvoiceNumber(number);
    }

    if let Some(vendor) = match_vendor_name(line) {
        return LineMatch::VendorName(vendor);
    }

    if let Some(date) = match_date(line) {
        return LineMatch::Date(date);
    }

    if let Some(token) = match_total(line) {
        return LineMatch::Total(parse_amount(token));
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_ITEM_TOKENS {
        return LineMatch::Unmatched;
    }

    match parse_line_item(&tokens) {
        Some(item) => LineMatch::Item(item),
        None => LineMatch::RejectedItem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_priority_order() {
        // Invoice number wins over a date on the same line
        assert_eq!(
            classify_line("Invoice No. 12 issued 1 May 2024"),
            LineMatch::InvoiceNumber("12".to_string())
        );

        // Invoice number wins over vendor
        assert_eq!(
            classify_line("Invoice No. 88 BILLED TO: Acme"),
            LineMatch::InvoiceNumber("88".to_string())
        );

        // Vendor wins over date, and keeps the date text in its value
        assert_eq!(
            classify_line("BILLED TO: Acme 1 May 2024"),
            LineMatch::VendorName("Acme 1 May 2024".to_string())
        );

        // Vendor wins over total
        assert_eq!(
            classify_line("BILLED TO: Total Logistics"),
            LineMatch::VendorName("Total Logistics".to_string())
        );

        // Invoice number wins over total
        assert_eq!(
            classify_line("Invoice No. 5 Total $9.00"),
            LineMatch::InvoiceNumber("5".to_string())
        );

        // Date wins over total
        assert_eq!(
            classify_line("Total 5 as of 14 March 2024"),
            LineMatch::Date("14 March 2024".to_string())
        );
    }

    #[test]
    fn test_header_line_is_never_an_item() {
        assert_eq!(
            classify_line("Total 5 $2.00 x"),
            LineMatch::Total(Some(Decimal::from(5)))
        );
    }

    #[test]
    fn test_malformed_total_still_claims_line() {
        assert_eq!(classify_line("Total 1.2.3 4 5.00 x"), LineMatch::Total(None));
    }

    #[test]
    fn test_item_lines() {
        assert_eq!(
            classify_line("Widget A 3 $10.50 x"),
            LineMatch::Item(LineItem::new("Widget A", 3, Decimal::from_str("10.50").unwrap()))
        );
        assert_eq!(classify_line("Qty Price Amount Notes"), LineMatch::RejectedItem);
        assert_eq!(classify_line("Thanks!"), LineMatch::Unmatched);
        assert_eq!(classify_line(""), LineMatch::Unmatched);
    }
}

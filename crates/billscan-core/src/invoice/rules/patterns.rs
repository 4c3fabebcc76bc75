//! Regex patterns for line-oriented invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice number: digits after the "Invoice No." marker
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"Invoice No\.\s*(\d+)"
    ).unwrap();

    // Vendor: rest of the line after "BILLED TO:"
    pub static ref BILLED_TO: Regex = Regex::new(
        r"BILLED TO:\s*(.*)"
    ).unwrap();

    // Long-form date, e.g. "14 March 2024"
    pub static ref DATE_DAY_MONTH_YEAR: Regex = Regex::new(
        r"(\d{1,2} \w+ \d{4})"
    ).unwrap();

    // Total amount, e.g. "Total $1,234.56"
    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"Total\s*\$?([\d,.]+)"
    ).unwrap();
}

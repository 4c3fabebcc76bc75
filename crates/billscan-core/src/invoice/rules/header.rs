//! Header field matchers. Each one looks at a single line of text.

use super::patterns::{BILLED_TO, DATE_DAY_MONTH_YEAR, INVOICE_NUMBER, TOTAL_AMOUNT};

/// Digits following `Invoice No.`, verbatim.
pub fn match_invoice_number(line: &str) -> Option<String> {
    INVOICE_NUMBER
        .captures(line)
        .map(|caps| caps[1].trim().to_string())
}

/// Trimmed remainder of the line after `BILLED TO:`. May be empty.
pub fn match_vendor_name(line: &str) -> Option<String> {
    BILLED_TO.captures(line).map(|caps| caps[1].trim().to_string())
}

/// First `<day> <word> <year>` substring on the line.
pub fn match_date(line: &str) -> Option<String> {
    DATE_DAY_MONTH_YEAR
        .captures(line)
        .map(|caps| caps[1].trim().to_string())
}

/// Raw amount token following `Total`, before any numeric conversion.
pub fn match_total(line: &str) -> Option<&str> {
    TOTAL_AMOUNT
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

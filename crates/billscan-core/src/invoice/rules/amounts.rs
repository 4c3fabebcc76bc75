//! Amount parsing for OCR'd money values.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse an amount such as `$1,234.56` or `10.50`.
///
/// Dollar signs and thousands commas are removed before parsing. Plain and
/// scientific notation are accepted; anything else yields `None`.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s.trim().chars().filter(|c| *c != '$' && *c != ',').collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Parse a non-negative integer quantity.
pub fn parse_quantity(s: &str) -> Option<u32> {
    s.parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56"), Some(Decimal::from_str("1234.56").unwrap()));
        assert_eq!(parse_amount("10.50"), Some(Decimal::from_str("10.5").unwrap()));
        assert_eq!(parse_amount("1,000"), Some(Decimal::from(1000)));
        assert_eq!(parse_amount("1e3"), Some(Decimal::from(1000)));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount("$"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("3"), Some(3));
        assert_eq!(parse_quantity("0"), Some(0));
        assert_eq!(parse_quantity("-3"), None);
        assert_eq!(parse_quantity("2.5"), None);
        assert_eq!(parse_quantity("x"), None);
    }
}

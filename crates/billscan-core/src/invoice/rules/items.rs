//! Line item parsing from whitespace-separated rows.
//!
//! A row is read right to left as
//! `<description...> <quantity> <unit price> <trailing token>`, where the
//! trailing token is usually the line amount and is ignored.

use crate::models::invoice::LineItem;

use super::amounts::{parse_amount, parse_quantity};

/// Minimum number of tokens for a row to be treated as a line item.
pub const MIN_ITEM_TOKENS: usize = 4;

/// Try to read a line item from already tokenized text.
///
/// Returns `None` when there are too few tokens or when the quantity or unit
/// price does not parse.
pub fn parse_line_item(tokens: &[&str]) -> Option<LineItem> {
    if tokens.len() < MIN_ITEM_TOKENS {
        return None;
    }

    let split = tokens.len() - 3;
    let quantity = parse_quantity(tokens[split])?;
    let unit_price = parse_amount(tokens[split + 1])?;
    let description = tokens[..split].join(" ");

    Some(LineItem::new(description, quantity, unit_price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn tokens(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    #[test]
    fn test_parse_line_item() {
        let item = parse_line_item(&tokens("Widget A 3 $10.50 x")).unwrap();
        assert_eq!(item.description(), "Widget A");
        assert_eq!(item.quantity(), 3);
        assert_eq!(item.unit_price(), Decimal::from_str("10.50").unwrap());
    }

    #[test]
    fn test_description_whitespace_is_collapsed() {
        let item = parse_line_item(&tokens("Blue \t  paint   2 4.00 8.00")).unwrap();
        assert_eq!(item.description(), "Blue paint");
    }

    #[test]
    fn test_minimum_token_count() {
        let item = parse_line_item(&tokens("Bolt 4 0.25 1.00")).unwrap();
        assert_eq!(item.description(), "Bolt");

        assert_eq!(parse_line_item(&tokens("4 0.25 1.00")), None);
        assert_eq!(parse_line_item(&[]), None);
    }

    #[test]
    fn test_price_with_thousands_separator() {
        let item = parse_line_item(&tokens("Server rack 1 $2,499.00 $2,499.00")).unwrap();
        assert_eq!(item.unit_price(), Decimal::from_str("2499.00").unwrap());
    }

    #[test]
    fn test_rejected_rows() {
        assert_eq!(parse_line_item(&tokens("Thank you for your business")), None);
        assert_eq!(parse_line_item(&tokens("Widget 1.5 10.00 15.00")), None);
        assert_eq!(parse_line_item(&tokens("Refund -2 10.00 -20.00")), None);
        assert_eq!(parse_line_item(&tokens("Widget 2 N/A 20.00")), None);
    }
}

//! Rendering of extraction results as JSON, CSV or plain text.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use console::style;
use rust_decimal::Decimal;

use billscan_core::{ExtractionResult, InvoiceRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per line item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension used when writing into an output directory.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Render a result. With `show_confidence`, diagnostics are included.
pub fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    show_confidence: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if show_confidence => Ok(serde_json::to_string(result)?),
        OutputFormat::Json => Ok(serde_json::to_string(&result.invoice)?),
        OutputFormat::Csv => format_csv(result, show_confidence),
        OutputFormat::Text => Ok(format_text(result, show_confidence)),
    }
}

fn format_csv(result: &ExtractionResult, show_confidence: bool) -> anyhow::Result<String> {
    let invoice = &result.invoice;
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "invoice_number",
        "vendor_name",
        "date",
        "total_amount",
        "description",
        "quantity",
        "unit_price",
    ];
    if show_confidence {
        header.push("confidence");
    }
    wtr.write_record(&header)?;

    let total = invoice.total_amount().to_string();
    let confidence = format!("{:.2}", result.confidence);

    let mut write_row = |item: [String; 3]| -> csv::Result<()> {
        let mut row = vec![
            invoice.invoice_number().to_string(),
            invoice.vendor_name().to_string(),
            invoice.date().to_string(),
            total.clone(),
        ];
        row.extend(item);
        if show_confidence {
            row.push(confidence.clone());
        }
        wtr.write_record(&row)
    };

    if invoice.line_items().is_empty() {
        write_row([String::new(), String::new(), String::new()])?;
    } else {
        for item in invoice.line_items() {
            write_row([
                item.description().to_string(),
                item.quantity().to_string(),
                item.unit_price().to_string(),
            ])?;
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult, show_confidence: bool) -> String {
    let invoice = &result.invoice;
    let mut output = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(output, "Invoice: {}", or_dash(invoice.invoice_number()));
    let _ = writeln!(output, "Vendor:  {}", or_dash(invoice.vendor_name()));
    let _ = writeln!(output, "Date:    {}", or_dash(invoice.date()));
    let _ = writeln!(output, "Total:   {}", invoice.total_amount());

    if !invoice.line_items().is_empty() {
        output.push_str("\nItems:\n");
        for item in invoice.line_items() {
            let _ = writeln!(
                output,
                "  {} - {} x {} = {}",
                item.description(),
                item.quantity(),
                item.unit_price(),
                or_dash_amount(item.line_total())
            );
        }
        let _ = writeln!(
            output,
            "  Items total: {}",
            or_dash_amount(invoice.line_items_total())
        );
    }

    if show_confidence {
        let _ = writeln!(output, "\nConfidence: {:.2}", result.confidence);
        for warning in &result.warnings {
            let _ = writeln!(output, "  - {}", warning);
        }
    }

    output
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn or_dash_amount(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Write rendered output to a file, or to stdout when no path is given.
pub fn write_output(output: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output)?;
            eprintln!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", output.trim_end()),
    }
    Ok(())
}

/// Print a warning when the record lacks header fields.
pub fn warn_low_confidence(invoice: &InvoiceRecord) {
    if invoice.is_low_confidence() {
        eprintln!(
            "{} Some invoice fields could not be extracted",
            style("⚠").yellow()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billscan_core::{InvoiceParser, LineInvoiceParser};
    use pretty_assertions::assert_eq;

    const TEXT: &str = "Invoice No. 4521\nBILLED TO: Acme Corp\n14 March 2024\n\
                        Widget A 3 $10.50 x\nTotal $31.50\n";

    #[test]
    fn test_json_contains_record_only() {
        let result = LineInvoiceParser::new().extract(TEXT);
        let json = format_result(&result, OutputFormat::Json, false).unwrap();

        assert!(json.contains("\"invoice_number\":\"4521\""));
        assert!(!json.contains("confidence"));
    }

    #[test]
    fn test_json_with_confidence() {
        let result = LineInvoiceParser::new().extract(TEXT);
        let json = format_result(&result, OutputFormat::Json, true).unwrap();

        assert!(json.contains("\"confidence\":1.0"));
        assert!(json.contains("\"fields\""));
    }

    #[test]
    fn test_csv_row_per_item() {
        let result = LineInvoiceParser::new().extract(TEXT);
        let csv = format_result(&result, OutputFormat::Csv, false).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines,
            vec![
                "invoice_number,vendor_name,date,total_amount,description,quantity,unit_price",
                "4521,Acme Corp,14 March 2024,31.50,Widget A,3,10.50",
            ]
        );
    }

    #[test]
    fn test_csv_without_items() {
        let result = LineInvoiceParser::new().extract("Invoice No. 7\n");
        let csv = format_result(&result, OutputFormat::Csv, true).unwrap();

        assert_eq!(csv.lines().nth(1), Some("7,,,0,,,,0.20"));
    }

    #[test]
    fn test_text_summary() {
        let result = LineInvoiceParser::new().extract(TEXT);
        let text = format_result(&result, OutputFormat::Text, false).unwrap();

        assert!(text.contains("Vendor:  Acme Corp"));
        assert!(text.contains("Widget A - 3 x 10.50 = 31.50"));
        assert!(!text.contains("Confidence"));
    }

    #[test]
    fn test_text_summary_with_overflowing_totals() {
        let result = LineInvoiceParser::new()
            .extract("Bulk widget 4000000000 $99,999,999,999,999,999,999,999,999 x\n");
        let text = format_result(&result, OutputFormat::Text, false).unwrap();

        assert!(text.contains("Bulk widget - 4000000000 x 99999999999999999999999999 = -\n"));
        assert!(text.contains("Items total: -"));
    }
}

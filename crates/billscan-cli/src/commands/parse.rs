//! Parse command - run the invoice parser on text that was already extracted.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Args;

use billscan_core::{InvoiceParser, LineInvoiceParser};

use super::output::{OutputFormat, format_result, warn_low_confidence, write_output};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file to parse (`-` reads stdin)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show extraction confidence scores
    #[arg(long)]
    show_confidence: bool,
}

pub fn run(args: ParseArgs) -> anyhow::Result<()> {
    let text = if args.input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        fs::read_to_string(&args.input).map_err(|e| {
            anyhow::anyhow!("Failed to read {}: {}", args.input.display(), e)
        })?
    };

    let result = LineInvoiceParser::new().extract(&text);

    warn_low_confidence(&result.invoice);

    let output = format_result(&result, args.format, args.show_confidence)?;
    write_output(&output, args.output.as_deref())
}

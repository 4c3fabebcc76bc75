//! Process command - extract data from a single invoice file.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use billscan_core::{DocumentKind, InvoiceParser, LineInvoiceParser};

use super::output::{OutputFormat, format_result, warn_low_confidence, write_output};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
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

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let kind = DocumentKind::from_path(&args.input)?;

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(match kind {
        DocumentKind::SingleImage => "Recognizing image...",
        DocumentKind::MultiPagePdf => "Rendering and recognizing pages...",
    });

    let text = match super::acquire(&config, args.input.clone(), kind).await {
        Ok(text) => text,
        Err(e) => {
            pb.abandon_with_message("Failed");
            return Err(e);
        }
    };

    if text.trim().is_empty() {
        warn!("No text detected in {}", args.input.display());
    }

    pb.set_message("Extracting invoice data...");
    let result = LineInvoiceParser::new().extract(&text);
    pb.finish_and_clear();

    warn_low_confidence(&result.invoice);

    let output = format_result(&result, args.format, args.show_confidence)?;
    write_output(&output, args.output.as_deref())?;

    eprintln!(
        "{} Processed {} in {:.2?}",
        style("✓").green(),
        args.input.display(),
        start.elapsed()
    );

    Ok(())
}

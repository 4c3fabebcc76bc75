//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use billscan_core::{BillscanConfig, DocumentKind, ExtractionResult, InvoiceParser, LineInvoiceParser};

use super::output::{OutputFormat, format_result};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching input files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| DocumentKind::from_path(p).is_ok())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    // Spawned in input order and awaited in input order, so results keep it
    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            let semaphore = Arc::clone(&semaphore);
            let config = config.clone();
            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let file_start = Instant::now();
                let outcome = process_single_file(&config, &path).await;
                let processing_time_ms = file_start.elapsed().as_millis() as u64;

                match outcome {
                    Ok(result) => ProcessResult {
                        path,
                        result: Some(result),
                        error: None,
                        processing_time_ms,
                    },
                    Err(e) => ProcessResult {
                        path,
                        result: None,
                        error: Some(format!("{:#}", e)),
                        processing_time_ms,
                    },
                }
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    let mut pending = handles.into_iter();

    while let Some(handle) = pending.next() {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                abort_all(pending);
                return Err(e.into());
            }
        };

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                abort_all(pending);
                overall_pb.abandon();
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }

        results.push(result);
        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.result.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            if let Some(extraction) = &result.result {
                let output_path = output_dir.join(output_file_name(&result.path, args.format));

                fs::write(&output_path, format_result(extraction, args.format, false)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:.2?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Cancel tasks that have not been awaited yet.
///
/// Tasks still waiting for a worker slot never start; an OCR call already
/// running on the blocking pool finishes but its result is discarded.
fn abort_all<T>(handles: impl IntoIterator<Item = JoinHandle<T>>) {
    for handle in handles {
        handle.abort();
    }
}

/// `scans/a.pdf` becomes `a.pdf.json`, so inputs sharing a stem stay apart.
fn output_file_name(path: &Path, format: OutputFormat) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "invoice".to_string());

    format!("{}.{}", file_name, format.extension())
}

async fn process_single_file(
    config: &BillscanConfig,
    path: &Path,
) -> anyhow::Result<ExtractionResult> {
    let kind = DocumentKind::from_path(path)?;
    let text = super::acquire(config, path.to_path_buf(), kind).await?;

    if text.trim().is_empty() {
        warn!("No text detected in {}", path.display());
    }

    Ok(LineInvoiceParser::new().extract(&text))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "vendor_name",
        "date",
        "total_amount",
        "line_items",
        "confidence",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(extraction) = &result.result {
            let invoice = &extraction.invoice;
            wtr.write_record([
                filename,
                "success",
                invoice.invoice_number(),
                invoice.vendor_name(),
                invoice.date(),
                &invoice.total_amount().to_string(),
                &invoice.line_items().len().to_string(),
                &format!("{:.2}", extraction.confidence),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_output_names_keep_source_extension() {
        let png = output_file_name(Path::new("scans/a.png"), OutputFormat::Json);
        let pdf = output_file_name(Path::new("scans/a.pdf"), OutputFormat::Json);

        assert_eq!(png, "a.png.json");
        assert_eq!(pdf, "a.pdf.json");
        assert_ne!(png, pdf);
        assert_eq!(output_file_name(Path::new("b.tiff"), OutputFormat::Text), "b.tiff.txt");
    }

    #[tokio::test]
    async fn test_abort_all_stops_tasks_waiting_for_a_worker() {
        let gate = Arc::new(Semaphore::new(0));
        let started = Arc::new(AtomicUsize::new(0));

        let handles: Vec<JoinHandle<()>> = (0..3)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let started = Arc::clone(&started);
                tokio::spawn(async move {
                    let _permit = gate.acquire_owned().await;
                    started.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        abort_all(handles);
        gate.add_permits(3);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(started.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_summary_lists_successes_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");

        let results = vec![
            ProcessResult {
                path: PathBuf::from("scans/a.png"),
                result: Some(LineInvoiceParser::new().extract("Invoice No. 12\nTotal $5.00\n")),
                error: None,
                processing_time_ms: 3,
            },
            ProcessResult {
                path: PathBuf::from("scans/b.pdf"),
                result: None,
                error: Some("page 2 failed".to_string()),
                processing_time_ms: 9,
            },
        ];

        write_summary(&path, &results).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("a.png,success,12,,,5.00,0,"));
        assert_eq!(lines[2], "b.pdf,error,,,,,,,9,page 2 failed");
    }
}

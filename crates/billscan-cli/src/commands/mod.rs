//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod output;
pub mod parse;
pub mod process;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use billscan_core::{BillscanConfig, DocumentKind, TextAcquirer};

/// Load the configuration from `--config`, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BillscanConfig> {
    if let Some(path) = config_path {
        return Ok(BillscanConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(BillscanConfig::from_file(&default_path)?)
    } else {
        Ok(BillscanConfig::default())
    }
}

/// Run text acquisition on the blocking pool, bounded by `ocr.timeout_secs`.
///
/// A timed out task keeps running to completion in the background; its
/// scratch directory is removed when it finishes.
pub async fn acquire(
    config: &BillscanConfig,
    path: PathBuf,
    kind: DocumentKind,
) -> anyhow::Result<String> {
    let timeout_secs = config.ocr.timeout_secs;
    let task_config = config.clone();

    let task = tokio::task::spawn_blocking(move || {
        TextAcquirer::from_config(&task_config)?.acquire_text(&path, kind)
    });

    let text = if timeout_secs == 0 {
        task.await??
    } else {
        tokio::time::timeout(Duration::from_secs(timeout_secs), task)
            .await
            .map_err(|_| anyhow::anyhow!("OCR timed out after {}s", timeout_secs))???
    };

    Ok(text)
}

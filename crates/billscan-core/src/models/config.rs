//! Configuration structures for the acquisition pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::BillscanError;

/// Main configuration for the billscan pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillscanConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,
}

/// OCR backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackend {
    /// External `tesseract` binary.
    #[default]
    Tesseract,
    /// Pure Rust ONNX models (requires the `onnx` feature).
    Onnx,
}

/// PDF rasterizer selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterizerBackend {
    /// External poppler `pdftoppm` binary.
    #[default]
    Pdftoppm,
    /// Scanned page images embedded in the PDF, read with lopdf.
    Embedded,
}

/// What to do when a single PDF page fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFailurePolicy {
    /// Fail the whole document.
    #[default]
    Abort,
    /// Log the page and continue with the rest.
    Skip,
}

/// OCR engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Which OCR engine to run.
    pub backend: OcrBackend,

    /// Recognition language passed to the engine.
    pub language: String,

    /// Denoise images before recognition.
    pub preprocess: bool,

    /// Downscale images whose longer side exceeds this many pixels (0 = never).
    pub max_image_size: u32,

    /// Median filter radius used when denoising (1 = 3x3, 0 = grayscale only).
    pub median_radius: u32,

    /// Path or name of the tesseract executable.
    pub tesseract_path: PathBuf,

    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,

    /// Per-document timeout applied by callers, in seconds (0 = none).
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackend::default(),
            language: "eng".to_string(),
            preprocess: true,
            max_image_size: 0,
            median_radius: 1,
            tesseract_path: PathBuf::from("tesseract"),
            model_dir: PathBuf::from("models"),
            timeout_secs: 120,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Which rasterizer turns pages into images.
    pub rasterizer: RasterizerBackend,

    /// Path or name of the pdftoppm executable.
    pub pdftoppm_path: PathBuf,

    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,

    /// Behavior when a page fails to render or recognize.
    pub page_failure: PageFailurePolicy,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            rasterizer: RasterizerBackend::default(),
            pdftoppm_path: PathBuf::from("pdftoppm"),
            render_dpi: 300,
            max_pages: 0,
            page_failure: PageFailurePolicy::default(),
        }
    }
}

impl BillscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, BillscanError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string. Missing keys take defaults.
    pub fn from_json(content: &str) -> Result<Self, BillscanError> {
        serde_json::from_str(content).map_err(|e| BillscanError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), BillscanError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| BillscanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = BillscanConfig::default();
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.backend, OcrBackend::Tesseract);
        assert_eq!(config.pdf.render_dpi, 300);
        assert_eq!(config.pdf.page_failure, PageFailurePolicy::Abort);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = BillscanConfig::from_json(
            r#"{ "ocr": { "language": "deu" }, "pdf": { "page_failure": "skip" } }"#,
        )
        .unwrap();

        assert_eq!(config.ocr.language, "deu");
        assert!(config.ocr.preprocess);
        assert_eq!(config.ocr.median_radius, 1);
        assert_eq!(config.ocr.max_image_size, 0);
        assert_eq!(config.pdf.page_failure, PageFailurePolicy::Skip);
        assert_eq!(config.pdf.rasterizer, RasterizerBackend::Pdftoppm);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = BillscanConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, BillscanError::Config(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BillscanConfig::default();
        config.pdf.max_pages = 3;
        config.ocr.backend = OcrBackend::Onnx;
        config.save(&path).unwrap();

        assert_eq!(BillscanConfig::from_file(&path).unwrap(), config);
    }
}

//! OCR through the external `tesseract` command-line tool.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

use image::{DynamicImage, GenericImageView, ImageFormat};
use tracing::{debug, info};

use crate::error::OcrError;

use super::TextRecognizer;

/// OCR engine that shells out to `tesseract <image> stdout -l <lang>`.
///
/// Each call writes the image into its own temporary directory, so concurrent
/// calls never share files.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
}

impl TesseractEngine {
    /// Use `tesseract` from `PATH`.
    pub fn new() -> Self {
        Self::with_binary("tesseract")
    }

    /// Use a specific tesseract executable.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractEngine {
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        let scratch = tempfile::Builder::new()
            .prefix("billscan-ocr-")
            .tempdir()
            .map_err(|e| OcrError::Recognition(format!("failed to create temp dir: {}", e)))?;
        let input = scratch.path().join("input.png");

        image
            .save_with_format(&input, ImageFormat::Png)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        debug!("Running {} on {}x{} image", self.binary.display(), width, height);

        let output = Command::new(&self.binary)
            .arg(&input)
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    OcrError::EngineUnavailable(format!(
                        "{} not found. Install tesseract-ocr to enable OCR.",
                        self.binary.display()
                    ))
                } else {
                    OcrError::Recognition(e.to_string())
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();

        info!(
            "OCR complete: {} characters in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

//! Text acquisition: turning an image or a multi-page PDF into one text blob.

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AcquisitionError, BillscanError, PdfError, Result};
use crate::models::config::{BillscanConfig, OcrBackend, RasterizerBackend};
use crate::ocr::{ImagePreprocessor, TesseractEngine, TextRecognizer};
use crate::pdf::{EmbeddedImageRasterizer, PageRasterizer, PdftoppmRasterizer};

pub use crate::models::config::PageFailurePolicy;

/// Separator placed between the texts of consecutive pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Image extensions accepted as single-image documents.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "webp"];

/// Kind of source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// One scanned image.
    SingleImage,
    /// A PDF rendered page by page.
    MultiPagePdf,
}

impl DocumentKind {
    /// Determine the document kind from the file extension.
    pub fn from_path(path: &Path) -> std::result::Result<Self, AcquisitionError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        if extension == "pdf" {
            Ok(Self::MultiPagePdf)
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Ok(Self::SingleImage)
        } else {
            Err(AcquisitionError::UnsupportedFormat(if extension.is_empty() {
                path.display().to_string()
            } else {
                extension
            }))
        }
    }
}

/// Orchestrates page rendering, preprocessing and OCR for one document at a
/// time.
///
/// Every call uses its own scratch directory, so one acquirer per thread (or
/// one per document) can run in parallel with others.
pub struct TextAcquirer {
    recognizer: Box<dyn TextRecognizer>,
    rasterizer: Box<dyn PageRasterizer>,
    preprocessor: Option<ImagePreprocessor>,
    language: String,
    page_failure: PageFailurePolicy,
    max_pages: usize,
}

impl TextAcquirer {
    /// Create an acquirer with English recognition, no preprocessing and the
    /// abort-on-failure page policy.
    pub fn new(
        recognizer: impl TextRecognizer + 'static,
        rasterizer: impl PageRasterizer + 'static,
    ) -> Self {
        Self {
            recognizer: Box::new(recognizer),
            rasterizer: Box::new(rasterizer),
            preprocessor: None,
            language: "eng".to_string(),
            page_failure: PageFailurePolicy::Abort,
            max_pages: 0,
        }
    }

    /// Build an acquirer with the backends selected in the configuration.
    pub fn from_config(config: &BillscanConfig) -> Result<Self> {
        let recognizer: Box<dyn TextRecognizer> = match config.ocr.backend {
            OcrBackend::Tesseract => {
                Box::new(TesseractEngine::with_binary(&config.ocr.tesseract_path))
            }
            #[cfg(feature = "onnx")]
            OcrBackend::Onnx => Box::new(crate::ocr::PureOcrEngine::from_dir(&config.ocr.model_dir)?),
            #[cfg(not(feature = "onnx"))]
            OcrBackend::Onnx => {
                return Err(BillscanError::Config(
                    "the onnx OCR backend requires the `onnx` feature".to_string(),
                ));
            }
        };

        let rasterizer: Box<dyn PageRasterizer> = match config.pdf.rasterizer {
            RasterizerBackend::Pdftoppm => Box::new(
                PdftoppmRasterizer::new()
                    .with_binary(&config.pdf.pdftoppm_path)
                    .with_dpi(config.pdf.render_dpi),
            ),
            RasterizerBackend::Embedded => Box::new(EmbeddedImageRasterizer::new()),
        };

        let mut acquirer = Self::new(recognizer, rasterizer)
            .with_language(config.ocr.language.clone())
            .with_page_failure(config.pdf.page_failure)
            .with_max_pages(config.pdf.max_pages);

        if config.ocr.preprocess {
            acquirer = acquirer.with_preprocessor(
                ImagePreprocessor::new()
                    .with_max_size(config.ocr.max_image_size)
                    .with_median_radius(config.ocr.median_radius),
            );
        }

        Ok(acquirer)
    }

    /// Set the recognition language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Denoise every image before recognition.
    pub fn with_preprocessor(mut self, preprocessor: ImagePreprocessor) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    /// Set what happens when a single PDF page fails.
    pub fn with_page_failure(mut self, policy: PageFailurePolicy) -> Self {
        self.page_failure = policy;
        self
    }

    /// Limit the number of PDF pages recognized (0 = unlimited).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Turn a document into text.
    ///
    /// PDF pages are recognized in page order and joined with
    /// [`PAGE_SEPARATOR`]. Temporary page images are removed before this
    /// returns, whether it succeeds or not.
    pub fn acquire_text(&self, document: &Path, kind: DocumentKind) -> Result<String> {
        let start = Instant::now();

        info!("Acquiring text from {} ({:?})", document.display(), kind);

        let text = match kind {
            DocumentKind::SingleImage => self.recognize_file(document)?,
            DocumentKind::MultiPagePdf => self.recognize_pdf(document)?,
        };

        debug!(
            "Acquired {} characters in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }

    fn recognize_file(&self, path: &Path) -> Result<String> {
        let image = image::open(path)?;

        let image = match &self.preprocessor {
            Some(preprocessor) => preprocessor.denoise(&image),
            None => image,
        };

        Ok(self.recognizer.recognize(&image, &self.language)?)
    }

    fn recognize_pdf(&self, pdf: &Path) -> Result<String> {
        // Dropped on every return path, which deletes the page images
        let scratch = tempfile::Builder::new().prefix("billscan-pages-").tempdir()?;

        let mut pages = self.rasterizer.render_pages(pdf, scratch.path())?;
        if pages.is_empty() {
            return Err(PdfError::NoPages.into());
        }

        if self.max_pages > 0 && pages.len() > self.max_pages {
            debug!("Limiting {} pages to {}", pages.len(), self.max_pages);
            pages.truncate(self.max_pages);
        }

        let page_count = pages.len();
        let mut texts = Vec::with_capacity(page_count);

        for (index, page) in pages.into_iter().enumerate() {
            let number = index + 1;
            debug!("Recognizing page {}/{}", number, page_count);

            let outcome = page
                .map_err(BillscanError::from)
                .and_then(|path| self.recognize_file(&path));

            match outcome {
                Ok(text) => texts.push(text),
                Err(e) => match self.page_failure {
                    PageFailurePolicy::Abort => {
                        return Err(AcquisitionError::Page {
                            page: number,
                            source: Box::new(e),
                        }
                        .into());
                    }
                    PageFailurePolicy::Skip => {
                        warn!("Skipping page {}: {}", number, e);
                    }
                },
            }
        }

        if texts.is_empty() {
            return Err(AcquisitionError::AllPagesFailed(page_count).into());
        }

        Ok(texts.join(PAGE_SEPARATOR))
    }
}

/// Acquire text with the default configuration (tesseract + pdftoppm).
pub fn acquire_text(document: &Path, kind: DocumentKind) -> Result<String> {
    TextAcquirer::from_config(&BillscanConfig::default())?.acquire_text(document, kind)
}

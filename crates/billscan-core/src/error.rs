//! Error types for the billscan-core library.

use thiserror::Error;

/// Main error type for the billscan library.
#[derive(Error, Debug)]
pub enum BillscanError {
    /// Document acquisition error.
    #[error("acquisition error: {0}")]
    Acquisition(#[from] AcquisitionError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning a document into text.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The file extension does not map to a known document kind.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// A single page failed to render or recognize.
    #[error("page {page} failed: {source}")]
    Page {
        page: usize,
        #[source]
        source: Box<BillscanError>,
    },

    /// Every page failed while the skip policy was active.
    #[error("all {0} pages failed")]
    AllPagesFailed(usize),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR engine binary or runtime is not available.
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The rasterizer binary is not available.
    #[error("PDF renderer unavailable: {0}")]
    RendererUnavailable(String),

    /// Rendering pages to images failed.
    #[error("failed to render pages: {0}")]
    Render(String),
}

/// Result type for the billscan library.
pub type Result<T> = std::result::Result<T, BillscanError>;

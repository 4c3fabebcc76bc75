//! Core library for invoice OCR processing.
//!
//! This crate provides:
//! - Text acquisition from scanned images and multi-page PDFs via OCR
//! - Line-oriented invoice field extraction (number, vendor, date, total, line items)
//! - Invoice data models and pipeline configuration

pub mod acquisition;
pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pdf;

pub use acquisition::{DocumentKind, PageFailurePolicy, TextAcquirer, acquire_text};
pub use error::{AcquisitionError, BillscanError, OcrError, PdfError, Result};
pub use invoice::{ExtractionResult, FieldStatus, InvoiceParser, LineInvoiceParser, parse};
pub use models::config::BillscanConfig;
pub use models::invoice::{InvoiceRecord, LineItem};
pub use ocr::{ImagePreprocessor, TesseractEngine, TextRecognizer};
pub use pdf::{EmbeddedImageRasterizer, PageRasterizer, PdftoppmRasterizer};

#[cfg(feature = "onnx")]
pub use ocr::PureOcrEngine;

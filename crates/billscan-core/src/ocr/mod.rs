//! OCR engines behind a common recognizer interface.

mod preprocessing;
#[cfg(feature = "onnx")]
mod pure_engine;
mod tesseract;

pub use preprocessing::ImagePreprocessor;
#[cfg(feature = "onnx")]
pub use pure_engine::PureOcrEngine;
pub use tesseract::TesseractEngine;

use image::DynamicImage;

use crate::error::OcrError;

/// An OCR capability: turns one image into plain text.
pub trait TextRecognizer {
    /// Recognize the text in `image` using the given language code (e.g. `eng`).
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError> {
        (**self).recognize(image, language)
    }
}

//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;

use super::TextRecognizer;

/// Detection model file name inside the model directory.
pub const DETECTION_MODEL: &str = "det.onnx";
/// Recognition model file name inside the model directory.
pub const RECOGNITION_MODEL: &str = "latin_rec.onnx";
/// Character dictionary file name inside the model directory.
pub const DICTIONARY: &str = "latin_dict.txt";

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
///
/// The recognition language is fixed by the loaded models; the `language`
/// argument of [`TextRecognizer::recognize`] is only logged.
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
}

/// A recognized text fragment with its position, used for reading order.
struct Fragment {
    min_x: f32,
    min_y: f32,
    text: String,
}

impl PureOcrEngine {
    /// Create an engine from model files in a directory.
    pub fn from_dir(model_dir: &Path) -> Result<Self, OcrError> {
        let det_path = model_dir.join(DETECTION_MODEL);
        let rec_path = model_dir.join(RECOGNITION_MODEL);
        let dict_path = model_dir.join(DICTIONARY);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self { engine })
    }
}

impl TextRecognizer for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        debug!(
            "Processing {}x{} image (language '{}' is fixed by the models)",
            width, height, language
        );

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let mut fragments: Vec<Fragment> = results
            .iter()
            .map(|r| {
                let (min_x, min_y) = polygon_origin(&r.bounding_box);
                Fragment {
                    min_x,
                    min_y,
                    text: r.text.replace("[UNK]", " "),
                }
            })
            .collect();

        // Group by approximate vertical position (within 20 pixels), then by x
        fragments.sort_by(|a, b| {
            let row_a = (a.min_y / 20.0) as i32;
            let row_b = (b.min_y / 20.0) as i32;
            if row_a != row_b {
                row_a.cmp(&row_b)
            } else {
                a.min_x
                    .partial_cmp(&b.min_x)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }
        });

        let text = fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        info!(
            "OCR complete: {} text regions in {}ms",
            fragments.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

/// Top-left corner of the quadrilateral's axis-aligned bounds.
fn polygon_origin(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    polygon
        .exterior()
        .coords()
        .take(4)
        .fold((f32::INFINITY, f32::INFINITY), |(x, y), c| {
            (x.min(c.x as f32), y.min(c.y as f32))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_models_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let err = PureOcrEngine::from_dir(dir.path()).err().unwrap();
        assert!(matches!(err, OcrError::ModelLoad(_)));
    }
}

//! Image preprocessing for OCR.

use image::{DynamicImage, GenericImageView};
use imageproc::filter::median_filter;
use tracing::debug;

/// Image preprocessor applied before recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePreprocessor {
    /// Maximum image dimension (0 = keep original size).
    max_size: u32,
    /// Radius of the median filter window (1 = 3x3).
    median_radius: u32,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self {
            max_size: 0,
            median_radius: 1,
        }
    }

    /// Set maximum image dimension.
    pub fn with_max_size(mut self, size: u32) -> Self {
        self.max_size = size;
        self
    }

    /// Set the median filter radius. Zero disables filtering.
    pub fn with_median_radius(mut self, radius: u32) -> Self {
        self.median_radius = radius;
        self
    }

    /// Convert to grayscale and remove speckle noise with a median filter.
    pub fn denoise(&self, image: &DynamicImage) -> DynamicImage {
        let (width, height) = image.dimensions();
        let (new_width, new_height) = self.calculate_resize_dimensions(width, height);

        let gray = if (new_width, new_height) != (width, height) {
            debug!(
                "Downscaling image from {}x{} to {}x{}",
                width, height, new_width, new_height
            );
            image
                .resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
                .to_luma8()
        } else {
            image.to_luma8()
        };

        if self.median_radius == 0 {
            return DynamicImage::ImageLuma8(gray);
        }

        let radius = self.median_radius;
        DynamicImage::ImageLuma8(median_filter(&gray, radius, radius))
    }

    fn calculate_resize_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let max_dim = width.max(height);

        if self.max_size == 0 || max_dim <= self.max_size {
            return (width, height);
        }

        let scale = self.max_size as f32 / max_dim as f32;
        let new_width = (width as f32 * scale) as u32;
        let new_height = (height as f32 * scale) as u32;

        (new_width.max(1), new_height.max(1))
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_resize_dimensions() {
        let preprocessor = ImagePreprocessor::new().with_max_size(960);

        // Image smaller than target
        let (w, h) = preprocessor.calculate_resize_dimensions(500, 300);
        assert_eq!((w, h), (500, 300));

        // Image larger than target
        let (w, h) = preprocessor.calculate_resize_dimensions(1920, 1080);
        assert_eq!(w, 960);
        assert!(h < 960);

        // No limit
        let unlimited = ImagePreprocessor::new();
        assert_eq!(unlimited.calculate_resize_dimensions(5000, 4000), (5000, 4000));
    }

    #[test]
    fn test_denoise_removes_isolated_speckle() {
        let mut img = RgbImage::from_pixel(9, 9, Rgb([255, 255, 255]));
        img.put_pixel(4, 4, Rgb([0, 0, 0]));

        let out = ImagePreprocessor::new().denoise(&DynamicImage::ImageRgb8(img));
        let gray = out.to_luma8();

        assert_eq!(gray.dimensions(), (9, 9));
        assert_eq!(gray.get_pixel(4, 4)[0], 255);
    }

    #[test]
    fn test_denoise_keeps_solid_strokes() {
        // A 3-pixel-wide black bar survives a 3x3 median
        let mut img = RgbImage::from_pixel(9, 9, Rgb([255, 255, 255]));
        for y in 0..9 {
            for x in 3..6 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }

        let gray = ImagePreprocessor::new()
            .denoise(&DynamicImage::ImageRgb8(img))
            .to_luma8();

        assert_eq!(gray.get_pixel(4, 4)[0], 0);
        assert_eq!(gray.get_pixel(0, 4)[0], 255);
    }
}

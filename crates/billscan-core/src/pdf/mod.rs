//! PDF rasterization into per-page images.

mod extractor;
mod pdftoppm;

pub use extractor::EmbeddedImageRasterizer;
pub use pdftoppm::PdftoppmRasterizer;

use std::path::{Path, PathBuf};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Outcome of rendering one page: the path of its image inside the scratch
/// directory, or the reason that page could not be rendered.
pub type PageImage = Result<PathBuf>;

/// Trait for turning a PDF into an ordered sequence of page images.
pub trait PageRasterizer {
    /// Render every page of `pdf` as an image file inside `scratch`.
    ///
    /// The outer error means the document as a whole could not be processed.
    /// Entries are in page order; an inner error affects that page only.
    fn render_pages(&self, pdf: &Path, scratch: &Path) -> Result<Vec<PageImage>>;
}

impl<T: PageRasterizer + ?Sized> PageRasterizer for Box<T> {
    fn render_pages(&self, pdf: &Path, scratch: &Path) -> Result<Vec<PageImage>> {
        (**self).render_pages(pdf, scratch)
    }
}

//! Page rendering through poppler's `pdftoppm`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use super::{PageImage, PageRasterizer, Result};
use crate::error::PdfError;

/// File name prefix for rendered pages inside the scratch directory.
const PAGE_PREFIX: &str = "page";

/// Rasterizer that runs `pdftoppm -r <dpi> -png <pdf> <scratch>/page`.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: PathBuf,
    dpi: u32,
}

impl PdftoppmRasterizer {
    /// Use `pdftoppm` from `PATH` at 300 DPI.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("pdftoppm"),
            dpi: 300,
        }
    }

    /// Use a specific pdftoppm executable.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the render resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn render_pages(&self, pdf: &Path, scratch: &Path) -> Result<Vec<PageImage>> {
        debug!("Rendering {} at {} DPI", pdf.display(), self.dpi);

        let output = Command::new(&self.binary)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(pdf)
            .arg(scratch.join(PAGE_PREFIX))
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    PdfError::RendererUnavailable(format!(
                        "{} not found. Install poppler-utils to render PDF pages.",
                        self.binary.display()
                    ))
                } else {
                    PdfError::Render(e.to_string())
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(error = %stderr.trim(), "pdftoppm failed");
            return Err(PdfError::Render(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let pages = collect_pages(scratch)?;
        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!("pdftoppm rendered {} pages", pages.len());
        Ok(pages.into_iter().map(Ok).collect())
    }
}

/// Find `page-<n>.png` files and return them ordered by page number.
///
/// pdftoppm zero-pads the number to the width of the page count, so the
/// number is parsed instead of relying on name order.
fn collect_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| PdfError::Render(e.to_string()))?;

    let mut numbered: Vec<(u32, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter_map(|entry| {
            let path = entry.path();
            let number = page_number(path.file_name()?.to_str()?)?;
            Some((number, path))
        })
        .collect();

    numbered.sort_by_key(|(number, _)| *number);
    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}

fn page_number(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix(PAGE_PREFIX)?
        .strip_prefix('-')?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_page_number() {
        assert_eq!(page_number("page-1.png"), Some(1));
        assert_eq!(page_number("page-007.png"), Some(7));
        assert_eq!(page_number("page-1.ppm"), None);
        assert_eq!(page_number("other-1.png"), None);
    }

    #[test]
    fn test_collect_pages_orders_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-2.png", "page-1.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let names: Vec<String> = collect_pages(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["page-1.png", "page-2.png", "page-10.png"]);
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let rasterizer = PdftoppmRasterizer::new().with_binary("billscan-no-such-pdftoppm");

        let err = rasterizer
            .render_pages(Path::new("invoice.pdf"), dir.path())
            .unwrap_err();
        assert!(matches!(err, PdfError::RendererUnavailable(_)));
    }
}

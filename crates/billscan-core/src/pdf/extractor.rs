//! Page images embedded in scanned PDFs, read with lopdf.
//!
//! A scanner-produced PDF usually carries one full-page image per page. This
//! rasterizer pulls that image out instead of rendering the page, so it needs
//! no external tools. Pages whose image uses an unsupported encoding fail
//! individually.

use std::path::Path;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PageImage, PageRasterizer, Result};
use crate::error::PdfError;

/// Rasterizer that extracts the largest embedded image of every page.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedImageRasterizer;

impl EmbeddedImageRasterizer {
    pub fn new() -> Self {
        Self
    }

    fn load(&self, pdf: &Path) -> Result<Document> {
        let data = std::fs::read(pdf).map_err(|e| PdfError::Parse(e.to_string()))?;
        let mut doc = Document::load_mem(&data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        Ok(doc)
    }

    fn render_page(
        &self,
        doc: &Document,
        page_id: ObjectId,
        number: u32,
        scratch: &Path,
    ) -> PageImage {
        let image = self
            .page_images(doc, page_id)
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
            .ok_or_else(|| PdfError::Render(format!("page {} has no decodable image", number)))?;

        let path = scratch.join(format!("page-{}.png", number));
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| PdfError::Render(format!("failed to write page {}: {}", number, e)))?;

        trace!("Wrote page {} image to {}", number, path.display());
        Ok(path)
    }

    fn page_images(&self, doc: &Document, page_id: ObjectId) -> Vec<DynamicImage> {
        let mut images = Vec::new();

        // Get resources (with inheritance support)
        if let Some(resources) = self.get_resources(doc, page_id) {
            // Look for XObjects
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                    for (_name, obj_ref) in xobj_dict.iter() {
                        if let Ok((_, obj)) = doc.dereference(obj_ref) {
                            if let Some(img) = self.try_decode_image(doc, obj) {
                                images.push(img);
                            }
                        }
                    }
                }
            }
        }

        images
    }

    fn try_decode_image(&self, doc: &Document, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        // Check if it's an image XObject
        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;

        trace!("Found image object: {}x{}", width, height);

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                _ => None,
            };

            match filter_name {
                Some(b"DCTDecode") => {
                    // JPEG data is used as stored
                    return image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
                        .ok();
                }
                Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    trace!("Unsupported image filter {:?}", filter_name.map(String::from_utf8_lossy));
                    return None;
                }
                _ => {}
            }
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);

        decode_raw(&data, width, height, color_space, bits)
    }

    /// Get resources dictionary for a page or page-tree node, handling inheritance.
    fn get_resources(&self, doc: &Document, node_id: ObjectId) -> Option<lopdf::Dictionary> {
        let Ok(Object::Dictionary(dict)) = doc.get_object(node_id) else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                return Some(res_dict.clone());
            }
        }

        // Continue up the tree
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.get_resources(doc, *parent_id),
            _ => None,
        }
    }
}

/// Build an image from uncompressed 8-bit RGB or grayscale samples.
fn decode_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: i64,
) -> Option<DynamicImage> {
    if bits_per_component != 8 {
        trace!("Unsupported bits per component: {}", bits_per_component);
        return None;
    }

    let pixels = (width as usize).checked_mul(height as usize)?;

    let channels = match color_space {
        b"DeviceRGB" | b"RGB" => 3,
        b"DeviceGray" | b"G" => 1,
        _ => {
            trace!("Unsupported color space: {}", String::from_utf8_lossy(color_space));
            return None;
        }
    };

    let expected = pixels.checked_mul(channels)?;
    if data.len() < expected {
        trace!("Image data too short: {} < {}", data.len(), expected);
        return None;
    }

    let mut rgba = Vec::with_capacity(pixels * 4);
    for chunk in data[..expected].chunks(channels) {
        match chunk {
            [r, g, b] => rgba.extend_from_slice(&[*r, *g, *b, 255]),
            [gray] => rgba.extend_from_slice(&[*gray, *gray, *gray, 255]),
            _ => return None,
        }
    }

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}

impl PageRasterizer for EmbeddedImageRasterizer {
    fn render_pages(&self, pdf: &Path, scratch: &Path) -> Result<Vec<PageImage>> {
        let doc = self.load(pdf)?;

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!("Extracting page images from {} pages", pages.len());

        Ok(pages
            .iter()
            .map(|(number, page_id)| self.render_page(&doc, *page_id, *number, scratch))
            .collect())
    }
}

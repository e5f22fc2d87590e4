//! PDF page rendering and text layer extraction.
//!
//! Requires the PDFium library at runtime (bundled next to the binary or
//! installed system-wide).

use image::RgbImage;
use pdfium_render::prelude::*;

use super::error::DocumentError;
use crate::invoice::bbox::BoundingBox;
use crate::ocr::OcrWord;

/// Rendering resolution in dots per inch.
pub const PDF_RENDER_DPI: f32 = 300.0;

/// PDF user space units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// The first page of a PDF: rendered pixels and text layer words.
#[derive(Debug)]
pub struct RenderedPage {
    pub image: RgbImage,
    /// Word boxes in pixel coordinates of `image`.
    pub words: Vec<OcrWord>,
}

fn bind_pdfium() -> Result<Pdfium, DocumentError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name())
        .or_else(|_| Pdfium::bind_to_system_library())?;
    Ok(Pdfium::new(bindings))
}

/// Loads the first page of the PDF in `bytes`.
///
/// # Errors
///
/// Returns [`DocumentError::PdfLoadError`] if PDFium cannot be loaded or the
/// file cannot be parsed, and [`DocumentError::EmptyPdf`] for a PDF without
/// pages.
pub fn load_first_page(bytes: &[u8]) -> Result<RenderedPage, DocumentError> {
    let pdfium = bind_pdfium()?;
    let document = pdfium.load_pdf_from_byte_slice(bytes, None)?;

    let page_count = document.pages().len();
    if page_count == 0 {
        return Err(DocumentError::EmptyPdf);
    }
    if page_count > 1 {
        tracing::info!(page_count, "Only the first PDF page is processed");
    }

    let page = document.pages().get(0)?;
    let scale = PDF_RENDER_DPI / POINTS_PER_INCH;

    let image = render_page(&page, scale)?;
    let text_page = page.text()?;
    let words = extract_words(&text_page, page.height().value, scale);

    tracing::debug!(
        width = image.width(),
        height = image.height(),
        words = words.len(),
        "Rendered PDF page"
    );

    Ok(RenderedPage { image, words })
}

fn render_page(page: &PdfPage<'_>, scale: f32) -> Result<RgbImage, DocumentError> {
    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
    let bitmap = page.render_with_config(&render_config)?;

    let width = bitmap.width() as u32;
    let height = bitmap.height() as u32;
    let raw_bytes = bitmap.as_raw_bytes();

    bgra_to_rgb(&raw_bytes, width, height).ok_or(DocumentError::PageRenderError { width, height })
}

/// Converts a PDFium BGRA buffer into an RGB image.
fn bgra_to_rgb(raw_bytes: &[u8], width: u32, height: u32) -> Option<RgbImage> {
    let stride = width as usize * 4;
    let mut rgb_data = Vec::with_capacity(width as usize * height as usize * 3);

    for y in 0..height as usize {
        for x in 0..width as usize {
            let pixel_index = y * stride + x * 4;
            if pixel_index + 2 < raw_bytes.len() {
                rgb_data.push(raw_bytes[pixel_index + 2]);
                rgb_data.push(raw_bytes[pixel_index + 1]);
                rgb_data.push(raw_bytes[pixel_index]);
            }
        }
    }

    RgbImage::from_raw(width, height, rgb_data)
}

/// Groups text layer characters into whitespace separated words.
///
/// PDF coordinates grow upwards from the bottom of the page, so y is flipped
/// against `page_height` before scaling to pixels.
fn extract_words(text_page: &PdfPageText<'_>, page_height: f32, scale: f32) -> Vec<OcrWord> {
    let mut words = Vec::new();
    let mut builder = WordBuilder::default();

    for char_obj in text_page.chars().iter() {
        let char_text = char_obj.unicode_string().unwrap_or_default();

        if char_text.trim().is_empty() {
            builder.flush(&mut words, page_height, scale);
            continue;
        }

        let bounds = char_obj.loose_bounds().ok().map(|rect| {
            (
                rect.left().value,
                rect.bottom().value,
                rect.right().value,
                rect.top().value,
            )
        });
        builder.push(&char_text, bounds);
    }
    builder.flush(&mut words, page_height, scale);

    words
}

#[derive(Default)]
struct WordBuilder {
    text: String,
    bounds: Option<(f32, f32, f32, f32)>,
}

impl WordBuilder {
    fn push(&mut self, text: &str, bounds: Option<(f32, f32, f32, f32)>) {
        self.text.push_str(text);

        let Some((left, bottom, right, top)) = bounds else {
            return;
        };
        self.bounds = Some(match self.bounds {
            Some((min_x, min_y, max_x, max_y)) => (
                min_x.min(left),
                min_y.min(bottom),
                max_x.max(right),
                max_y.max(top),
            ),
            None => (left, bottom, right, top),
        });
    }

    fn flush(&mut self, words: &mut Vec<OcrWord>, page_height: f32, scale: f32) {
        let text = std::mem::take(&mut self.text);
        // characters without bounds cannot be placed on the page
        if let Some((min_x, min_y, max_x, max_y)) = self.bounds.take() {
            if !text.is_empty() {
                words.push(OcrWord::new(
                    text,
                    BoundingBox::new(
                        min_x * scale,
                        (page_height - max_y) * scale,
                        max_x * scale,
                        (page_height - min_y) * scale,
                    ),
                ));
            }
        }
    }
}

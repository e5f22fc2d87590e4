//! Drawing of extracted fields onto the invoice image.

use std::fs;
use std::path::Path;

use ab_glyph::{FontArc, FontVec, PxScale};
use image::RgbImage;
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use super::bbox::BoundingBox;
use super::labels::LabelPalette;
use crate::utils::error::ImageError;

/// Offset of the label text from the top-left corner of its box.
const LABEL_OFFSET: i32 = 10;

pub const DEFAULT_FONT_SCALE: f32 = 12.0;

/// Caption font compiled into the binary.
static DEFAULT_FONT: &[u8] = include_bytes!("../../assets/DejaVuSansMono.ttf");

fn default_font() -> Option<FontArc> {
    match FontArc::try_from_slice(DEFAULT_FONT) {
        Ok(font) => Some(font),
        Err(e) => {
            tracing::warn!("Embedded caption font is unreadable: {e}");
            None
        }
    }
}

/// Draws box outlines and label captions in palette colors.
///
/// Captions use the embedded DejaVu Sans Mono unless another font is loaded.
/// Without a font only the outlines are drawn.
#[derive(Clone)]
pub struct Annotator {
    palette: LabelPalette,
    font: Option<FontArc>,
    font_scale: f32,
}

impl Annotator {
    pub fn new(palette: LabelPalette) -> Self {
        Self {
            palette,
            font: default_font(),
            font_scale: DEFAULT_FONT_SCALE,
        }
    }

    #[must_use]
    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(FontArc::new(font));
        self
    }

    /// Drops the caption font so only outlines are drawn.
    #[must_use]
    pub fn without_font(mut self) -> Self {
        self.font = None;
        self
    }

    /// Loads a TrueType/OpenType font for the label captions.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::FontLoad`] if the file cannot be read or parsed.
    pub fn with_font_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| ImageError::FontLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let font = FontVec::try_from_vec(bytes).map_err(|e| ImageError::FontLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(self.with_font(font))
    }

    #[must_use]
    pub fn with_font_scale(mut self, font_scale: f32) -> Self {
        self.font_scale = font_scale;
        self
    }

    pub fn palette(&self) -> &LabelPalette {
        &self.palette
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn font_scale(&self) -> f32 {
        self.font_scale
    }

    /// Outlines `bbox` and writes `caption` above its top-left corner.
    ///
    /// The color is looked up with the raw model label; unmapped labels use
    /// the palette's neutral color. Coordinates are inclusive pixel
    /// positions and anything outside the image is clipped.
    pub fn draw(&self, image: &mut RgbImage, raw_label: &str, caption: &str, bbox: &BoundingBox) {
        let color = self.palette.color_for(raw_label);

        let x0 = bbox.x_min as i32;
        let y0 = bbox.y_min as i32;
        let x1 = bbox.x_max as i32;
        let y1 = bbox.y_max as i32;
        let width = (x1 - x0 + 1).max(1) as u32;
        let height = (y1 - y0 + 1).max(1) as u32;

        draw_hollow_rect_mut(image, Rect::at(x0, y0).of_size(width, height), color);

        if let Some(font) = &self.font {
            draw_text_mut(
                image,
                color,
                x0 + LABEL_OFFSET,
                y0 - LABEL_OFFSET,
                PxScale::from(self.font_scale),
                font,
                caption,
            );
        }
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(LabelPalette::default())
    }
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("palette", &self.palette)
            .field("font", &self.font.is_some())
            .field("font_scale", &self.font_scale)
            .finish()
    }
}

//! Word recognition with Tesseract.

use image::{ImageFormat, RgbImage};
use leptess::{LepTess, Variable};

use super::error::OcrError;
use super::OcrWord;
use crate::invoice::bbox::BoundingBox;

/// Fully automatic page segmentation.
const PAGE_SEGMENTATION_MODE: &str = "3";

/// Recognizes the words of `image`, returning boxes in image pixels.
pub fn recognize_words(image: &RgbImage, language: &str) -> Result<Vec<OcrWord>, OcrError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(OcrError::InvalidImageDimensions { width, height });
    }

    let mut lt = LepTess::new(None, language)
        .map_err(|e| OcrError::InitError(format!("language '{language}': {e}")))?;

    lt.set_variable(Variable::TesseditPagesegMode, PAGE_SEGMENTATION_MODE)
        .map_err(|e| OcrError::InitError(format!("Failed to set PSM: {e}")))?;

    // leptess expects encoded image data
    let mut png_buf = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut png_buf, ImageFormat::Png)
        .map_err(|e| OcrError::RecognitionError(format!("Failed to encode image to PNG: {e}")))?;

    lt.set_image_from_mem(png_buf.get_ref())
        .map_err(|e| OcrError::RecognitionError(format!("Failed to set image: {e}")))?;

    // None means no text on the page
    let boxes = match lt.get_component_boxes(leptess::capi::TessPageIteratorLevel_RIL_WORD, true) {
        Some(boxes) => boxes,
        None => return Ok(Vec::new()),
    };

    let mut words = Vec::new();
    for component in &boxes {
        let geom = component.get_geometry();
        lt.set_rectangle(geom.x, geom.y, geom.w, geom.h);

        let text = lt.get_utf8_text().unwrap_or_default().trim().to_string();
        if text.is_empty() {
            continue;
        }

        let x = geom.x as f32;
        let y = geom.y as f32;
        words.push(OcrWord::new(
            text,
            BoundingBox::new(x, y, x + geom.w as f32, y + geom.h as f32),
        ));
    }

    Ok(words)
}

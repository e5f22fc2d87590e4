use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use ndarray::{Array, Array4};

use super::error::ImageError;

/// Converts an RGB image into a `[1, 3, height, width]` tensor.
///
/// Each channel value becomes `pixel * norm - mean * norm`.
pub fn subtract_mean_normalize(
    img: &RgbImage,
    mean_values: &[f32; 3],
    norm_values: &[f32; 3],
) -> Array4<f32> {
    let width = img.width() as usize;
    let height = img.height() as usize;

    let mut input = Array::zeros((1, 3, height, width));

    for (x, y, pixel) in img.enumerate_pixels() {
        for ch in 0..3 {
            let pixel_value = pixel.0[ch] as f32;
            let normalized = (pixel_value * norm_values[ch]) - (mean_values[ch] * norm_values[ch]);
            input[[0, ch, y as usize, x as usize]] = normalized;
        }
    }

    input
}

/// Encodes an RGB image as PNG bytes.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, ImageError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(ImageError::InvalidInput {
            message: format!("cannot encode a {}x{} image", img.width(), img.height()),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .map_err(|source| ImageError::EncodeFailed { source })?;
    Ok(buffer.into_inner())
}

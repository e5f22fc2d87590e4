//! Axis-aligned bounding boxes.
//!
//! The layout model works on a resolution-independent grid where both axes
//! run from 0 to [`NORMALIZED_SCALE`]. [`BoundingBox`] is used for boxes on
//! that grid as well as for boxes in image pixels; the conversion methods
//! move a box between the two spaces.
//!
//! # Serialization
//!
//! A box serializes as a flat array `[x_min, y_min, x_max, y_max]`:
//!
//! ```json
//! [100.0, 400.0, 300.0, 500.0]
//! ```

use serde::{Deserialize, Serialize};

/// Upper bound of the normalized coordinate grid used by the layout model.
pub const NORMALIZED_SCALE: f32 = 1000.0;

/// An axis-aligned box given by its top-left and bottom-right corners.
///
/// No ordering between the corners is enforced. Boxes coming from a sane
/// model output satisfy `x_min <= x_max` and `y_min <= y_max`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BoundingBox {
    #[inline]
    pub const fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Maps a box from the 0-1000 grid onto an image of `width` x `height` pixels.
    ///
    /// x-coordinates are scaled by `width / 1000` and y-coordinates by
    /// `height / 1000`.
    #[must_use]
    pub fn unnormalize(&self, width: f32, height: f32) -> Self {
        Self {
            x_min: width * (self.x_min / NORMALIZED_SCALE),
            y_min: height * (self.y_min / NORMALIZED_SCALE),
            x_max: width * (self.x_max / NORMALIZED_SCALE),
            y_max: height * (self.y_max / NORMALIZED_SCALE),
        }
    }

    /// Maps a pixel box of an image of `width` x `height` pixels onto the 0-1000 grid.
    ///
    /// This is the inverse of [`BoundingBox::unnormalize`]. The result is not
    /// rounded; use [`BoundingBox::truncate`] to get the integer grid cells the
    /// model consumes.
    #[must_use]
    pub fn normalize(&self, width: f32, height: f32) -> Self {
        Self {
            x_min: NORMALIZED_SCALE * (self.x_min / width),
            y_min: NORMALIZED_SCALE * (self.y_min / height),
            x_max: NORMALIZED_SCALE * (self.x_max / width),
            y_max: NORMALIZED_SCALE * (self.y_max / height),
        }
    }

    /// Drops the fractional part of every coordinate.
    #[must_use]
    pub fn truncate(&self) -> Self {
        Self {
            x_min: self.x_min.trunc(),
            y_min: self.y_min.trunc(),
            x_max: self.x_max.trunc(),
            y_max: self.y_max.trunc(),
        }
    }

    /// Clamps every coordinate into `[0, NORMALIZED_SCALE]`.
    #[must_use]
    pub fn clamp_normalized(&self) -> Self {
        Self {
            x_min: self.x_min.clamp(0.0, NORMALIZED_SCALE),
            y_min: self.y_min.clamp(0.0, NORMALIZED_SCALE),
            x_max: self.x_max.clamp(0.0, NORMALIZED_SCALE),
            y_max: self.y_max.clamp(0.0, NORMALIZED_SCALE),
        }
    }

    /// Integer coordinates in the layout model's `bbox` input format.
    #[must_use]
    pub fn to_model_coords(&self) -> [i64; 4] {
        [
            self.x_min as i64,
            self.y_min as i64,
            self.x_max as i64,
            self.y_max as i64,
        ]
    }

    #[inline]
    pub fn to_array(&self) -> [f32; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(coords: [f32; 4]) -> Self {
        Self::new(coords[0], coords[1], coords[2], coords[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        bbox.to_array()
    }
}

//! The token-classification capability used by invoice extraction.

use image::RgbImage;
use ndarray::Array4;

use crate::inference::error::InferenceError;
use crate::invoice::bbox::BoundingBox;
use crate::ocr::OcrWord;

/// Per-token model inputs for one page.
///
/// `input_ids`, `attention_mask`, `offsets` and `boxes` are index-aligned.
/// Offsets are character spans relative to the word a token came from, so a
/// token starts a new word exactly when its offset starts at 0. Boxes are on
/// the normalized 0-1000 grid.
#[derive(Debug, Clone)]
pub struct TokenEncoding {
    pub input_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub offsets: Vec<(usize, usize)>,
    pub boxes: Vec<BoundingBox>,
    /// Preprocessed page image in NCHW layout.
    pub pixel_values: Array4<f32>,
}

impl TokenEncoding {
    /// Creates an encoding with a full attention mask and no pixel data.
    pub fn new(input_ids: Vec<u32>, offsets: Vec<(usize, usize)>, boxes: Vec<BoundingBox>) -> Self {
        let attention_mask = vec![1; input_ids.len()];
        Self {
            input_ids,
            attention_mask,
            offsets,
            boxes,
            pixel_values: Array4::zeros((1, 3, 0, 0)),
        }
    }

    #[must_use]
    pub fn with_pixel_values(mut self, pixel_values: Array4<f32>) -> Self {
        self.pixel_values = pixel_values;
        self
    }

    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// A document model that labels the tokens of a page.
pub trait TokenClassifier {
    /// Tokenizes the page words and prepares the image for the model.
    fn encode(&self, image: &RgbImage, words: &[OcrWord]) -> Result<TokenEncoding, InferenceError>;

    /// Predicts one label per token, resolved to its label string.
    fn classify(&mut self, encoding: &TokenEncoding) -> Result<Vec<String>, InferenceError>;

    /// Turns a run of token ids back into text.
    fn decode(&self, ids: &[u32]) -> Result<String, InferenceError>;
}

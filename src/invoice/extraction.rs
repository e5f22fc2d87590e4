//! Token-to-field extraction.
//!
//! The layout model labels sub-word tokens. This module turns those token
//! labels back into whole words with pixel boxes, keeps the words whose label
//! is an item of interest, and draws them onto the invoice image.
//!
//! # Pipeline
//!
//! 1. Encode the image and its OCR words into tokens.
//! 2. Classify every token.
//! 3. Keep the label and box of each word-start token (offset start `0`).
//! 4. Scale the kept boxes from the 0-1000 grid to image pixels.
//! 5. Decode the tokens between consecutive word starts into word text.
//! 6. Pair words, labels and boxes by position and keep the interesting ones.
//!
//! The text of the last word start is never decoded because there is no
//! following word start to close its token range, so a sequence with `n`
//! word starts yields at most `n - 1` words.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::annotate::Annotator;
use super::bbox::BoundingBox;
use super::error::ExtractionError;
use super::labels::{parse_label, ItemsOfInterest, LabelPalette};
use crate::inference::{TokenClassifier, TokenEncoding};
use crate::ocr::OcrWord;
use crate::utils::config::AppConfig;

/// One extracted invoice field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    /// Decoded word text.
    pub word: String,
    /// Label without its tagging prefix, or `"other"`.
    pub label: String,
    /// Word box in image pixels.
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

/// Which labels to extract and how to draw them.
#[derive(Debug, Clone, Default)]
pub struct ExtractionOptions {
    pub items_of_interest: ItemsOfInterest,
    pub annotator: Annotator,
}

impl ExtractionOptions {
    pub fn new(items_of_interest: ItemsOfInterest, annotator: Annotator) -> Self {
        Self {
            items_of_interest,
            annotator,
        }
    }

    /// Builds options from the application configuration.
    ///
    /// `font_path` replaces the embedded caption font. A font that cannot be
    /// loaded is logged and the embedded one is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::InvalidColor`] for unknown color names in
    /// `label_colors`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ExtractionError> {
        let palette = LabelPalette::default().with_names(
            config
                .label_colors
                .iter()
                .map(|(label, color)| (label.clone(), color.as_str())),
        )?;

        let annotator = Annotator::new(palette).with_font_scale(config.font_scale);
        let annotator = match config.font_path.as_deref() {
            Some(path) => match annotator.clone().with_font_file(path) {
                Ok(annotator) => annotator,
                Err(e) => {
                    tracing::warn!("Using the embedded caption font: {e}");
                    annotator
                }
            },
            None => annotator,
        };

        let items_of_interest = ItemsOfInterest::new(config.items_of_interest.iter().cloned());

        Ok(Self::new(items_of_interest, annotator))
    }

    #[must_use]
    pub fn with_items_of_interest(mut self, items_of_interest: ItemsOfInterest) -> Self {
        self.items_of_interest = items_of_interest;
        self
    }
}

/// A token continues the previous word when its offset does not start at 0.
#[inline]
pub fn is_subword(offset: &(usize, usize)) -> bool {
    offset.0 != 0
}

/// Indices of the tokens that start a new word.
pub fn word_start_indices(offsets: &[(usize, usize)]) -> Vec<usize> {
    offsets
        .iter()
        .enumerate()
        .filter(|(_, offset)| !is_subword(offset))
        .map(|(idx, _)| idx)
        .collect()
}

/// Keeps the entries of `values` that belong to word-start tokens, in order.
pub fn retain_word_starts<T: Clone>(values: &[T], offsets: &[(usize, usize)]) -> Vec<T> {
    values
        .iter()
        .zip(offsets)
        .filter(|(_, offset)| !is_subword(offset))
        .map(|(value, _)| value.clone())
        .collect()
}

/// Decodes the token range between each pair of consecutive word starts.
///
/// The last word start has no closing boundary and produces no word.
pub fn reconstruct_words<F, E>(
    input_ids: &[u32],
    word_starts: &[usize],
    mut decode: F,
) -> Result<Vec<String>, E>
where
    F: FnMut(&[u32]) -> Result<String, E>,
{
    word_starts
        .windows(2)
        .map(|bounds| decode(&input_ids[bounds[0]..bounds[1]]))
        .collect()
}

fn check_token_arrays(
    encoding: &TokenEncoding,
    predictions: &[String],
) -> Result<(), ExtractionError> {
    let expected = encoding.input_ids.len();
    if expected == 0 {
        return Err(ExtractionError::EmptyEncoding);
    }

    let lengths = [
        ("offsets", encoding.offsets.len()),
        ("boxes", encoding.boxes.len()),
        ("predictions", predictions.len()),
    ];
    for (field, actual) in lengths {
        if actual != expected {
            return Err(ExtractionError::LengthMismatch {
                field,
                expected,
                actual,
            });
        }
    }

    Ok(())
}

/// Extracts the fields of interest from an invoice image and annotates it.
///
/// The image is drawn on in place: every emitted field gets an outline in
/// its label color and a caption with the stripped label. Fields come back in
/// token order.
///
/// # Errors
///
/// - [`ExtractionError::InvalidImage`] if the image has a zero dimension.
/// - [`ExtractionError::EmptyEncoding`] if the classifier produced no tokens.
/// - [`ExtractionError::LengthMismatch`] if the per-token arrays disagree.
/// - [`ExtractionError::Inference`] if encoding, inference or decoding fails.
pub fn process_invoice<C: TokenClassifier>(
    image: &mut RgbImage,
    words: &[OcrWord],
    classifier: &mut C,
    options: &ExtractionOptions,
) -> Result<Vec<FieldRecord>, ExtractionError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ExtractionError::InvalidImage { width, height });
    }

    let encoding = classifier.encode(image, words)?;
    let predictions = classifier.classify(&encoding)?;
    check_token_arrays(&encoding, &predictions)?;

    let true_predictions = retain_word_starts(&predictions, &encoding.offsets);
    let true_boxes: Vec<BoundingBox> = retain_word_starts(&encoding.boxes, &encoding.offsets)
        .into_iter()
        .map(|bbox| bbox.unnormalize(width as f32, height as f32))
        .collect();

    let word_starts = word_start_indices(&encoding.offsets);
    let decoded_words =
        reconstruct_words(&encoding.input_ids, &word_starts, |ids| classifier.decode(ids))?;

    tracing::debug!(
        tokens = encoding.len(),
        words = decoded_words.len(),
        "Reconstructed words from tokens"
    );

    let mut fields = Vec::new();
    for ((word, predicted_label), bbox) in decoded_words
        .into_iter()
        .zip(true_predictions)
        .zip(true_boxes)
    {
        if !options.items_of_interest.contains(&predicted_label) {
            continue;
        }

        let label = parse_label(&predicted_label);
        options
            .annotator
            .draw(image, &predicted_label, &label, &bbox);

        fields.push(FieldRecord { word, label, bbox });
    }

    tracing::info!(fields = fields.len(), "Extracted invoice fields");

    Ok(fields)
}

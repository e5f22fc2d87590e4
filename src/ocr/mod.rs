//! Page words for the layout model.
//!
//! The layout model reads words together with their positions. Words come
//! from one of three sources, tried in order:
//!
//! 1. words supplied by the caller,
//! 2. the text layer of a PDF upload,
//! 3. Tesseract OCR (cargo feature `tesseract`, on by default).
//!
//! Builds with `--no-default-features` have no OCR, so image uploads need
//! supplied words.

pub mod error;
#[cfg(feature = "tesseract")]
pub mod tesseract;

use serde::{Deserialize, Serialize};

pub use error::OcrError;

use crate::document::InvoiceDocument;
use crate::invoice::bbox::BoundingBox;

/// A word on the page with its box in image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrWord {
    pub text: String,
    pub bbox: BoundingBox,
}

impl OcrWord {
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

fn non_blank(words: Vec<OcrWord>) -> Vec<OcrWord> {
    words
        .into_iter()
        .filter(|word| !word.text.trim().is_empty())
        .collect()
}

/// Picks the words for `document`.
///
/// `language` is only used when OCR has to run.
///
/// # Errors
///
/// Returns [`OcrError::NoWordSource`] when no words were supplied, the
/// document has no text layer and OCR support is not compiled in.
pub fn resolve_words(
    supplied: Option<Vec<OcrWord>>,
    document: &InvoiceDocument,
    language: &str,
) -> Result<Vec<OcrWord>, OcrError> {
    if let Some(words) = supplied {
        tracing::debug!(count = words.len(), "Using caller-supplied words");
        return Ok(non_blank(words));
    }

    if let Some(words) = document.words().filter(|words| !words.is_empty()) {
        tracing::debug!(count = words.len(), "Using PDF text layer words");
        return Ok(non_blank(words.to_vec()));
    }

    recognize(document, language)
}

#[cfg(feature = "tesseract")]
fn recognize(document: &InvoiceDocument, language: &str) -> Result<Vec<OcrWord>, OcrError> {
    let words = tesseract::recognize_words(document.image(), language)?;
    tracing::debug!(count = words.len(), "Recognized words with Tesseract");
    Ok(non_blank(words))
}

#[cfg(not(feature = "tesseract"))]
fn recognize(_document: &InvoiceDocument, _language: &str) -> Result<Vec<OcrWord>, OcrError> {
    Err(OcrError::NoWordSource)
}

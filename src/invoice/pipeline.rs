use image::RgbImage;

use super::error::ExtractionError;
use super::extraction::{process_invoice, ExtractionOptions, FieldRecord};
use crate::document::InvoiceDocument;
use crate::inference::TokenClassifier;
use crate::ocr::{resolve_words, OcrWord};

/// Fields of one invoice page together with the annotated page.
#[derive(Debug, Clone)]
pub struct ExtractedInvoice {
    pub fields: Vec<FieldRecord>,
    pub image: RgbImage,
}

/// Runs a whole upload through word resolution and field extraction.
///
/// `supplied_words` take precedence over the document's own words; see
/// [`resolve_words`].
pub fn extract_document<C: TokenClassifier>(
    document: InvoiceDocument,
    supplied_words: Option<Vec<OcrWord>>,
    classifier: &mut C,
    options: &ExtractionOptions,
    ocr_language: &str,
) -> Result<ExtractedInvoice, ExtractionError> {
    let words = resolve_words(supplied_words, &document, ocr_language)?;
    tracing::debug!(words = words.len(), "Resolved page words");

    let mut image = document.into_image();
    let fields = process_invoice(&mut image, &words, classifier, options)?;

    Ok(ExtractedInvoice { fields, image })
}

pub mod annotate;
pub mod bbox;
pub mod error;
pub mod extraction;
pub mod labels;
pub mod pipeline;

pub use annotate::{Annotator, DEFAULT_FONT_SCALE};
pub use bbox::{BoundingBox, NORMALIZED_SCALE};
pub use error::ExtractionError;
pub use extraction::{
    is_subword, process_invoice, reconstruct_words, retain_word_starts, word_start_indices,
    ExtractionOptions, FieldRecord,
};
pub use labels::{
    parse_color, parse_label, ItemsOfInterest, LabelPalette, DEFAULT_ITEMS_OF_INTEREST,
    NEUTRAL_COLOR,
};
pub use pipeline::{extract_document, ExtractedInvoice};

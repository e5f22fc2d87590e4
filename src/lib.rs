pub mod document;
pub mod inference;
pub mod invoice;
pub mod ocr;
pub mod server;
pub mod utils;

pub use document::{DocumentError, DocumentType, InvoiceDocument};
pub use inference::{InferenceError, LayoutLmv3, TokenClassifier, TokenEncoding};
pub use invoice::{
    extract_document, process_invoice, BoundingBox, ExtractionError, ExtractionOptions,
    FieldRecord,
};
pub use ocr::{OcrError, OcrWord};
pub use server::{create_app, start_server};

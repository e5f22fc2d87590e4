use thiserror::Error;

use crate::inference::InferenceError;
use crate::ocr::OcrError;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImage { width: u32, height: u32 },

    #[error("Token encoding is empty")]
    EmptyEncoding,

    #[error("Inconsistent token arrays: {field} has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid color '{color}' for label '{label}'")]
    InvalidColor { label: String, color: String },

    #[error("Model inference failed")]
    Inference {
        #[from]
        source: InferenceError,
    },

    #[error("Failed to obtain page words")]
    Words {
        #[from]
        source: OcrError,
    },
}

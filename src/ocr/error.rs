use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("No words available: supply words, upload a PDF with a text layer, or build with the `tesseract` feature")]
    NoWordSource,

    #[error("Failed to initialize Tesseract: {0}")]
    InitError(String),

    #[error("Failed to run OCR: {0}")]
    RecognitionError(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImageDimensions { width: u32, height: u32 },
}

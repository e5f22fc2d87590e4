use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use crate::invoice::FieldRecord;
use crate::ocr::OcrWord;

const FORBIDDEN_FILENAME_CHARS: &[char] = &['/', '\0'];

/// Base64 encoding expands data by ~4/3.
fn max_base64_length(max_file_size: u64) -> u64 {
    (max_file_size / 3 + 1) * 4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRequest {
    /// Base64-encoded invoice (png, jpg, jpeg or pdf)
    pub data: String,

    /// Filename with extension
    pub filename: String,

    /// Raw labels to extract; the configured set when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_of_interest: Option<Vec<String>>,

    /// Page words in image pixels; skips the text layer and OCR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<OcrWord>>,
}

impl InvoiceRequest {
    pub fn validate_and_decode(&self, max_file_size: u64) -> Result<Vec<u8>, ValidationError> {
        self.validate_filename()?;
        self.validate_and_decode_base64(max_file_size)
    }

    fn validate_and_decode_base64(&self, max_file_size: u64) -> Result<Vec<u8>, ValidationError> {
        if self.data.len() as u64 > max_base64_length(max_file_size) {
            return Err(ValidationError::Base64DataTooLarge);
        }

        let decoded = STANDARD
            .decode(&self.data)
            .map_err(|e| ValidationError::InvalidBase64(e.to_string()))?;

        if decoded.len() as u64 > max_file_size {
            return Err(ValidationError::FileSizeTooLarge);
        }

        Ok(decoded)
    }

    fn validate_filename(&self) -> Result<(), ValidationError> {
        let filename = self.filename.trim();

        if filename.is_empty() {
            return Err(ValidationError::EmptyFilename);
        }

        if filename.len() > 255 {
            return Err(ValidationError::FilenameTooLong);
        }

        if let Some(ch) = filename
            .chars()
            .find(|ch| FORBIDDEN_FILENAME_CHARS.contains(ch))
        {
            return Err(ValidationError::ForbiddenCharacter(ch));
        }

        if !filename.contains('.') || filename.ends_with('.') {
            return Err(ValidationError::MissingExtension);
        }

        if filename.starts_with('.') {
            return Err(ValidationError::InvalidFilenameEdges);
        }

        Ok(())
    }

    pub fn sanitized_filename(&self) -> String {
        self.filename.trim().to_string()
    }
}

/// Extraction output returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceResult {
    pub fields: Vec<FieldRecord>,
    /// Annotated page as base64 PNG
    pub annotated_image: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub status: String,
    pub result: InvoiceResult,
}

impl InvoiceResponse {
    pub fn success(result: InvoiceResult) -> Self {
        Self {
            status: "success".to_string(),
            result,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::document::DocumentError;
use crate::invoice::ExtractionError;
use crate::utils::ImageError;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Base64 data exceeds the maximum allowed size")]
    Base64DataTooLarge,

    #[error("Invalid base64 data: {0}")]
    InvalidBase64(String),

    #[error("Decoded file exceeds the maximum allowed size")]
    FileSizeTooLarge,

    #[error("Filename is empty")]
    EmptyFilename,

    #[error("Filename exceeds 255 characters")]
    FilenameTooLong,

    #[error("Filename contains forbidden character {0:?}")]
    ForbiddenCharacter(char),

    #[error("Filename has no extension")]
    MissingExtension,

    #[error("Filename starts with a dot or has surrounding spaces")]
    InvalidFilenameEdges,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid request")]
    Validation {
        #[from]
        source: ValidationError,
    },

    #[error("Document processing error")]
    Document {
        #[from]
        source: DocumentError,
    },

    #[error("Invoice extraction error")]
    Extraction {
        #[from]
        source: ExtractionError,
    },

    #[error("Image encoding error")]
    Image {
        #[from]
        source: ImageError,
    },

    #[error("Extraction task failed")]
    Task {
        #[from]
        source: tokio::task::JoinError,
    },
}

/// Renders an error with its source chain, e.g. `outer: inner`.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "Bad Request".to_string(),
                Some(msg.clone()),
            ),
            AppError::Validation { source } => (
                StatusCode::BAD_REQUEST,
                "Bad Request".to_string(),
                Some(source.to_string()),
            ),
            AppError::Document { source } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Document Processing Error".to_string(),
                Some(error_chain(source)),
            ),
            AppError::Extraction { source } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invoice Extraction Error".to_string(),
                Some(error_chain(source)),
            ),
            AppError::Image { source } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Image Encoding Error".to_string(),
                Some(error_chain(source)),
            ),
            AppError::Task { source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
                Some(source.to_string()),
            ),
        };

        tracing::warn!(status = status.as_u16(), "{}", error_chain(&self));

        let mut error_response = ErrorResponse::new(error_message);
        if let Some(details) = details {
            error_response = error_response.with_details(details);
        }

        (status, Json(error_response)).into_response()
    }
}

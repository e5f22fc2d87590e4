use std::borrow::Cow;

use axum::response::Json;
use base64::{engine::general_purpose::STANDARD, Engine};
use once_cell::sync::OnceCell;

use super::error::AppError;
use super::models::{HealthResponse, InvoiceRequest, InvoiceResponse, InvoiceResult};
use crate::document::InvoiceDocument;
use crate::inference::LayoutLmv3;
use crate::invoice::{extract_document, ExtractionError, ExtractionOptions, ItemsOfInterest};
use crate::utils::{image_utils, AppConfig};

/// Options built from the global configuration on first use.
static EXTRACTION_OPTIONS: OnceCell<ExtractionOptions> = OnceCell::new();

pub fn extraction_options() -> Result<&'static ExtractionOptions, ExtractionError> {
    EXTRACTION_OPTIONS.get_or_try_init(|| ExtractionOptions::from_config(AppConfig::get()))
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Invoice field extraction endpoint
pub async fn extract_invoice(
    Json(request): Json<InvoiceRequest>,
) -> Result<Json<InvoiceResponse>, AppError> {
    tracing::info!(filename = %request.filename, "Received invoice extraction request");

    let config = AppConfig::get();
    let document_bytes = request.validate_and_decode(config.max_file_size)?;
    let filename = request.sanitized_filename();

    let document = InvoiceDocument::new(&document_bytes, &filename)?;
    tracing::info!(doc_type = ?document.doc_type(), "Invoice loaded");

    let base_options = extraction_options()?;
    let options = match request.items_of_interest {
        Some(labels) => Cow::Owned(
            base_options
                .clone()
                .with_items_of_interest(ItemsOfInterest::new(labels)),
        ),
        None => Cow::Borrowed(base_options),
    };

    // OCR and inference block; keep them off the async workers.
    let supplied_words = request.words;
    let extracted = tokio::task::spawn_blocking(move || {
        LayoutLmv3::with_instance(|model| {
            extract_document(
                document,
                supplied_words,
                model,
                &options,
                &config.ocr_language,
            )
        })
    })
    .await??;

    let png = image_utils::encode_png(&extracted.image)?;

    tracing::info!(
        fields = extracted.fields.len(),
        "Invoice extraction completed successfully"
    );

    Ok(Json(InvoiceResponse::success(InvoiceResult {
        fields: extracted.fields,
        annotated_image: STANDARD.encode(png),
        width: extracted.image.width(),
        height: extracted.image.height(),
    })))
}

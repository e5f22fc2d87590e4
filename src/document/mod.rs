//! Invoice uploads.
//!
//! An upload is either an image or a PDF. Either way it ends up as a single
//! RGB page; PDFs also bring the words of their text layer.

pub mod error;
pub mod pdf;

use image::RgbImage;
use serde::{Deserialize, Serialize};

pub use error::DocumentError;

use crate::ocr::OcrWord;

/// Supported upload formats.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum DocumentType {
    /// PNG image (`.png`).
    Png,
    /// JPEG image (`.jpg`, `.jpeg`).
    Jpeg,
    /// Portable Document Format file (`.pdf`).
    Pdf,
}

impl DocumentType {
    /// Creates a `DocumentType` from a file extension without the leading dot.
    ///
    /// Matching ignores ASCII case.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::supported_types()
            .into_iter()
            .find(|(supported_ext, _)| supported_ext.eq_ignore_ascii_case(ext))
            .map(|(_, doc_type)| doc_type)
    }

    /// All recognized extensions, aliases included.
    #[must_use]
    pub fn supported_types() -> Vec<(&'static str, DocumentType)> {
        vec![
            ("png", DocumentType::Png),
            ("jpg", DocumentType::Jpeg),
            ("jpeg", DocumentType::Jpeg),
            ("pdf", DocumentType::Pdf),
        ]
    }

    #[must_use]
    pub fn canonical_extension(&self) -> &'static str {
        match self {
            DocumentType::Png => "png",
            DocumentType::Jpeg => "jpg",
            DocumentType::Pdf => "pdf",
        }
    }
}

/// A decoded invoice page.
#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    doc_type: DocumentType,
    image: RgbImage,
    words: Option<Vec<OcrWord>>,
}

impl InvoiceDocument {
    /// Decodes `bytes`, picking the format from the extension of `filename`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnsupportedFileType`] for unknown or missing
    /// extensions, and a load error when the content cannot be decoded.
    pub fn new(bytes: &[u8], filename: &str) -> Result<Self, DocumentError> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| DocumentError::UnsupportedFileType {
                extension: "(no extension)".to_string(),
            })?;

        let doc_type = DocumentType::from_extension(extension).ok_or_else(|| {
            DocumentError::UnsupportedFileType {
                extension: extension.to_string(),
            }
        })?;

        match doc_type {
            DocumentType::Png | DocumentType::Jpeg => Self::from_image_bytes(bytes, doc_type),
            DocumentType::Pdf => {
                let page = pdf::load_first_page(bytes)?;
                Ok(Self {
                    doc_type,
                    image: page.image,
                    words: Some(page.words),
                })
            }
        }
    }

    fn from_image_bytes(bytes: &[u8], doc_type: DocumentType) -> Result<Self, DocumentError> {
        let image = image::load_from_memory(bytes)?.to_rgb8();
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            "Decoded image upload"
        );
        Ok(Self {
            doc_type,
            image,
            words: None,
        })
    }

    /// Wraps an already decoded page.
    #[must_use]
    pub fn from_image(image: RgbImage) -> Self {
        Self {
            doc_type: DocumentType::Png,
            image,
            words: None,
        }
    }

    pub fn doc_type(&self) -> DocumentType {
        self.doc_type
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Words from the PDF text layer, `None` for image uploads.
    pub fn words(&self) -> Option<&[OcrWord]> {
        self.words.as_deref()
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

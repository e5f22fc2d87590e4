use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Unsupported file type: {extension}")]
    UnsupportedFileType { extension: String },

    #[error("Failed to load image content")]
    ImageLoadError {
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to load PDF content")]
    PdfLoadError {
        #[source]
        source: pdfium_render::prelude::PdfiumError,
    },

    #[error("PDF has no pages")]
    EmptyPdf,

    #[error("Rendered page could not be converted to an image ({width}x{height})")]
    PageRenderError { width: u32, height: u32 },
}

impl From<pdfium_render::prelude::PdfiumError> for DocumentError {
    fn from(source: pdfium_render::prelude::PdfiumError) -> Self {
        DocumentError::PdfLoadError { source }
    }
}

impl From<image::ImageError> for DocumentError {
    fn from(source: image::ImageError) -> Self {
        DocumentError::ImageLoadError { source }
    }
}

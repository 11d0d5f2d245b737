//! Error types for the spoolscan-core library.

use thiserror::Error;

/// Main error type for the spoolscan library.
#[derive(Error, Debug)]
pub enum SpoolscanError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Thumbnail resolution error.
    #[error("thumbnail error: {0}")]
    Thumb(#[from] ThumbError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract images from PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to thumbnail resolution.
///
/// These are recoverable per strategy: a failed source is logged and the
/// resolver moves on to the next one, so they rarely surface past the
/// resolve report.
#[derive(Error, Debug)]
pub enum ThumbError {
    /// Failed to decode image bytes.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// Failed to fetch a mapped image from disk or over HTTP.
    #[error("failed to fetch image: {0}")]
    Fetch(String),

    /// Failed to render a page or a placeholder.
    #[error("failed to render: {0}")]
    Render(String),

    /// Failed to write a thumbnail to the image directory.
    #[error("failed to write thumbnail: {0}")]
    Write(String),
}

/// Result type for the spoolscan library.
pub type Result<T> = std::result::Result<T, SpoolscanError>;

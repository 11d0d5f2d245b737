//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
///
/// The resolver and the OCR path are written against this trait so tests
/// can substitute synthetic documents.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Render a page as an image at the specified DPI.
    fn render_page(&self, page: u32, dpi: u32) -> Result<DynamicImage>;

    /// Enumerate raster images embedded anywhere in the document.
    ///
    /// Order is deterministic: pages in order, then XObject entries as they
    /// appear in each page's resources. A stream referenced by several
    /// pages is returned once.
    fn embedded_images(&self) -> Result<Vec<DynamicImage>>;
}

//! OCR support for order pages that render as pure images.

#[cfg(feature = "ocr")]
mod engine;

#[cfg(feature = "ocr")]
pub use engine::PureOcrEngine;

use crate::error::OcrError;
use crate::pdf::PdfProcessor;
use image::DynamicImage;
use tracing::warn;

/// A text recognizer turning one image into text fragments.
///
/// Fragments come back in reading order: top to bottom, then left to
/// right within a band.
pub trait TextRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>, OcrError>;
}

/// Render every page of a document and collect recognized fragments.
///
/// Pages that fail to render or recognize are logged and skipped; a
/// fully unreadable document yields an empty list, which callers treat
/// as "no OCR lines available".
pub fn recognize_document<P: PdfProcessor>(
    pdf: &P,
    recognizer: &dyn TextRecognizer,
    render_dpi: u32,
    upscale: f32,
) -> Vec<String> {
    let mut fragments = Vec::new();

    for page in 1..=pdf.page_count() {
        let image = match pdf.render_page(page, render_dpi) {
            Ok(image) => image,
            Err(e) => {
                warn!("Skipping page {}: {}", page, e);
                continue;
            }
        };
        let image = upscale_for_recognition(image, upscale);
        match recognizer.recognize(&image) {
            Ok(mut page_fragments) => fragments.append(&mut page_fragments),
            Err(e) => warn!("Recognition failed on page {}: {}", page, e),
        }
    }

    fragments
}

/// Upscale small renders so thin glyphs survive recognition.
fn upscale_for_recognition(image: DynamicImage, factor: f32) -> DynamicImage {
    if factor <= 1.0 {
        return image;
    }
    let width = (image.width() as f32 * factor) as u32;
    let height = (image.height() as f32 * factor) as u32;
    image.resize_exact(width, height, image::imageops::FilterType::CatmullRom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use crate::pdf;
    use pretty_assertions::assert_eq;

    struct StubPdf {
        pages: u32,
    }

    impl PdfProcessor for StubPdf {
        fn load(&mut self, _data: &[u8]) -> pdf::Result<()> {
            Ok(())
        }

        fn page_count(&self) -> u32 {
            self.pages
        }

        fn extract_text(&self) -> pdf::Result<String> {
            Ok(String::new())
        }

        fn render_page(&self, page: u32, _dpi: u32) -> pdf::Result<DynamicImage> {
            if page == 2 {
                return Err(PdfError::ImageExtraction("blank page".to_string()));
            }
            Ok(DynamicImage::new_rgb8(40, 20))
        }

        fn embedded_images(&self) -> pdf::Result<Vec<DynamicImage>> {
            Ok(Vec::new())
        }
    }

    struct EchoRecognizer;

    impl TextRecognizer for EchoRecognizer {
        fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>, OcrError> {
            Ok(vec![format!("{}x{}", image.width(), image.height())])
        }
    }

    #[test]
    fn test_recognize_document_skips_failed_pages() {
        let pdf = StubPdf { pages: 3 };
        let fragments = recognize_document(&pdf, &EchoRecognizer, 150, 2.0);
        // Page 2 has no raster; pages 1 and 3 come back upscaled 2x
        assert_eq!(fragments, vec!["80x40".to_string(), "80x40".to_string()]);
    }

    #[test]
    fn test_upscale_at_or_below_one_is_identity() {
        let image = DynamicImage::new_rgb8(40, 20);
        let scaled = upscale_for_recognition(image, 1.0);
        assert_eq!((scaled.width(), scaled.height()), (40, 20));
    }
}

//! PDF text and image extraction using lopdf and pdf-extract.

use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Document, Object, ObjectId};
use std::collections::HashSet;
use tracing::{debug, trace};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))
    }

    /// Images referenced from one page's XObject resources.
    fn page_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;
        let pages = doc.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();
        self.collect_page_images(doc, *page_id, &mut HashSet::new(), &mut images);
        Ok(images)
    }

    fn collect_page_images(
        &self,
        doc: &Document,
        page_id: ObjectId,
        seen: &mut HashSet<ObjectId>,
        images: &mut Vec<DynamicImage>,
    ) {
        let resources = match self.page_resources(doc, page_id) {
            Some(resources) => resources,
            None => return,
        };
        let xobjects = match resources.get(b"XObject") {
            Ok(xobjects) => xobjects,
            Err(_) => return,
        };
        if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
            for (_name, obj_ref) in xobj_dict.iter() {
                if let Object::Reference(id) = obj_ref {
                    if !seen.insert(*id) {
                        continue;
                    }
                }
                if let Ok((_, obj)) = doc.dereference(obj_ref) {
                    if let Some(img) = self.decode_image_object(doc, obj) {
                        images.push(img);
                    }
                }
            }
        }
    }

    fn decode_image_object(&self, doc: &Document, obj: &Object) -> Option<DynamicImage> {
        let stream = match obj {
            Object::Stream(stream) => stream,
            _ => return None,
        };
        let dict = &stream.dict;

        let subtype = dict.get(b"Subtype").ok()?;
        if subtype.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;

        trace!("Found image object: {}x{}", width, height);

        let data = match stream.decompressed_content() {
            Ok(d) => d,
            Err(_) => stream.content.clone(),
        };

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) if !arr.is_empty() => {
                    arr.first().and_then(|o| o.as_name().ok())
                }
                _ => None,
            };

            match filter_name {
                Some(b"DCTDecode") => {
                    // JPEG data, stream content is the compressed file
                    trace!("Decoding JPEG image");
                    return image::load_from_memory_with_format(
                        &stream.content,
                        image::ImageFormat::Jpeg,
                    )
                    .ok();
                }
                Some(b"JPXDecode") => {
                    trace!("Found JPEG2000 image (not supported)");
                    return None;
                }
                Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    trace!("Found fax/JBIG2 image (not supported)");
                    return None;
                }
                _ => {}
            }
        }

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8) as u8;

        decode_raw_samples(&data, width, height, color_space, bits)
    }

    /// Resources dictionary for a page, handling inheritance.
    fn page_resources(&self, doc: &Document, page_id: ObjectId) -> Option<lopdf::Dictionary> {
        let page = doc.get_object(page_id).ok()?;
        if let Object::Dictionary(dict) = page {
            if let Ok(resources) = dict.get(b"Resources") {
                if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                    return Some(res_dict.clone());
                }
            }

            // Resources may live on an ancestor page-tree node
            if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
                return self.inherited_resources(doc, *parent_id);
            }
        }
        None
    }

    fn inherited_resources(&self, doc: &Document, node_id: ObjectId) -> Option<lopdf::Dictionary> {
        let node = doc.get_object(node_id).ok()?;
        if let Object::Dictionary(dict) = node {
            if let Ok(resources) = dict.get(b"Resources") {
                if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                    return Some(res_dict.clone());
                }
            }

            if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
                return self.inherited_resources(doc, *parent_id);
            }
        }
        None
    }
}

fn decode_raw_samples(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: u8,
) -> Option<DynamicImage> {
    trace!(
        "Decoding raw samples: {}x{}, colorspace={:?}, bits={}",
        width,
        height,
        String::from_utf8_lossy(color_space),
        bits_per_component
    );

    if bits_per_component != 8 {
        trace!("Unsupported bits per component: {}", bits_per_component);
        return None;
    }

    let expected_rgb = (width * height * 3) as usize;
    let expected_gray = (width * height) as usize;

    if color_space == b"DeviceRGB" || color_space == b"RGB" {
        if data.len() >= expected_rgb {
            let mut rgba_data = Vec::with_capacity((width * height * 4) as usize);
            for chunk in data[..expected_rgb].chunks(3) {
                if chunk.len() == 3 {
                    rgba_data.push(chunk[0]);
                    rgba_data.push(chunk[1]);
                    rgba_data.push(chunk[2]);
                    rgba_data.push(255);
                }
            }
            return ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba_data)
                .map(DynamicImage::ImageRgba8);
        }
    } else if color_space == b"DeviceGray" || color_space == b"G" {
        if data.len() >= expected_gray {
            let mut rgba_data = Vec::with_capacity((width * height * 4) as usize);
            for &gray in data[..expected_gray].iter() {
                rgba_data.push(gray);
                rgba_data.push(gray);
                rgba_data.push(gray);
                rgba_data.push(255);
            }
            return ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba_data)
                .map(DynamicImage::ImageRgba8);
        }
    }

    trace!(
        "Could not decode image: data_len={}, expected_rgb={}, expected_gray={}",
        data.len(),
        expected_rgb,
        expected_gray
    );
    None
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Some suppliers ship PDFs encrypted with an empty password
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf_extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        let text = pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        Ok(text)
    }

    fn render_page(&self, page: u32, _dpi: u32) -> Result<DynamicImage> {
        // lopdf carries no content-stream rasterizer, so "rendering" means
        // returning the page's primary raster. Supplier order confirmations
        // are image-heavy enough for this to hold up in practice.
        let images = self.page_images(page)?;
        if let Some(first) = images.into_iter().next() {
            return Ok(first);
        }

        let all_images = self.embedded_images()?;
        let page_idx = (page - 1) as usize;
        if page_idx < all_images.len() {
            if let Some(img) = all_images.into_iter().nth(page_idx) {
                return Ok(img);
            }
        } else if let Some(first) = all_images.into_iter().next() {
            return Ok(first);
        }

        Err(PdfError::ImageExtraction(
            "No images found in PDF".to_string(),
        ))
    }

    fn embedded_images(&self) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;

        let mut images = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();

        // Pages in order; a stream shared between pages is decoded once
        for (_page_num, page_id) in doc.get_pages() {
            self.collect_page_images(doc, page_id, &mut seen, &mut images);
        }

        // Some writers keep image streams outside any page's resources
        if images.is_empty() {
            for (id, object) in doc.objects.iter() {
                if !seen.insert(*id) {
                    continue;
                }
                if let Some(img) = self.decode_image_object(doc, object) {
                    images.push(img);
                }
            }
        }

        debug!("Found {} embedded images in document", images.len());
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut extractor = PdfExtractor::new();
        assert!(matches!(
            extractor.load(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_decode_raw_rgb_samples() {
        let data = vec![255u8; 2 * 2 * 3];
        let img = decode_raw_samples(&data, 2, 2, b"DeviceRGB", 8).unwrap();
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 2);
    }

    #[test]
    fn test_decode_raw_gray_samples() {
        let data = vec![128u8; 4 * 4];
        let img = decode_raw_samples(&data, 4, 4, b"DeviceGray", 8).unwrap();
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 4);
    }

    #[test]
    fn test_decode_rejects_short_buffers() {
        let data = vec![0u8; 5];
        assert!(decode_raw_samples(&data, 4, 4, b"DeviceRGB", 8).is_none());
        assert!(decode_raw_samples(&data, 4, 4, b"DeviceGray", 1).is_none());
    }
}

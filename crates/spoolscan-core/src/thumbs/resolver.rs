//! Four-strategy thumbnail resolution.

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{DynamicImage, ImageFormat};
use tracing::{debug, info, warn};

use super::fetch::{fetch_image, save_thumbnail};
use super::placeholder;
use super::{ResolveReport, ThumbOutcome, ThumbSource};
use crate::error::ThumbError;
use crate::models::config::SpoolscanConfig;
use crate::models::line::{LineItem, Supplier};
use crate::models::overrides::ImageMap;
use crate::pdf::PdfProcessor;

/// Resolves one catalog image per purchase line.
pub struct ThumbnailResolver<'a> {
    config: &'a SpoolscanConfig,
    image_dir: &'a Path,
}

impl<'a> ThumbnailResolver<'a> {
    pub fn new(config: &'a SpoolscanConfig, image_dir: &'a Path) -> Self {
        Self { config, image_dir }
    }

    /// Path a line's thumbnail is written to.
    pub fn thumb_path(&self, sku: &str) -> PathBuf {
        self.image_dir.join(format!("{}.png", sku))
    }

    /// Resolve thumbnails for every line of one parsed invoice.
    ///
    /// Strategies run in fixed order: embedded photos, Bambu page crop,
    /// mapped sources, placeholder. The first strategy that writes a
    /// file for a line wins and later strategies skip it.
    pub fn resolve<P: PdfProcessor>(
        &self,
        supplier: Supplier,
        lines: &[LineItem],
        pdf: &P,
        source_stem: &str,
        image_map: &ImageMap,
    ) -> ResolveReport {
        let mut outcomes: Vec<ThumbOutcome> = lines
            .iter()
            .map(|line| ThumbOutcome {
                sku: line.sku.clone(),
                source: None,
                note: None,
            })
            .collect();

        if let Err(e) = std::fs::create_dir_all(self.image_dir) {
            warn!(
                "Cannot create image directory {}: {}",
                self.image_dir.display(),
                e
            );
            return ResolveReport { outcomes };
        }

        let embedded_written = self.resolve_embedded(lines, pdf, &mut outcomes);

        // Bambu confirmations sometimes carry no extractable photos at
        // all; a fixed crop of the rendered page stands in for them.
        if embedded_written == 0 && supplier == Supplier::Bambu {
            if let Err(e) = self.resolve_page_crop(lines, pdf, source_stem, &mut outcomes) {
                warn!("Page-crop strategy failed for {}: {}", source_stem, e);
            }
        }

        self.resolve_mapped(lines, image_map, &mut outcomes);
        self.resolve_placeholders(supplier, lines, &mut outcomes);

        let resolved = outcomes.iter().filter(|o| o.source.is_some()).count();
        info!(
            "Resolved {}/{} thumbnails for {}",
            resolved,
            lines.len(),
            source_stem
        );

        ResolveReport { outcomes }
    }

    /// Strategy 1: embedded product photos, the i-th qualifying photo
    /// going to the i-th line.
    fn resolve_embedded<P: PdfProcessor>(
        &self,
        lines: &[LineItem],
        pdf: &P,
        outcomes: &mut [ThumbOutcome],
    ) -> usize {
        let embedded = match pdf.embedded_images() {
            Ok(images) => images,
            Err(e) => {
                warn!("Embedded image enumeration failed: {}", e);
                return 0;
            }
        };
        let qualifying: Vec<DynamicImage> = embedded
            .into_iter()
            .filter(|image| self.qualifies(image))
            .collect();
        debug!("{} embedded images qualify as product photos", qualifying.len());

        let mut written = 0;
        for (i, line) in lines.iter().enumerate() {
            let image = match qualifying.get(i) {
                Some(image) => image,
                None => break,
            };
            match save_thumbnail(image, &self.thumb_path(&line.sku)) {
                Ok(()) => {
                    outcomes[i].source = Some(ThumbSource::Embedded);
                    written += 1;
                }
                Err(e) => {
                    warn!("Embedded thumbnail for {} failed: {}", line.sku, e);
                    outcomes[i].note = Some(e.to_string());
                }
            }
        }
        written
    }

    /// Strategy 2: crop the product photo region out of the rendered
    /// first page. The same crop serves every still-unresolved line.
    fn resolve_page_crop<P: PdfProcessor>(
        &self,
        lines: &[LineItem],
        pdf: &P,
        source_stem: &str,
        outcomes: &mut [ThumbOutcome],
    ) -> Result<(), ThumbError> {
        let page = pdf
            .render_page(1, self.config.pdf.render_dpi)
            .map_err(|e| ThumbError::Render(e.to_string()))?;

        // Round-trip through a temp file so the crop reads exactly the
        // PNG bytes a caller could inspect; removed on drop.
        let temp = tempfile::Builder::new()
            .prefix(&format!("{}.page1-", source_stem))
            .suffix(".png")
            .tempfile()
            .map_err(|e| ThumbError::Render(e.to_string()))?;
        page.to_rgb8()
            .save_with_format(temp.path(), ImageFormat::Png)
            .map_err(|e| ThumbError::Render(e.to_string()))?;
        let page_image = image::open(temp.path()).map_err(|e| ThumbError::Render(e.to_string()))?;

        let crop = self.config.thumbs.crop_box;
        debug!(
            "Cropping {}x{} page render at ({},{}) {}x{}",
            page_image.width(),
            page_image.height(),
            crop.left,
            crop.top,
            crop.width(),
            crop.height()
        );
        let tile = page_image.crop_imm(crop.left, crop.top, crop.width(), crop.height());

        for (i, line) in lines.iter().enumerate() {
            if outcomes[i].source.is_some() {
                continue;
            }
            match save_thumbnail(&tile, &self.thumb_path(&line.sku)) {
                Ok(()) => outcomes[i].source = Some(ThumbSource::PageCrop),
                Err(e) => {
                    warn!("Page-crop thumbnail for {} failed: {}", line.sku, e);
                    outcomes[i].note = Some(e.to_string());
                }
            }
        }
        Ok(())
    }

    /// Strategy 3: caller-mapped local paths or URLs.
    fn resolve_mapped(
        &self,
        lines: &[LineItem],
        image_map: &ImageMap,
        outcomes: &mut [ThumbOutcome],
    ) {
        if image_map.is_empty() {
            return;
        }
        let timeout = Duration::from_secs(self.config.fetch.timeout_secs);
        for (i, line) in lines.iter().enumerate() {
            if outcomes[i].source.is_some() {
                continue;
            }
            let source = match image_map.get(&line.sku) {
                Some(source) => source,
                None => continue,
            };
            let saved = fetch_image(source, timeout)
                .and_then(|image| save_thumbnail(&image, &self.thumb_path(&line.sku)));
            match saved {
                Ok(()) => outcomes[i].source = Some(ThumbSource::Mapped),
                Err(e) => {
                    warn!("Mapped image for {} failed: {}", line.sku, e);
                    outcomes[i].note = Some(e.to_string());
                }
            }
        }
    }

    /// Strategy 4: generated placeholder tiles.
    ///
    /// Marketplace parses are noisy, so their placeholders are redrawn
    /// every run; structured suppliers keep an existing file.
    fn resolve_placeholders(
        &self,
        supplier: Supplier,
        lines: &[LineItem],
        outcomes: &mut [ThumbOutcome],
    ) {
        let thumbs = &self.config.thumbs;
        let font = placeholder::load_font(&thumbs.font_paths);

        for (i, line) in lines.iter().enumerate() {
            if outcomes[i].source.is_some() {
                continue;
            }
            let path = self.thumb_path(&line.sku);
            if !supplier.refreshes_placeholders() && path.exists() {
                debug!("Keeping existing thumbnail for {}", line.sku);
                outcomes[i].source = Some(ThumbSource::Existing);
                continue;
            }
            let tile = placeholder::render_placeholder(line, thumbs.placeholder_size, font.as_ref());
            match tile.save_with_format(&path, ImageFormat::Png) {
                Ok(()) => outcomes[i].source = Some(ThumbSource::Placeholder),
                Err(e) => {
                    warn!("Placeholder for {} failed: {}", line.sku, e);
                    outcomes[i].note = Some(e.to_string());
                }
            }
        }
    }

    fn qualifies(&self, image: &DynamicImage) -> bool {
        let thumbs = &self.config.thumbs;
        let (width, height) = (image.width(), image.height());
        if width < thumbs.min_width || height < thumbs.min_height {
            return false;
        }
        let aspect = width as f32 / height as f32;
        aspect >= thumbs.aspect_min && aspect <= thumbs.aspect_max
    }
}

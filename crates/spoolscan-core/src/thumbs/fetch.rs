//! Mapped image sources: local paths and http(s) URLs.

use std::path::Path;
use std::time::Duration;

use image::{DynamicImage, ImageFormat};
use tracing::debug;

use crate::error::ThumbError;

/// Fetch an image from a mapped source.
///
/// Sources starting with `http://` or `https://` are downloaded,
/// anything else is treated as a local path.
pub fn fetch_image(source: &str, timeout: Duration) -> Result<DynamicImage, ThumbError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        fetch_remote(source, timeout)
    } else {
        image::open(source).map_err(|e| ThumbError::Decode(format!("{}: {}", source, e)))
    }
}

fn fetch_remote(url: &str, timeout: Duration) -> Result<DynamicImage, ThumbError> {
    debug!("Fetching mapped image from {}", url);
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ThumbError::Fetch(e.to_string()))?;
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| ThumbError::Fetch(format!("{}: {}", url, e)))?;
    let bytes = response
        .bytes()
        .map_err(|e| ThumbError::Fetch(format!("{}: {}", url, e)))?;
    image::load_from_memory(&bytes).map_err(|e| ThumbError::Decode(format!("{}: {}", url, e)))
}

/// Write a thumbnail as an 8-bit RGB PNG, flattening any alpha channel.
pub fn save_thumbnail(image: &DynamicImage, path: &Path) -> Result<(), ThumbError> {
    image
        .to_rgb8()
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| ThumbError::Write(format!("{}: {}", path.display(), e)))
}

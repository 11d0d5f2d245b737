//! Configuration structures for the ingestion pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the spoolscan pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoolscanConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Thumbnail resolution configuration.
    pub thumbs: ThumbConfig,

    /// Mapped-image fetching configuration.
    pub fetch: FetchConfig,
}

impl Default for SpoolscanConfig {
    fn default() -> Self {
        Self {
            pdf: PdfConfig::default(),
            ocr: OcrConfig::default(),
            thumbs: ThumbConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { render_dpi: 150 }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Upscale factor applied to rendered pages before recognition.
    pub upscale: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            upscale: 2.0,
        }
    }
}

/// Thumbnail resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbConfig {
    /// Minimum width for an embedded image to qualify as a product photo.
    pub min_width: u32,

    /// Minimum height for an embedded image to qualify as a product photo.
    pub min_height: u32,

    /// Lower bound of the accepted width/height aspect ratio.
    pub aspect_min: f32,

    /// Upper bound of the accepted width/height aspect ratio.
    pub aspect_max: f32,

    /// Region cropped out of a rendered first page, in pixels at render DPI.
    pub crop_box: CropBox,

    /// Edge length of generated square placeholders, in pixels.
    pub placeholder_size: u32,

    /// Candidate font files for placeholder labels, probed in order.
    pub font_paths: Vec<PathBuf>,
}

impl Default for ThumbConfig {
    fn default() -> Self {
        Self {
            min_width: 500,
            min_height: 300,
            aspect_min: 0.7,
            aspect_max: 1.4,
            crop_box: CropBox::default(),
            placeholder_size: 320,
            font_paths: default_font_paths(),
        }
    }
}

/// Pixel rectangle cropped from a rendered page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBox {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

impl Default for CropBox {
    fn default() -> Self {
        // Product photo region of a Bambu Lab order confirmation at 150 DPI.
        Self {
            left: 40,
            top: 260,
            right: 260,
            bottom: 480,
        }
    }
}

/// Mapped-image fetching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Timeout for HTTP fetches, in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

fn default_font_paths() -> Vec<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

impl SpoolscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Get full path to an OCR model file.
    pub fn model_path(&self, file_name: &str) -> PathBuf {
        self.ocr.model_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = SpoolscanConfig::default();
        assert_eq!(config.pdf.render_dpi, 150);
        assert_eq!(config.thumbs.placeholder_size, 320);
        assert_eq!(config.thumbs.crop_box.width(), 220);
        assert_eq!(config.thumbs.crop_box.height(), 220);
        assert_eq!(config.fetch.timeout_secs, 10);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: SpoolscanConfig = serde_json::from_str(r#"{"pdf":{"render_dpi":300}}"#).unwrap();
        assert_eq!(config.pdf.render_dpi, 300);
        assert_eq!(config.thumbs.min_width, 500);
        assert_eq!(config.ocr.detection_model, "det.onnx");
    }

    #[test]
    fn test_config_roundtrip() {
        let config = SpoolscanConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: SpoolscanConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.thumbs.aspect_min, config.thumbs.aspect_min);
        assert_eq!(back.ocr.model_dir, config.ocr.model_dir);
    }
}

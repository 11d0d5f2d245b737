//! Pure Rust OCR engine backed by `pure-onnx-ocr`.
//!
//! Runs PP-OCR detection and recognition models through a pure Rust
//! ONNX runtime, so no system ONNX Runtime install is needed.

use std::path::Path;

use image::DynamicImage;
use tracing::{debug, info};

use super::TextRecognizer;
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Wrapper around a loaded `pure-onnx-ocr` engine.
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
}

impl PureOcrEngine {
    /// Load an engine from the model files named in the configuration.
    pub fn from_dir(model_dir: &Path, config: &OcrConfig) -> Result<Self, OcrError> {
        let det_path = model_dir.join(&config.detection_model);
        let rec_path = model_dir.join(&config.recognition_model);
        let dict_path = model_dir.join(&config.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded OCR models from {}", model_dir.display());

        Ok(Self { engine })
    }
}

impl TextRecognizer for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>, OcrError> {
        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("Detected {} text regions", results.len());

        let mut regions: Vec<(f32, f32, String)> = results
            .iter()
            .map(|r| {
                let (x, y) = region_origin(&r.bounding_box);
                (x, y, r.text.replace("[UNK]", " ").trim().to_string())
            })
            .collect();

        // Reading order: quantize y into 20px bands, then sort by x
        regions.sort_by(|a, b| {
            let row_a = (a.1 / 20.0) as i32;
            let row_b = (b.1 / 20.0) as i32;
            if row_a != row_b {
                row_a.cmp(&row_b)
            } else {
                a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal)
            }
        });

        Ok(regions
            .into_iter()
            .filter(|(_, _, text)| !text.is_empty())
            .map(|(_, _, text)| text)
            .collect())
    }
}

/// Top-left corner of a detected region's polygon.
fn region_origin(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    let mut x = f64::MAX;
    let mut y = f64::MAX;
    for coord in polygon.exterior().coords() {
        if coord.x < x {
            x = coord.x;
        }
        if coord.y < y {
            y = coord.y;
        }
    }
    if x == f64::MAX {
        (0.0, 0.0)
    } else {
        (x as f32, y as f32)
    }
}

//! Deterministic placeholder tiles for lines with no usable photo.

use std::path::PathBuf;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::models::line::LineItem;

/// Colour keywords looked up in the variant text, first match wins.
/// "navy" sits before "blue" so "Navy Blue" keeps its darker shade.
const PALETTE: [(&str, [u8; 3]); 18] = [
    ("black", [35, 35, 40]),
    ("white", [235, 235, 230]),
    ("silver", [176, 180, 186]),
    ("grey", [128, 130, 134]),
    ("gray", [128, 130, 134]),
    ("gold", [212, 175, 55]),
    ("red", [196, 30, 58]),
    ("orange", [255, 117, 24]),
    ("yellow", [250, 204, 21]),
    ("green", [34, 139, 87]),
    ("cyan", [0, 160, 176]),
    ("navy", [28, 48, 98]),
    ("blue", [41, 98, 255]),
    ("purple", [126, 87, 194]),
    ("pink", [244, 143, 177]),
    ("brown", [121, 85, 72]),
    ("natural", [222, 213, 196]),
    ("clear", [203, 219, 228]),
];

const LIGHT_TEXT: Rgb<u8> = Rgb([245, 245, 245]);
const DARK_TEXT: Rgb<u8> = Rgb([24, 24, 26]);

/// Background colour for a line.
///
/// A palette keyword found in the variant wins; otherwise the first
/// three bytes of the SKU's SHA-256 digest are used, so reruns always
/// pick the same colour for the same SKU.
pub fn background_for(sku: &str, variant: &str) -> [u8; 3] {
    let lowered = variant.to_lowercase();
    for (keyword, colour) in PALETTE {
        if lowered.contains(keyword) {
            return colour;
        }
    }
    let digest = Sha256::digest(sku.as_bytes());
    [digest[0], digest[1], digest[2]]
}

/// Perceived luminance of an sRGB colour, 0-255.
fn luminance(colour: [u8; 3]) -> f32 {
    0.299 * colour[0] as f32 + 0.587 * colour[1] as f32 + 0.114 * colour[2] as f32
}

/// Probe candidate font files, returning the first that loads.
pub fn load_font(paths: &[PathBuf]) -> Option<FontVec> {
    for path in paths {
        if let Ok(bytes) = std::fs::read(path) {
            if let Ok(font) = FontVec::try_from_vec(bytes) {
                debug!("Using placeholder font {}", path.display());
                return Some(font);
            }
        }
    }
    debug!("No usable placeholder font found, tiles stay flat colour");
    None
}

/// Render a square placeholder tile for a line.
///
/// Always succeeds: without a font the tile is the flat background
/// colour with no labels.
pub fn render_placeholder(line: &LineItem, size: u32, font: Option<&FontVec>) -> RgbImage {
    let background = background_for(&line.sku, &line.variant);
    let mut canvas = RgbImage::from_pixel(size, size, Rgb(background));

    let font = match font {
        Some(font) => font,
        None => return canvas,
    };
    let colour = if luminance(background) <= 150.0 {
        LIGHT_TEXT
    } else {
        DARK_TEXT
    };

    let labels = [
        (line.manufacturer.as_str(), size as f32 * 0.085, 0.30),
        (line.material.as_str(), size as f32 * 0.075, 0.46),
        (line.sku.as_str(), size as f32 * 0.055, 0.62),
    ];
    for (text, px, y_frac) in labels {
        if text.is_empty() {
            continue;
        }
        let scale = PxScale::from(px);
        let (text_width, _) = text_size(scale, font, text);
        let x = (size.saturating_sub(text_width) / 2) as i32;
        let y = (size as f32 * y_frac) as i32;
        draw_text_mut(&mut canvas, colour, x, y, scale, font, text);
    }

    canvas
}

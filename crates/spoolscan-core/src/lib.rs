//! Core library for filament invoice ingestion.
//!
//! This crate provides:
//! - PDF processing (text extraction, embedded images, page rasters)
//! - Supplier-specific invoice parsers (Bambu Lab, Jaycar, eBay, generic)
//! - OCR fallback for image-only order pages
//! - Thumbnail resolution for parsed purchase lines
//! - Catalog data models and manual overrides

pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod suppliers;
pub mod thumbs;

pub use error::{Result, SpoolscanError};
pub use models::config::SpoolscanConfig;
pub use models::line::{InvoiceRecord, LineItem, Pack, ParseResult, Supplier};
pub use models::overrides::{apply_overrides, ImageMap, LineOverride, OverrideTable};
pub use ocr::{recognize_document, TextRecognizer};
#[cfg(feature = "ocr")]
pub use ocr::PureOcrEngine;
pub use pdf::{PdfExtractor, PdfProcessor};
pub use suppliers::{from_ocr_fragments, normalize_text, parse_invoice, SupplierParser};
pub use thumbs::{ResolveReport, ThumbOutcome, ThumbSource, ThumbnailResolver};

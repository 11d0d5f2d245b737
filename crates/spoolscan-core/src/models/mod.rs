//! Data models for purchases, configuration, and correction tables.

pub mod config;
pub mod line;
pub mod overrides;

pub use config::{CropBox, FetchConfig, OcrConfig, PdfConfig, SpoolscanConfig, ThumbConfig};
pub use line::{InvoiceRecord, LineItem, Pack, ParseResult, Supplier};
pub use overrides::{apply_overrides, ImageMap, LineOverride, OverrideTable};

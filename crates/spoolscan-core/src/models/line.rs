//! Purchase line models shared by the parsers, the resolver, and the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single filament purchase extracted from an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Supplier stock keeping unit, uppercased.
    pub sku: String,

    /// Filament manufacturer, or "Unknown".
    pub manufacturer: String,

    /// Material label ("PLA Basic", "PETG", ...), or "Unknown".
    pub material: String,

    /// Human-readable colour/finish description.
    pub variant: String,

    /// Whether the filament ships on a spool or as a refill.
    pub pack: Pack,

    /// Purchased quantity in kilograms.
    #[serde(rename = "qtyKg")]
    pub qty_kg: u32,
}

impl LineItem {
    /// Number of descriptive fields still carrying the "Unknown" sentinel.
    ///
    /// Used to pick the more complete of two lines sharing a SKU.
    pub fn unknown_fields(&self) -> usize {
        [&self.material, &self.variant]
            .iter()
            .filter(|value| value.as_str() == "Unknown")
            .count()
    }
}

/// Packaging form of a purchased filament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pack {
    /// Filament wound on a reusable spool.
    Spool,
    /// Spool-less refill coil.
    Refill,
    /// Packaging could not be determined.
    Unknown,
}

impl Default for Pack {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for Pack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pack::Spool => write!(f, "Spool"),
            Pack::Refill => write!(f, "Refill"),
            Pack::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Supplier whose invoice layout a parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Supplier {
    Bambu,
    Jaycar,
    Ebay,
    Generic,
}

impl Supplier {
    /// Whether re-ingesting this supplier may overwrite an existing
    /// thumbnail with a fresh placeholder.
    ///
    /// Low-confidence parses produce placeholder-heavy output, so these
    /// suppliers regenerate placeholders on every run instead of keeping
    /// whatever file happens to exist.
    pub fn refreshes_placeholders(&self) -> bool {
        matches!(self, Supplier::Ebay | Supplier::Generic)
    }
}

impl fmt::Display for Supplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Supplier::Bambu => write!(f, "bambu"),
            Supplier::Jaycar => write!(f, "jaycar"),
            Supplier::Ebay => write!(f, "ebay"),
            Supplier::Generic => write!(f, "generic"),
        }
    }
}

/// Outcome of parsing one invoice text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    /// Supplier whose parser produced the lines.
    pub supplier: Supplier,

    /// Extracted purchase lines, deduplicated per supplier policy.
    pub lines: Vec<LineItem>,

    /// Parser self-assessment in [0.0, 1.0].
    pub confidence: f32,
}

/// One ingested invoice as persisted in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    /// File name of the source PDF.
    pub source_file: String,

    /// When the invoice was ingested.
    pub ingested_at: DateTime<Utc>,

    /// Supplier that produced the parse.
    pub supplier: Supplier,

    /// Confidence reported by the parser.
    pub parse_confidence: f32,

    /// Purchase lines after overrides.
    pub lines: Vec<LineItem>,
}

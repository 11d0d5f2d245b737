//! Common regex patterns for supplier line extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Whitespace runs collapsed by the normalizer
    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    // Bambu Lab store SKU, e.g. A00-A0-1.75-10101-SPL
    pub static ref BAMBU_SKU: Regex = Regex::new(
        r"\b([A-Z]\d{2}-[A-Z0-9]{1,2}-1\.75-\d{4}-[A-Za-z0-9]+)\b"
    ).unwrap();

    // Colour name followed by a five-digit colour code in parentheses
    pub static ref BAMBU_VARIANT: Regex = Regex::new(
        r"([A-Za-z][A-Za-z0-9 +\-/]+)\s*\(\d{5}\)"
    ).unwrap();

    // Quantity phrasings: "Qty: 2", "Quantity: 2", "2 x 1kg"
    pub static ref QTY_PATTERN: Regex = Regex::new(
        r"(?i)\bQty[: ]\s*(\d+)\b|\bQuantity[: ]\s*(\d+)\b|(\d+)\s*x\s*1(?:\.0?)?\s*kg\b"
    ).unwrap();

    pub static ref REFILL_WORD: Regex = Regex::new(r"(?i)\brefill\b").unwrap();

    // Jaycar tabular row: code, name, qty, unit price, line total
    pub static ref JAYCAR_ROW: Regex = Regex::new(
        r"(?i)\b([A-Z]{2}\d{3,5})\b\s+(.+?)\s+(\d+)\s+\$[0-9]+(?:\.[0-9]{2})?\s+\$[0-9]+(?:\.[0-9]{2})?"
    ).unwrap();

    // Whole-word filament vocabulary, applied to the uppercased name
    pub static ref FILAMENT_WORD: Regex = Regex::new(
        r"\b(FILAMENT|PLA|PETG|ABS|TPU|NYLON)\b"
    ).unwrap();

    // First word of a product name
    pub static ref LEADING_WORD: Regex = Regex::new(
        r"^\s*([A-Za-z][A-Za-z0-9+\-]*)"
    ).unwrap();

    // Loose marketplace item code, e.g. SNL175 or PETG01-BLK
    pub static ref EBAY_SKU: Regex = Regex::new(
        r"\b([A-Z]{1,4}[0-9]{2,8}(?:-[A-Z0-9]+)?)\b"
    ).unwrap();

    // Free-text listing title fragment near a marketplace code
    pub static ref EBAY_VARIANT: Regex = Regex::new(
        r"([A-Za-z][A-Za-z0-9 +\-/]{6,80})"
    ).unwrap();

    // Structured SKU shape shared by smaller filament stores
    pub static ref GENERIC_SKU: Regex = Regex::new(
        r"\b([A-Z0-9]{2,6}-[A-Z0-9]{1,4}-[0-9]+\.?[0-9]*-[0-9]{3,5}-[A-Za-z0-9]+)\b"
    ).unwrap();

    // Colour name with a 3-8 digit colour code in parentheses
    pub static ref GENERIC_VARIANT: Regex = Regex::new(
        r"([A-Za-z][A-Za-z0-9 +\-/]+)\s*\(\d{3,8}\)"
    ).unwrap();

    // eBay listing item number, quoted near an "Item number" label
    pub static ref ITEM_NUMBER: Regex = Regex::new(
        r"(?i)item\s*(?:number|no\.?|#)?\s*[:\-]?\s*(\d{9,15})\b"
    ).unwrap();

    // OCR fragments: "Matte Black PETG" and "Blue PETG"
    pub static ref MATTE_PETG: Regex = Regex::new(
        r"(?i)\bmatte\s+([a-z]+)\s+petg\b"
    ).unwrap();

    pub static ref COLOR_PETG: Regex = Regex::new(
        r"(?i)\b([a-z]+)\s+petg\b"
    ).unwrap();
}

/// Material keywords recognized in listing context, in priority order.
pub const MATERIAL_KEYWORDS: [&str; 6] = ["PLA", "PETG", "ABS", "ASA", "TPU", "NYLON"];

lazy_static! {
    /// Whole-word matchers for [`MATERIAL_KEYWORDS`], same order.
    pub static ref MATERIAL_WORDS: Vec<(&'static str, Regex)> = MATERIAL_KEYWORDS
        .iter()
        .map(|keyword| {
            let pattern = format!(r"(?i)\b{}\b", keyword);
            (*keyword, Regex::new(&pattern).unwrap())
        })
        .collect();
}

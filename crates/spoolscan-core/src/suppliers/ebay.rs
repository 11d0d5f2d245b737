//! eBay order summary parser.
//!
//! eBay order pages are unstructured, so two paths exist: a noisy regex
//! sweep over whatever text the PDF yields, and a fragment-based path fed
//! by OCR for the order pages that render as pure images.

use std::collections::HashSet;

use super::patterns::{COLOR_PETG, EBAY_SKU, EBAY_VARIANT, ITEM_NUMBER, MATTE_PETG};
use super::{context_window, dedup_by_sku, material_keyword, DedupKeep, SupplierParser};
use crate::models::line::{LineItem, Pack, ParseResult, Supplier};

const CONTEXT_BEFORE: usize = 120;
const CONTEXT_AFTER: usize = 240;

const LINE_CONFIDENCE: f32 = 0.65;
const FLOOR_CONFIDENCE: f32 = 0.3;

/// Confidence for lines assembled from OCR fragments. Sits between the
/// noisy regex path and the structured parsers.
pub const OCR_CONFIDENCE: f32 = 0.7;

/// Codes that look like SKUs but never are.
const RESERVED_WORDS: [&str; 2] = ["EBAY", "ORDER"];

/// Colour captures that are actually product vocabulary.
const NOISE_TOKENS: [&str; 4] = ["sunlu", "printer", "filament", "pla"];

/// Parser for eBay order summaries.
pub struct EbayParser;

impl SupplierParser for EbayParser {
    fn supplier(&self) -> Supplier {
        Supplier::Ebay
    }

    fn detect(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        lowered.contains("ebay") || lowered.contains("order details")
    }

    fn parse(&self, text: &str) -> ParseResult {
        let mut lines = Vec::new();

        for caps in EBAY_SKU.captures_iter(text) {
            let matched = caps.get(0).unwrap();
            let sku = caps[1].to_uppercase();
            if RESERVED_WORDS.contains(&sku.as_str()) {
                continue;
            }
            let context = context_window(
                text,
                matched.start(),
                matched.end(),
                CONTEXT_BEFORE,
                CONTEXT_AFTER,
            );

            // A code with no material nearby is a false positive
            let material = match material_keyword(context) {
                Some(material) => material.to_string(),
                None => continue,
            };
            let variant = EBAY_VARIANT
                .captures(context)
                .map(|c| c[1].trim().to_string())
                .unwrap_or_else(|| format!("eBay Item {}", sku));

            lines.push(LineItem {
                sku,
                manufacturer: "SUNLU".to_string(),
                material,
                variant,
                pack: Pack::Unknown,
                qty_kg: 1,
            });
        }

        let lines = dedup_by_sku(lines, DedupKeep::LastSeen);
        let confidence = if lines.is_empty() {
            FLOOR_CONFIDENCE
        } else {
            LINE_CONFIDENCE
        };

        ParseResult {
            supplier: Supplier::Ebay,
            lines,
            confidence,
        }
    }
}

/// Assemble purchase lines from OCR text fragments.
///
/// Fragments naming a colour plus PETG become one line each, in fragment
/// order. The listing's item number (when one was read) seeds the
/// synthetic SKUs; boilerplate about returns is ignored.
pub fn lines_from_ocr(fragments: &[String]) -> Vec<LineItem> {
    let joined = fragments.join("\n");
    let item_number = ITEM_NUMBER.captures(&joined).map(|c| c[1].to_string());

    let mut variants: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for fragment in fragments {
        let lowered = fragment.to_lowercase();
        if !lowered.contains("petg") {
            continue;
        }
        if lowered.contains("return") || lowered.contains("accepted") {
            continue;
        }

        let variant = if let Some(caps) = MATTE_PETG.captures(fragment) {
            let colour = &caps[1];
            if is_noise_colour(colour) {
                continue;
            }
            format!("Matte {} · PETG (Matte)", title_case(colour))
        } else if let Some(caps) = COLOR_PETG.captures(fragment) {
            let colour = &caps[1];
            if is_noise_colour(colour) {
                continue;
            }
            format!("{} · PETG", title_case(colour))
        } else {
            continue;
        };

        if seen.insert(variant.clone()) {
            variants.push(variant);
        }
    }

    variants
        .into_iter()
        .enumerate()
        .map(|(i, variant)| {
            let sku = match &item_number {
                Some(number) => format!("{}-{:02}", number, i + 1),
                None => format!("EBAY-{:02}", i + 1),
            };
            LineItem {
                sku,
                manufacturer: "SUNLU".to_string(),
                material: "PETG".to_string(),
                variant,
                pack: Pack::Unknown,
                qty_kg: 1,
            }
        })
        .collect()
}

/// Wrap OCR-derived lines in a parse result, or None when nothing usable
/// came out of recognition.
pub fn from_ocr_fragments(fragments: &[String]) -> Option<ParseResult> {
    let lines = lines_from_ocr(fragments);
    if lines.is_empty() {
        return None;
    }
    Some(ParseResult {
        supplier: Supplier::Ebay,
        lines,
        confidence: OCR_CONFIDENCE,
    })
}

fn is_noise_colour(colour: &str) -> bool {
    let lowered = colour.to_lowercase();
    NOISE_TOKENS.iter().any(|token| lowered.contains(token))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detect_marketplace_markers() {
        assert!(EbayParser.detect("Thanks for shopping on eBay"));
        assert!(EbayParser.detect("Order Details printed 2024-06-01"));
        assert!(!EbayParser.detect("Bambu Lab invoice"));
    }

    #[test]
    fn test_regex_path_needs_material_nearby() {
        let text = "Order details SNL175 SUNLU PETG Filament 1kg Black";
        let result = EbayParser.parse(text);

        assert_eq!(result.confidence, 0.65);
        assert_eq!(result.lines.len(), 1);
        let item = &result.lines[0];
        assert_eq!(item.sku, "SNL175");
        assert_eq!(item.manufacturer, "SUNLU");
        assert_eq!(item.material, "PETG");
        assert_eq!(item.pack, Pack::Unknown);
        assert_eq!(item.qty_kg, 1);
    }

    #[test]
    fn test_codes_without_material_are_dropped() {
        let result = EbayParser.parse("Order details ABC123 mystery gadget, no polymers here");
        assert!(result.lines.is_empty());
        assert_eq!(result.confidence, 0.3);
    }

    #[test]
    fn test_duplicate_sku_keeps_last_context() {
        let filler = "seller message ".repeat(30);
        let text = format!(
            "Order details PETG roll SNL175 first mention {} SNL175 PLA restock notice",
            filler
        );
        let result = EbayParser.parse(&text);

        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.lines[0].sku, "SNL175");
        assert_eq!(result.lines[0].material, "PLA");
    }

    #[test]
    fn test_ocr_fragments_become_lines() {
        let fragments: Vec<String> = [
            "SUNLU PETG Filament 1.75mm",
            "Item number: 256123456789",
            "Matte Black PETG",
            "Blue PETG",
            "Free returns accepted for PETG orders",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let lines = lines_from_ocr(&fragments);
        assert_eq!(lines.len(), 2);

        assert_eq!(lines[0].sku, "256123456789-01");
        assert_eq!(lines[0].variant, "Matte Black · PETG (Matte)");
        assert_eq!(lines[0].material, "PETG");
        assert_eq!(lines[0].manufacturer, "SUNLU");

        assert_eq!(lines[1].sku, "256123456789-02");
        assert_eq!(lines[1].variant, "Blue · PETG");
    }

    #[test]
    fn test_ocr_duplicate_variants_collapse() {
        let fragments: Vec<String> = ["Matte Black PETG", "matte black petg"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let lines = lines_from_ocr(&fragments);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].variant, "Matte Black · PETG (Matte)");
    }

    #[test]
    fn test_ocr_without_item_number_uses_prefix() {
        let fragments = vec!["Matte Red PETG".to_string()];
        let lines = lines_from_ocr(&fragments);
        assert_eq!(lines[0].sku, "EBAY-01");
    }

    #[test]
    fn test_ocr_noise_colours_are_rejected() {
        let fragments: Vec<String> = ["SUNLU PETG 175mm", "3D printer PETG bundle"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert!(lines_from_ocr(&fragments).is_empty());
        assert!(from_ocr_fragments(&fragments).is_none());
    }

    #[test]
    fn test_ocr_result_confidence() {
        let fragments = vec!["Blue PETG".to_string()];
        let result = from_ocr_fragments(&fragments).unwrap();
        assert_eq!(result.supplier, Supplier::Ebay);
        assert_eq!(result.confidence, 0.7);
        assert_eq!(result.lines.len(), 1);
    }
}

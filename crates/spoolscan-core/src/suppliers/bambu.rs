//! Bambu Lab order confirmation parser.
//!
//! Bambu invoices carry structured store SKUs, so this parser has the
//! highest confidence ceiling in the chain.

use lazy_static::lazy_static;
use regex::Regex;

use super::patterns::{BAMBU_SKU, BAMBU_VARIANT, REFILL_WORD};
use super::{context_window, dedup_by_sku, quantity_kg, DedupKeep, SupplierParser};
use crate::models::line::{LineItem, Pack, ParseResult, Supplier};

const CONTEXT_BEFORE: usize = 120;
const CONTEXT_AFTER: usize = 220;

const LINE_CONFIDENCE: f32 = 0.95;
const FLOOR_CONFIDENCE: f32 = 0.2;

const FINGERPRINTS: [&str; 4] = [
    "bambu lab",
    "tuozhu technology",
    "au.store.bambulab.com",
    "invoice number: bblau",
];

lazy_static! {
    // Ordered: specific finishes before the bare PLA fallback
    static ref MATERIAL_RULES: [(&'static str, Regex); 5] = [
        ("PLA Silk+", Regex::new(r"(?i)PLA Silk\+?").unwrap()),
        ("PLA Matte", Regex::new(r"(?i)PLA Matte").unwrap()),
        ("PLA Translucent", Regex::new(r"(?i)PLA Translucent").unwrap()),
        ("PLA Basic", Regex::new(r"(?i)\bPLA\b").unwrap()),
        ("ABS", Regex::new(r"(?i)\bABS\b").unwrap()),
    ];
}

/// Parser for Bambu Lab store invoices.
pub struct BambuParser;

impl SupplierParser for BambuParser {
    fn supplier(&self) -> Supplier {
        Supplier::Bambu
    }

    fn detect(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        FINGERPRINTS.iter().any(|mark| lowered.contains(mark))
    }

    fn parse(&self, text: &str) -> ParseResult {
        let mut lines = Vec::new();

        for caps in BAMBU_SKU.captures_iter(text) {
            let matched = caps.get(0).unwrap();
            let sku = caps[1].to_uppercase();
            let context = context_window(
                text,
                matched.start(),
                matched.end(),
                CONTEXT_BEFORE,
                CONTEXT_AFTER,
            );

            let material = material_label(context);
            let variant = BAMBU_VARIANT
                .find(context)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            let qty_kg = quantity_kg(context);
            let pack = pack_for(&sku, context);

            lines.push(LineItem {
                sku,
                manufacturer: "Bambu Lab".to_string(),
                material,
                variant,
                pack,
                qty_kg,
            });
        }

        let lines = dedup_by_sku(lines, DedupKeep::MostComplete);
        let confidence = if lines.is_empty() {
            FLOOR_CONFIDENCE
        } else {
            LINE_CONFIDENCE
        };

        ParseResult {
            supplier: Supplier::Bambu,
            lines,
            confidence,
        }
    }
}

fn material_label(context: &str) -> String {
    MATERIAL_RULES
        .iter()
        .find(|(_, regex)| regex.is_match(context))
        .map(|(label, _)| (*label).to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn pack_for(sku: &str, context: &str) -> Pack {
    if sku.ends_with("-SPLFREE") {
        Pack::Refill
    } else if sku.ends_with("-SPL") {
        Pack::Spool
    } else if REFILL_WORD.is_match(context) {
        Pack::Refill
    } else {
        Pack::Spool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detect_fingerprints() {
        assert!(BambuParser.detect("Welcome to BAMBU LAB"));
        assert!(BambuParser.detect("Shenzhen Tuozhu Technology Co Ltd"));
        assert!(BambuParser.detect("visit au.store.bambulab.com for details"));
        assert!(BambuParser.detect("Invoice Number: BBLAU2024-0042"));
        assert!(!BambuParser.detect("Jaycar Pty Ltd tax invoice"));
    }

    #[test]
    fn test_parse_single_spool() {
        let text = "Bambu Lab Invoice Number: BBLAU2024-0042, PLA Basic, \
                    Jade White (10101), A00-A0-1.75-1010-SPL, Qty: 1, $24.99";
        let result = BambuParser.parse(text);

        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.lines.len(), 1);
        let item = &result.lines[0];
        assert_eq!(item.sku, "A00-A0-1.75-1010-SPL");
        assert_eq!(item.manufacturer, "Bambu Lab");
        assert_eq!(item.material, "PLA Basic");
        assert_eq!(item.variant, "Jade White (10101)");
        assert_eq!(item.pack, Pack::Spool);
        assert_eq!(item.qty_kg, 1);
    }

    #[test]
    fn test_refill_suffix_wins_over_context() {
        let text = "PLA Matte Charcoal (20101) A01-B2-1.75-2010-SPLFREE Qty: 2";
        let result = BambuParser.parse(text);

        let item = &result.lines[0];
        assert_eq!(item.sku, "A01-B2-1.75-2010-SPLFREE");
        assert_eq!(item.material, "PLA Matte");
        assert_eq!(item.pack, Pack::Refill);
        assert_eq!(item.qty_kg, 2);
    }

    #[test]
    fn test_refill_keyword_in_context() {
        let text = "PLA Basic refill pack Ivory White (10100) A00-A0-1.75-1010-R1 Qty: 1";
        let result = BambuParser.parse(text);
        assert_eq!(result.lines[0].pack, Pack::Refill);
    }

    #[test]
    fn test_material_falls_back_to_unknown() {
        let text = "mystery spool A00-Z9-1.75-9999-X1 Qty: 1";
        let result = BambuParser.parse(text);
        assert_eq!(result.lines[0].material, "Unknown");
        assert_eq!(result.lines[0].variant, "Unknown");
    }

    #[test]
    fn test_silk_material_priority() {
        let text = "PLA Silk+ Gold (13404) A05-C4-1.75-1340-SPL Qty: 1";
        let result = BambuParser.parse(text);
        assert_eq!(result.lines[0].material, "PLA Silk+");
    }

    #[test]
    fn test_duplicate_sku_keeps_complete_line() {
        // Same SKU shows up again in the shipping section, far from any
        // material or colour text.
        let filler = "order handling notes. ".repeat(20);
        let text = format!(
            "Bambu Lab order: PLA Basic, Jade White (10101), A00-A0-1.75-1010-SPL, Qty: 1, {} \
             A00-A0-1.75-1010-SPL shipment reference",
            filler
        );
        let result = BambuParser.parse(&text);

        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.lines[0].material, "PLA Basic");
        assert_eq!(result.lines[0].variant, "Jade White (10101)");
    }

    #[test]
    fn test_no_lines_floor_confidence() {
        let result = BambuParser.parse("Bambu Lab newsletter with no order lines");
        assert!(result.lines.is_empty());
        assert_eq!(result.confidence, 0.2);
    }
}

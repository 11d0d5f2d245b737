//! Jaycar retail invoice parser.
//!
//! Jaycar tax invoices are tabular: one row per product with code, name,
//! quantity and two dollar amounts. Rows survive text extraction well,
//! so this parser reads whole rows instead of context windows.

use super::patterns::{FILAMENT_WORD, JAYCAR_ROW, WHITESPACE};
use super::SupplierParser;
use crate::models::line::{LineItem, Pack, ParseResult, Supplier};

const LINE_CONFIDENCE: f32 = 0.9;
const FLOOR_CONFIDENCE: f32 = 0.2;

const FINGERPRINTS: [&str; 3] = [
    "jaycar pty ltd",
    "help.jaycar.com.au",
    "tax invoice number",
];

/// Parser for Jaycar tax invoices.
pub struct JaycarParser;

impl SupplierParser for JaycarParser {
    fn supplier(&self) -> Supplier {
        Supplier::Jaycar
    }

    fn detect(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        FINGERPRINTS.iter().any(|mark| lowered.contains(mark))
    }

    fn parse(&self, text: &str) -> ParseResult {
        let mut lines = Vec::new();

        for caps in JAYCAR_ROW.captures_iter(text) {
            let sku = caps[1].to_uppercase();
            let name = WHITESPACE.replace_all(caps[2].trim(), " ").into_owned();
            let qty_kg: u32 = caps[3].parse().unwrap_or(1);

            // Jaycar sells far more than filament
            let name_upper = name.to_uppercase();
            if !FILAMENT_WORD.is_match(&name_upper) {
                continue;
            }

            let material = material_from_name(&name_upper);
            let manufacturer = name
                .split_whitespace()
                .next()
                .unwrap_or("Unknown")
                .to_string();
            let pack = if name_upper.contains("SPOOL-LESS") || name_upper.contains("SPOOLLESS") {
                Pack::Refill
            } else {
                Pack::Spool
            };

            lines.push(LineItem {
                sku,
                manufacturer,
                material,
                variant: name,
                pack,
                qty_kg,
            });
        }

        // Row codes are unique per invoice, no dedup pass needed
        let confidence = if lines.is_empty() {
            FLOOR_CONFIDENCE
        } else {
            LINE_CONFIDENCE
        };

        ParseResult {
            supplier: Supplier::Jaycar,
            lines,
            confidence,
        }
    }
}

fn material_from_name(name_upper: &str) -> String {
    if name_upper.contains("SILK PLA") || name_upper.contains("PLA+") {
        "PLA Silk+"
    } else if name_upper.contains("PLA PLUS") {
        "PLA+"
    } else if name_upper.contains("PLA") {
        "PLA"
    } else if name_upper.contains("PETG") {
        "PETG"
    } else if name_upper.contains("ABS") {
        "ABS"
    } else if name_upper.contains("TPU") {
        "TPU"
    } else if name_upper.contains("NYLON") {
        "Nylon"
    } else {
        "Unknown"
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detect_fingerprints() {
        assert!(JaycarParser.detect("JAYCAR PTY LTD ABN 65 000 000 000"));
        assert!(JaycarParser.detect("questions? see help.jaycar.com.au"));
        assert!(JaycarParser.detect("Tax Invoice Number 00012345"));
        assert!(!JaycarParser.detect("Bambu Lab order confirmation"));
    }

    #[test]
    fn test_non_filament_rows_are_skipped() {
        let text = "Jaycar Pty Ltd TL4100 Flashforge PLA Filament Black 1 $35.00 $35.00 \
                    WH3032 Cable Tie Pack 2 $5.95 $11.90";
        let result = JaycarParser.parse(text);

        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.lines.len(), 1);
        let item = &result.lines[0];
        assert_eq!(item.sku, "TL4100");
        assert_eq!(item.manufacturer, "Flashforge");
        assert_eq!(item.material, "PLA");
        assert_eq!(item.variant, "Flashforge PLA Filament Black");
        assert_eq!(item.pack, Pack::Spool);
        assert_eq!(item.qty_kg, 1);
    }

    #[test]
    fn test_spool_less_names_are_refills() {
        let text = "Tax Invoice Number 7 SN1754 SUNLU PETG Spool-less Refill 1 $29.00 $29.00";
        let result = JaycarParser.parse(text);

        let item = &result.lines[0];
        assert_eq!(item.material, "PETG");
        assert_eq!(item.pack, Pack::Refill);
    }

    #[test]
    fn test_plus_sign_maps_to_silk_line() {
        let text = "XC9100 Generic PLA+ Filament 1 $19.00 $19.00";
        let result = JaycarParser.parse(text);
        assert_eq!(result.lines[0].material, "PLA Silk+");
    }

    #[test]
    fn test_spelled_out_plus_keeps_plus_label() {
        let text = "XC9101 Generic PLA Plus Filament 1 $19.00 $19.00";
        let result = JaycarParser.parse(text);
        assert_eq!(result.lines[0].material, "PLA+");
    }

    #[test]
    fn test_nylon_label_casing() {
        let text = "YM5000 Taulman Nylon Filament 1 $45.00 $45.00";
        let result = JaycarParser.parse(text);
        assert_eq!(result.lines[0].material, "Nylon");
    }

    #[test]
    fn test_no_rows_floor_confidence() {
        let result = JaycarParser.parse("Jaycar Pty Ltd store catalogue, no purchases");
        assert!(result.lines.is_empty());
        assert_eq!(result.confidence, 0.2);
    }
}

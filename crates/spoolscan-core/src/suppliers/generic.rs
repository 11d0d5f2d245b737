//! Fallback parser for invoices no dedicated parser claims.
//!
//! Looks for the structured SKU shape smaller filament stores share and
//! reads whatever context it can. Confidence stays low either way.

use super::patterns::{GENERIC_SKU, GENERIC_VARIANT, LEADING_WORD, REFILL_WORD};
use super::{
    context_window, dedup_by_sku, material_keyword, quantity_kg, DedupKeep, SupplierParser,
};
use crate::models::line::{LineItem, Pack, ParseResult, Supplier};

const CONTEXT_BEFORE: usize = 120;
const CONTEXT_AFTER: usize = 220;

const LINE_CONFIDENCE: f32 = 0.6;
const FLOOR_CONFIDENCE: f32 = 0.1;

/// Last-resort parser; claims every invoice.
pub struct GenericParser;

impl SupplierParser for GenericParser {
    fn supplier(&self) -> Supplier {
        Supplier::Generic
    }

    fn detect(&self, _text: &str) -> bool {
        true
    }

    fn parse(&self, text: &str) -> ParseResult {
        let mut lines = Vec::new();

        for caps in GENERIC_SKU.captures_iter(text) {
            let matched = caps.get(0).unwrap();
            let sku = caps[1].to_uppercase();
            let context = context_window(
                text,
                matched.start(),
                matched.end(),
                CONTEXT_BEFORE,
                CONTEXT_AFTER,
            );

            let (variant, manufacturer) = match GENERIC_VARIANT.find(context) {
                Some(m) => {
                    let variant = m.as_str().trim().to_string();
                    let manufacturer = LEADING_WORD
                        .captures(&variant)
                        .map(|c| c[1].to_string())
                        .unwrap_or_else(|| "Unknown".to_string());
                    (variant, manufacturer)
                }
                None => ("Unknown".to_string(), "Unknown".to_string()),
            };
            let material = material_keyword(context)
                .map(str::to_string)
                .unwrap_or_else(|| "Unknown".to_string());
            let qty_kg = quantity_kg(context);
            let pack = if REFILL_WORD.is_match(context) || sku.ends_with("-SPLFREE") {
                Pack::Refill
            } else {
                Pack::Spool
            };

            lines.push(LineItem {
                sku,
                manufacturer,
                material,
                variant,
                pack,
                qty_kg,
            });
        }

        let lines = dedup_by_sku(lines, DedupKeep::LastSeen);
        let confidence = if lines.is_empty() {
            FLOOR_CONFIDENCE
        } else {
            LINE_CONFIDENCE
        };

        ParseResult {
            supplier: Supplier::Generic,
            lines,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detect_claims_everything() {
        assert!(GenericParser.detect(""));
        assert!(GenericParser.detect("completely unrelated text"));
    }

    #[test]
    fn test_empty_text_yields_floor() {
        let result = GenericParser.parse("");
        assert!(result.lines.is_empty());
        assert_eq!(result.confidence, 0.1);
    }

    #[test]
    fn test_structured_sku_with_context() {
        let text = "Acme Filament Co: PETG, Galaxy Purple (4021), PTG2-PU-1.75-4021-SPL, Qty: 2";
        let result = GenericParser.parse(text);

        assert_eq!(result.confidence, 0.6);
        assert_eq!(result.lines.len(), 1);
        let item = &result.lines[0];
        assert_eq!(item.sku, "PTG2-PU-1.75-4021-SPL");
        assert_eq!(item.variant, "Galaxy Purple (4021)");
        assert_eq!(item.manufacturer, "Galaxy");
        assert_eq!(item.material, "PETG");
        assert_eq!(item.pack, Pack::Spool);
        assert_eq!(item.qty_kg, 2);
    }

    #[test]
    fn test_refill_suffix() {
        let text = "restock: QX10-RD-1.75-2002-SPLFREE ordered again";
        let result = GenericParser.parse(text);
        assert_eq!(result.lines[0].pack, Pack::Refill);
    }

    #[test]
    fn test_bare_sku_defaults() {
        let text = "bare code ZZ99-AA-2.85-1000-X9 no colour info";
        let result = GenericParser.parse(text);

        let item = &result.lines[0];
        assert_eq!(item.variant, "Unknown");
        assert_eq!(item.manufacturer, "Unknown");
        assert_eq!(item.material, "Unknown");
        assert_eq!(item.qty_kg, 1);
    }
}

//! Supplier-specific invoice parsers and the dispatch chain.

pub mod patterns;

mod bambu;
mod ebay;
mod generic;
mod jaycar;

pub use bambu::BambuParser;
pub use ebay::{from_ocr_fragments, lines_from_ocr, EbayParser};
pub use generic::GenericParser;
pub use jaycar::JaycarParser;

use crate::models::line::{LineItem, ParseResult, Supplier};
use patterns::{MATERIAL_WORDS, QTY_PATTERN, WHITESPACE};
use std::collections::HashMap;
use tracing::debug;

/// A parser that understands one supplier's invoice layout.
pub trait SupplierParser {
    /// Supplier this parser covers.
    fn supplier(&self) -> Supplier;

    /// Cheap fingerprint check against normalized text.
    fn detect(&self, text: &str) -> bool;

    /// Parse normalized text into purchase lines.
    ///
    /// Parsers never fail: an unreadable invoice yields no lines and the
    /// parser's floor confidence.
    fn parse(&self, text: &str) -> ParseResult;
}

/// Parsers in priority order. The generic parser claims everything and
/// must stay last.
static PARSER_CHAIN: [&(dyn SupplierParser + Sync); 4] =
    [&BambuParser, &JaycarParser, &EbayParser, &GenericParser];

/// Collapse all whitespace runs (newlines included) into single spaces.
///
/// Every parser regex downstream assumes this flattened form.
pub fn normalize_text(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").into_owned()
}

/// Normalize invoice text and run the first parser whose detector claims it.
pub fn parse_invoice(text: &str) -> ParseResult {
    let normalized = normalize_text(text);
    for parser in PARSER_CHAIN {
        if parser.detect(&normalized) {
            debug!("Dispatching to {} parser", parser.supplier());
            return parser.parse(&normalized);
        }
    }
    // Not reachable while the generic parser stays in the chain
    GenericParser.parse(&normalized)
}

/// Slice a window around a match's byte range, spanning up to `before`
/// chars ahead of it and `after` chars past it. Widths count chars, not
/// bytes.
pub(crate) fn context_window(
    text: &str,
    start: usize,
    end: usize,
    before: usize,
    after: usize,
) -> &str {
    let lo = text[..start]
        .char_indices()
        .rev()
        .take(before)
        .last()
        .map_or(start, |(i, _)| i);
    let hi = text[end..]
        .char_indices()
        .nth(after)
        .map_or(text.len(), |(i, _)| end + i);
    &text[lo..hi]
}

/// First material keyword present in the context, in priority order.
pub(crate) fn material_keyword(context: &str) -> Option<&'static str> {
    MATERIAL_WORDS
        .iter()
        .find(|(_, regex)| regex.is_match(context))
        .map(|(keyword, _)| *keyword)
}

/// Purchased kilograms from quantity phrasings near a SKU, default 1.
pub(crate) fn quantity_kg(context: &str) -> u32 {
    QTY_PATTERN
        .captures(context)
        .and_then(|caps| {
            caps.iter()
                .skip(1)
                .flatten()
                .next()
                .and_then(|m| m.as_str().parse().ok())
        })
        .unwrap_or(1)
}

/// Which line wins when two share a SKU.
pub(crate) enum DedupKeep {
    /// Keep the line with fewer "Unknown" fields; ties keep the first.
    MostComplete,
    /// Keep the line seen last.
    LastSeen,
}

/// Collapse lines sharing a SKU. The surviving line sits at the position
/// where its SKU was first seen.
pub(crate) fn dedup_by_sku(lines: Vec<LineItem>, keep: DedupKeep) -> Vec<LineItem> {
    let mut deduped: Vec<LineItem> = Vec::with_capacity(lines.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    for line in lines {
        match index.get(&line.sku) {
            None => {
                index.insert(line.sku.clone(), deduped.len());
                deduped.push(line);
            }
            Some(&at) => {
                let replace = match keep {
                    DedupKeep::MostComplete => line.unknown_fields() < deduped[at].unknown_fields(),
                    DedupKeep::LastSeen => true,
                };
                if replace {
                    deduped[at] = line;
                }
            }
        }
    }
    deduped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::line::Pack;
    use pretty_assertions::assert_eq;

    fn line(sku: &str, material: &str, variant: &str) -> LineItem {
        LineItem {
            sku: sku.to_string(),
            manufacturer: "Unknown".to_string(),
            material: material.to_string(),
            variant: variant.to_string(),
            pack: Pack::Spool,
            qty_kg: 1,
        }
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(
            normalize_text("PLA  Basic\nJade\tWhite\r\n(10101)"),
            "PLA Basic Jade White (10101)"
        );
    }

    #[test]
    fn test_context_window_counts_chars_not_bytes() {
        let text = "żółć żółć żółć MARKER żółć żółć";
        let start = text.find("MARKER").unwrap();
        let ctx = context_window(text, start, start + 6, 3, 3);
        assert_eq!(ctx, "łć MARKER żó");
    }

    #[test]
    fn test_context_window_clamps_to_text_ends() {
        let ctx = context_window("short", 0, 5, 120, 220);
        assert_eq!(ctx, "short");
    }

    #[test]
    fn test_material_keyword_priority_order() {
        // Both present: PLA is checked before PETG
        assert_eq!(material_keyword("pla and petg sampler"), Some("PLA"));
        assert_eq!(material_keyword("petg only here"), Some("PETG"));
        assert_eq!(material_keyword("resin bundle"), None);
    }

    #[test]
    fn test_quantity_default_is_one() {
        assert_eq!(quantity_kg("no quantity mentioned"), 1);
        assert_eq!(quantity_kg("Qty: 5 spools"), 5);
        assert_eq!(quantity_kg("ordered 3 x 1kg of filament"), 3);
    }

    #[test]
    fn test_dedup_most_complete_keeps_first_position() {
        let lines = vec![
            line("A", "Unknown", "Unknown"),
            line("B", "PLA", "Black (1000)"),
            line("A", "PLA Basic", "Jade White (10101)"),
        ];
        let deduped = dedup_by_sku(lines, DedupKeep::MostComplete);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].sku, "A");
        assert_eq!(deduped[0].material, "PLA Basic");
        assert_eq!(deduped[1].sku, "B");
    }

    #[test]
    fn test_dedup_most_complete_tie_keeps_first() {
        let lines = vec![
            line("A", "PLA", "Black (1000)"),
            line("A", "PETG", "Blue (2000)"),
        ];
        let deduped = dedup_by_sku(lines, DedupKeep::MostComplete);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].material, "PLA");
    }

    #[test]
    fn test_dedup_last_seen_replaces_in_place() {
        let lines = vec![
            line("A", "PLA", "first"),
            line("B", "PETG", "middle"),
            line("A", "ABS", "last"),
        ];
        let deduped = dedup_by_sku(lines, DedupKeep::LastSeen);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].sku, "A");
        assert_eq!(deduped[0].material, "ABS");
        assert_eq!(deduped[1].sku, "B");
    }

    #[test]
    fn test_chain_priority_prefers_bambu() {
        let text = "Bambu Lab order, fulfilled via Jaycar Pty Ltd, paid on ebay";
        let result = parse_invoice(text);
        assert_eq!(result.supplier, Supplier::Bambu);
    }

    #[test]
    fn test_empty_text_falls_through_to_generic() {
        let result = parse_invoice("");
        assert_eq!(result.supplier, Supplier::Generic);
        assert!(result.lines.is_empty());
        assert_eq!(result.confidence, 0.1);
    }

    #[test]
    fn test_jaycar_invoice_end_to_end() {
        let text =
            "Jaycar Pty Ltd\nTax Invoice Number 00012345\nTX1234  3mm Black PLA Filament  2  $20.00  $40.00\n";
        let result = parse_invoice(text);
        assert_eq!(result.supplier, Supplier::Jaycar);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.lines.len(), 1);

        let item = &result.lines[0];
        assert_eq!(item.sku, "TX1234");
        assert_eq!(item.manufacturer, "3mm");
        assert_eq!(item.material, "PLA");
        assert_eq!(item.variant, "3mm Black PLA Filament");
        assert_eq!(item.pack, Pack::Spool);
        assert_eq!(item.qty_kg, 2);
    }
}

//! Thumbnail resolution for purchase lines.
//!
//! Every parsed line should end up with a catalog image. Four
//! strategies run in fixed order and the first one that writes a file
//! for a SKU wins: embedded product photos, a fixed crop of the
//! rendered first page, caller-mapped sources, and finally a generated
//! placeholder tile.

mod fetch;
mod placeholder;
mod resolver;

pub use fetch::{fetch_image, save_thumbnail};
pub use placeholder::{background_for, load_font, render_placeholder};
pub use resolver::ThumbnailResolver;

use std::fmt;

/// Where a line's thumbnail came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbSource {
    /// Embedded product photo lifted straight out of the PDF.
    Embedded,
    /// Fixed crop of the rendered first page.
    PageCrop,
    /// Caller-provided mapped path or URL.
    Mapped,
    /// Generated placeholder tile.
    Placeholder,
    /// Pre-existing file kept from an earlier run.
    Existing,
}

impl fmt::Display for ThumbSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ThumbSource::Embedded => "embedded",
            ThumbSource::PageCrop => "page-crop",
            ThumbSource::Mapped => "mapped",
            ThumbSource::Placeholder => "placeholder",
            ThumbSource::Existing => "existing",
        };
        write!(f, "{}", s)
    }
}

/// Resolution outcome for one purchase line.
#[derive(Debug, Clone)]
pub struct ThumbOutcome {
    pub sku: String,
    pub source: Option<ThumbSource>,
    pub note: Option<String>,
}

/// Per-invoice resolution report.
#[derive(Debug, Clone, Default)]
pub struct ResolveReport {
    pub outcomes: Vec<ThumbOutcome>,
}

impl ResolveReport {
    /// Number of lines resolved by the given strategy.
    pub fn count(&self, source: ThumbSource) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.source == Some(source))
            .count()
    }

    /// Number of lines that no strategy could resolve.
    pub fn unresolved(&self) -> usize {
        self.outcomes.iter().filter(|o| o.source.is_none()).count()
    }
}

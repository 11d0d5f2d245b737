//! Ingest command - process a directory of invoice PDFs into the catalog.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use spoolscan_core::models::config::SpoolscanConfig;
use spoolscan_core::models::line::{InvoiceRecord, ParseResult};
use spoolscan_core::models::overrides::{apply_overrides, ImageMap, OverrideTable};
use spoolscan_core::ocr::{recognize_document, PureOcrEngine};
use spoolscan_core::pdf::{PdfExtractor, PdfProcessor};
use spoolscan_core::suppliers::{from_ocr_fragments, parse_invoice};
use spoolscan_core::thumbs::{ResolveReport, ThumbSource, ThumbnailResolver};

/// Arguments for the ingest command.
#[derive(Args)]
pub struct IngestArgs {
    /// Directory containing invoice PDFs
    #[arg(default_value = "invoices")]
    invoices_dir: PathBuf,

    /// Catalog database file
    #[arg(long, default_value = "catalog/db.json")]
    db: PathBuf,

    /// Directory for resolved thumbnails
    #[arg(long, default_value = "catalog/images")]
    images_dir: PathBuf,

    /// Reprocess invoices already present in the catalog
    #[arg(long)]
    reprocess: bool,

    /// JSON table of per-SKU field overrides applied after parsing
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// JSON map from SKU to an image path or URL
    #[arg(long)]
    image_map: Option<PathBuf>,

    /// OCR model directory (defaults to the configured one)
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

pub fn run(args: IngestArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        SpoolscanConfig::from_file(Path::new(path))?
    } else {
        SpoolscanConfig::default()
    };

    // Expand the invoice directory
    let pattern = args.invoices_dir.join("*.pdf");
    let mut files: Vec<PathBuf> = glob(&pattern.to_string_lossy())?
        .filter_map(|r| r.ok())
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!(
            "No invoice PDFs found in {}",
            args.invoices_dir.display()
        );
    }

    println!("{} Found {} invoice(s)", style("ℹ").blue(), files.len());

    // Load catalog and optional tables
    let mut catalog = load_catalog(&args.db)?;
    let overrides = match &args.overrides {
        Some(path) => OverrideTable::from_file(path)?,
        None => OverrideTable::default(),
    };
    let image_map = match &args.image_map {
        Some(path) => ImageMap::from_file(path)?,
        None => ImageMap::default(),
    };
    if !overrides.is_empty() {
        info!("Loaded {} override entries", overrides.len());
    }

    let model_dir = args
        .model_dir
        .clone()
        .unwrap_or_else(|| config.ocr.model_dir.clone());

    // Set up progress bar
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} invoices")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut ingested = 0usize;
    let mut skipped_existing = 0usize;
    let mut failed: Vec<(PathBuf, String)> = Vec::new();
    let mut thumb_totals = ThumbTotals::default();

    for path in &files {
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("invoice.pdf")
            .to_string();

        if !args.reprocess && catalog.iter().any(|r| r.source_file == file_name) {
            debug!("Skipping {} (already in catalog)", file_name);
            skipped_existing += 1;
            pb.inc(1);
            continue;
        }

        match ingest_invoice(path, &file_name, &config, &model_dir, &overrides, &image_map, &args) {
            Ok((record, report)) => {
                thumb_totals.add(&report);
                upsert(&mut catalog, record);
                // Save after every invoice so a later failure loses nothing
                save_catalog(&args.db, &catalog)?;
                ingested += 1;
            }
            Err(e) => {
                warn!("Failed to ingest {}: {}", path.display(), e);
                failed.push((path.clone(), e.to_string()));
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    // Print summary
    println!();
    println!(
        "{} Ingested {} new invoice(s) in {:?}",
        style("✓").green(),
        ingested,
        start.elapsed()
    );
    if skipped_existing > 0 {
        println!(
            "   {} already in catalog (use --reprocess to refresh)",
            skipped_existing
        );
    }
    println!("   {}", thumb_totals.summary());

    if !failed.is_empty() {
        println!();
        println!(
            "{} Skipped {} invoice(s) due to errors:",
            style("⚠").yellow(),
            failed.len()
        );
        for (path, error) in &failed {
            println!("  - {}: {}", path.display(), error);
        }
    }

    Ok(())
}

/// Process one invoice end to end: text, parse, overrides, thumbnails.
fn ingest_invoice(
    path: &Path,
    file_name: &str,
    config: &SpoolscanConfig,
    model_dir: &Path,
    overrides: &OverrideTable,
    image_map: &ImageMap,
    args: &IngestArgs,
) -> anyhow::Result<(InvoiceRecord, ResolveReport)> {
    let data = fs::read(path)?;
    let mut extractor = PdfExtractor::new();
    extractor.load(&data)?;

    let text = match extractor.extract_text() {
        Ok(text) => text,
        Err(e) => {
            warn!("Text extraction failed for {}: {}", file_name, e);
            String::new()
        }
    };

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");

    // Marketplace exports carry no usable text layer, so their file
    // names route them through OCR first; a failed OCR pass falls back
    // to the plain text parse.
    let mut result = if stem.to_lowercase().contains("ebay") {
        ocr_parse(&extractor, config, model_dir)
            .unwrap_or_else(|| parse_invoice(&text))
    } else {
        parse_invoice(&text)
    };

    info!(
        "{}: supplier {} with {} line(s), confidence {:.2}",
        file_name,
        result.supplier,
        result.lines.len(),
        result.confidence
    );

    let touched = apply_overrides(&mut result.lines, overrides);
    if !touched.is_empty() {
        debug!("Overrides applied to {}", touched.join(", "));
    }

    let resolver = ThumbnailResolver::new(config, &args.images_dir);
    let report = resolver.resolve(result.supplier, &result.lines, &extractor, stem, image_map);

    let record = InvoiceRecord {
        source_file: file_name.to_string(),
        ingested_at: Utc::now(),
        supplier: result.supplier,
        parse_confidence: result.confidence,
        lines: result.lines,
    };

    Ok((record, report))
}

/// Run the OCR variant path, returning None when the engine is missing
/// or recognition produced nothing usable.
fn ocr_parse(
    extractor: &PdfExtractor,
    config: &SpoolscanConfig,
    model_dir: &Path,
) -> Option<ParseResult> {
    let engine = match PureOcrEngine::from_dir(model_dir, &config.ocr) {
        Ok(engine) => engine,
        Err(e) => {
            warn!("OCR unavailable: {}", e);
            return None;
        }
    };
    let fragments = recognize_document(
        extractor,
        &engine,
        config.pdf.render_dpi,
        config.ocr.upscale,
    );
    debug!("OCR produced {} fragments", fragments.len());
    from_ocr_fragments(&fragments)
}

fn load_catalog(path: &Path) -> anyhow::Result<Vec<InvoiceRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_catalog(path: &Path, records: &[InvoiceRecord]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(records)?)?;
    Ok(())
}

/// Replace the record for a source file, or append a new one.
fn upsert(records: &mut Vec<InvoiceRecord>, record: InvoiceRecord) {
    match records
        .iter_mut()
        .find(|r| r.source_file == record.source_file)
    {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}

#[derive(Default)]
struct ThumbTotals {
    embedded: usize,
    page_crop: usize,
    mapped: usize,
    placeholder: usize,
    existing: usize,
}

impl ThumbTotals {
    fn add(&mut self, report: &ResolveReport) {
        self.embedded += report.count(ThumbSource::Embedded);
        self.page_crop += report.count(ThumbSource::PageCrop);
        self.mapped += report.count(ThumbSource::Mapped);
        self.placeholder += report.count(ThumbSource::Placeholder);
        self.existing += report.count(ThumbSource::Existing);
    }

    fn summary(&self) -> String {
        format!(
            "images: {} embedded, {} page-crop, {} mapped, {} placeholder, {} kept",
            self.embedded, self.page_crop, self.mapped, self.placeholder, self.existing
        )
    }
}

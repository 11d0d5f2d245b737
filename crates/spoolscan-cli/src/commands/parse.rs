//! Parse command - extract purchase lines from a single invoice.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use spoolscan_core::models::line::ParseResult;
use spoolscan_core::pdf::{PdfExtractor, PdfProcessor};
use spoolscan_core::suppliers::parse_invoice;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file (PDF, or plain text for pre-extracted invoices)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show parse confidence
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ParseArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let text = match extension.as_str() {
        "pdf" => {
            let data = fs::read(&args.input)?;
            let mut extractor = PdfExtractor::new();
            extractor.load(&data)?;
            extractor.extract_text()?
        }
        _ => fs::read_to_string(&args.input)?,
    };

    info!("Parsing {}", args.input.display());
    let result = parse_invoice(&text);

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Parse confidence: {:.1}%",
            style("ℹ").blue(),
            result.confidence * 100.0
        );
    }

    Ok(())
}

fn format_result(result: &ParseResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ParseResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["sku", "manufacturer", "material", "variant", "pack", "qtyKg"])?;

    for line in &result.lines {
        wtr.write_record([
            &line.sku,
            &line.manufacturer,
            &line.material,
            &line.variant,
            &line.pack.to_string(),
            &line.qty_kg.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ParseResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Supplier: {}\n", result.supplier));
    output.push_str(&format!("Lines: {}\n", result.lines.len()));
    output.push_str("\n");

    for line in &result.lines {
        output.push_str(&format!("{}\n", line.sku));
        output.push_str(&format!("  Manufacturer: {}\n", line.manufacturer));
        output.push_str(&format!("  Material:     {}\n", line.material));
        output.push_str(&format!("  Variant:      {}\n", line.variant));
        output.push_str(&format!("  Pack:         {}\n", line.pack));
        output.push_str(&format!("  Quantity:     {} kg\n", line.qty_kg));
        output.push_str("\n");
    }

    output
}

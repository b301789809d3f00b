// 🗺️ Location History CLI
// peek / stats / to-csv / split over a location-history export file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use location_history::router::file_size_mb;
use location_history::split::DEFAULT_MAX_MB;
use location_history::{
    describe_document, export_csv, load_and_route, load_document, split_entries, write_chunks,
    DateRange, LocationStats,
};

/// Peek only loads the whole document below this size
const PEEK_STRUCTURE_MAX_MB: f64 = 500.0;
const PEEK_HEAD_BYTES: usize = 4096;
const TOP_TYPES: usize = 10;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Parser)]
#[command(name = "location-history", version, about = "Inspect, export and split location-history exports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the head of the file and its top-level structure
    Peek {
        file: PathBuf,
    },
    /// Count entries by source, year and time span
    Stats {
        file: PathBuf,
    },
    /// Export every extracted point as CSV
    ToCsv {
        file: PathBuf,
        /// Output CSV path
        #[arg(short, long, default_value = "locations.csv")]
        output: PathBuf,
        /// Keep points at or after this day (YYYY-MM-DD, UTC)
        #[arg(long)]
        after: Option<String>,
        /// Keep points strictly before this day (YYYY-MM-DD, UTC)
        #[arg(long)]
        before: Option<String>,
    },
    /// Split into smaller documents under a size budget
    Split {
        file: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = "chunks")]
        output: PathBuf,
        /// Maximum chunk size in MB
        #[arg(long, default_value_t = DEFAULT_MAX_MB)]
        max_mb: u64,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Peek { file } => run_peek(&file),
        Command::Stats { file } => run_stats(&file),
        Command::ToCsv { file, output, after, before } => {
            run_to_csv(&file, &output, after.as_deref(), before.as_deref())
        }
        Command::Split { file, output, max_mb } => run_split(&file, &output, max_mb),
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn run_peek(path: &Path) -> Result<()> {
    let size_mb = file_size_mb(path)?;
    println!("📂 File: {}", path.display());
    println!("   Size: {:.1} MB", size_mb);

    let mut head = Vec::with_capacity(PEEK_HEAD_BYTES);
    File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?
        .take(PEEK_HEAD_BYTES as u64)
        .read_to_end(&mut head)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    println!("\n📄 First {} bytes:", PEEK_HEAD_BYTES);
    println!("{}", RULE);
    println!("{}", String::from_utf8_lossy(&head));
    println!("{}", RULE);

    if size_mb >= PEEK_STRUCTURE_MAX_MB {
        println!("\n⚠️  File is large; structure overview skipped.");
        println!("   Use `split` first, then peek at a chunk.");
        return Ok(());
    }

    println!("\n🔍 Structure:");
    let document = load_document(path)?;
    for summary in describe_document(&document) {
        println!("  {}", summary);
    }

    Ok(())
}

fn run_stats(path: &Path) -> Result<()> {
    println!("📊 Location History Stats");
    println!("{}", RULE);

    let document = load_and_route(path)?;
    if document.is_empty() {
        println!("❌ No entries found");
        return Ok(());
    }

    let stats = LocationStats::from_document(&document);

    println!("\n📋 Entries:");
    println!("  Total:  {}", stats.total_entries);
    println!("  Parsed: {}", stats.parsed);
    println!("  Failed: {}", stats.failed);

    println!("\n🏷️  Top types:");
    for (name, count) in stats.top_types(TOP_TYPES) {
        println!("  {:<40} {:>10}", name, count);
    }

    if let (Some(earliest), Some(latest)) = (stats.earliest, stats.latest) {
        println!("\n📅 Time range:");
        println!("  Earliest: {}", earliest.format("%Y-%m-%d %H:%M:%S UTC"));
        println!("  Latest:   {}", latest.format("%Y-%m-%d %H:%M:%S UTC"));
        if let Some(days) = stats.span_days() {
            println!("  Span:     {} days", days);
        }

        println!("\n📆 By year:");
        for (year, count) in &stats.by_year {
            println!("  {}: {}", year, count);
        }
    }

    Ok(())
}

fn run_to_csv(path: &Path, output: &Path, after: Option<&str>, before: Option<&str>) -> Result<()> {
    let range = DateRange::from_args(after, before)?;

    println!("📄 CSV Export");
    println!("{}", RULE);
    if let Some(after) = range.after {
        println!("  After:  {}", after);
    }
    if let Some(before) = range.before {
        println!("  Before: {}", before);
    }

    let document = load_and_route(path)?;
    println!("\n💾 Writing {} entries to {}...", document.len(), output.display());
    let summary = export_csv(output, &document, &range)?;

    println!("\n{}", RULE);
    println!("✅ Rows written: {}", summary.written);
    if !range.is_unbounded() {
        println!("✓ Filtered by date: {}", summary.filtered);
    }
    println!("✓ Skipped (no coordinates): {}", summary.skipped);
    println!("✓ Output size: {:.1} MB", file_size_mb(output)?);

    Ok(())
}

fn run_split(path: &Path, output: &Path, max_mb: u64) -> Result<()> {
    println!("✂️  Splitting {} (max {} MB per chunk)", path.display(), max_mb);
    println!("{}", RULE);

    let document = load_and_route(path)?;
    let top_key = document.top_key().to_string();
    let total = document.len();

    let max_bytes = usize::try_from(max_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX);
    let chunks = split_entries(document.entries, max_bytes)?;
    let written = write_chunks(output, &top_key, chunks)?;

    for chunk in &written {
        println!("  {}: {} entries, {:.1} MB", chunk.path.display(), chunk.entries, chunk.size_mb());
    }

    println!("\n{}", RULE);
    println!("✅ {} entries → {} chunks in {}", total, written.len(), output.display());

    Ok(())
}

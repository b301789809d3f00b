// Location History - Sync Client
// Upload exported CSV to the location-sync API and drive the H3 backfill

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use location_history::config::Config;
use location_history::sync::chunk_count;
use location_history::{
    import_records, read_records, run_backfill, write_batches, BackfillOptions, HttpApi,
    ImportOptions,
};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Parser)]
#[command(name = "location-sync", version, about = "Sync location-history CSV exports to the location API")]
struct Cli {
    /// TOML config file (default: location-sync.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API base URL
    #[arg(long, global = true, env = "LOCATION_SYNC_API_URL")]
    api_url: Option<String>,

    /// Bearer token
    #[arg(long, global = true, env = "LOCATION_SYNC_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// POST CSV rows to the batch endpoint in chunks
    Import {
        /// CSV produced by `location-history to-csv`
        csv: PathBuf,
        /// Records per request
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Seconds to wait between chunks
        #[arg(long)]
        delay: Option<f64>,
        /// Write batch files instead of posting them
        #[arg(long)]
        dry_run: bool,
        /// Output directory for --dry-run batches
        #[arg(short, long, default_value = "chunks")]
        output: PathBuf,
    },
    /// Call the H3 backfill endpoint until it reports completion
    BackfillH3 {
        /// Seconds to wait between calls
        #[arg(long)]
        delay: Option<f64>,
        /// Stop after one successful call
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    // CLI / env override the config file
    if let Some(url) = cli.api_url {
        config.api.url = url;
    }
    if let Some(token) = cli.token {
        config.api.token = Some(token);
    }

    match cli.command {
        Command::Import { csv, chunk_size, delay, dry_run, output } => {
            if let Some(chunk_size) = chunk_size {
                config.import.chunk_size = chunk_size;
            }
            if let Some(delay) = delay {
                config.import.delay_secs = delay;
            }
            config.validate()?;
            run_import(&config, &csv, dry_run, &output).await
        }
        Command::BackfillH3 { delay, dry_run } => {
            if let Some(delay) = delay {
                config.backfill.delay_secs = delay;
            }
            config.validate()?;
            run_backfill_h3(&config, dry_run).await
        }
    }
}

fn require_token(config: &Config) -> Result<&str> {
    match config.api.token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => Ok(token),
        None => bail!("No API token: set LOCATION_SYNC_TOKEN, pass --token, or add [api] token to the config"),
    }
}

fn build_api(config: &Config) -> Result<HttpApi> {
    let token = require_token(config)?;
    HttpApi::new(&config.api.url, token, config.import.timeout(), config.backfill.timeout())
}

async fn run_import(config: &Config, csv: &Path, dry_run: bool, output: &Path) -> Result<()> {
    println!("📤 Location Import");
    println!("{}", RULE);

    let records = read_records(csv)?;
    let chunk_size = config.import.chunk_size;
    println!("✓ Loaded {} records from {}", records.len(), csv.display());
    println!("✓ {} chunks of up to {} records", chunk_count(records.len(), chunk_size), chunk_size);

    if dry_run {
        let written = write_batches(output, &records, chunk_size)?;
        println!("\n🔍 Dry run: wrote {} batch files to {}", written.len(), output.display());
        println!("\n   To upload manually:");
        println!("   for f in {}/batch_*.json; do", output.display());
        println!("     curl -X POST {}/locations/batch \\", config.api.url);
        println!("       -H \"Authorization: Bearer $LOCATION_SYNC_TOKEN\" \\");
        println!("       -H \"Content-Type: application/json\" \\");
        println!("       -d @\"$f\"");
        println!("   done");
        return Ok(());
    }

    let api = build_api(config)?;
    println!("\n🌐 Posting to {}/locations/batch", config.api.url);

    let options = ImportOptions { chunk_size, delay: config.import.delay() };
    let summary = import_records(&api, &records, options).await;

    println!("\n{}", RULE);
    println!("✅ Imported: {}", summary.imported);
    println!("✓ Errors:   {}", summary.errors);
    println!("✓ Total:    {}", summary.total);

    Ok(())
}

async fn run_backfill_h3(config: &Config, dry_run: bool) -> Result<()> {
    println!("🔷 H3 Backfill");
    println!("{}", RULE);

    let api = build_api(config)?;
    let options = BackfillOptions {
        delay: config.backfill.delay(),
        retry_delay: config.backfill.retry_delay(),
        dry_run,
    };
    let summary = run_backfill(&api, options).await;

    println!("\n{}", RULE);
    println!("✅ Total updated: {}", summary.total_updated);
    println!("✓ Requests:      {}", summary.requests);
    if summary.failures > 0 {
        println!("✓ Failed calls:  {}", summary.failures);
    }

    Ok(())
}

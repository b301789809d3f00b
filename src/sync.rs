// 🔄 Sync Client - batch import + H3 backfill against the location-sync API
//
// Both loops are sequential with fixed delays:
// - import: one POST per chunk, a failed chunk counts as errors (no retry)
// - backfill: POST until the server reports "complete", retrying failures forever

use crate::point::LocationRecord;
use crate::split::WrittenChunk;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

// ============================================================================
// API SEAM
// ============================================================================

/// LocationApi - the two remote calls the sync loops need
#[async_trait]
pub trait LocationApi: Send + Sync {
    /// POST one chunk of records to the batch-ingest endpoint
    async fn post_batch(&self, records: &[LocationRecord]) -> Result<BatchResponse>;

    /// POST once to the H3 backfill endpoint
    async fn backfill_h3(&self) -> Result<BackfillResponse>;
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    locations: &'a [LocationRecord],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub imported: u64,
    #[serde(default)]
    pub errors: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackfillResponse {
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub remaining: u64,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "unknown".to_string()
}

impl BackfillResponse {
    pub fn is_complete(&self) -> bool {
        self.status == "complete"
    }
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

/// HttpApi - reqwest implementation with bearer-token auth
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
    batch_timeout: Duration,
    backfill_timeout: Duration,
}

impl HttpApi {
    pub fn new(base_url: &str, token: &str, batch_timeout: Duration, backfill_timeout: Duration) -> Result<Self> {
        // Create HTTP client once for reuse (connection pooling)
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpApi {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            batch_timeout,
            backfill_timeout,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl LocationApi for HttpApi {
    async fn post_batch(&self, records: &[LocationRecord]) -> Result<BatchResponse> {
        let response = self
            .client
            .post(self.endpoint("/locations/batch"))
            .bearer_auth(&self.token)
            .timeout(self.batch_timeout)
            .json(&BatchRequest { locations: records })
            .send()
            .await
            .context("batch request failed")?
            .error_for_status()
            .context("batch request rejected")?;

        response.json().await.context("Failed to decode batch response")
    }

    async fn backfill_h3(&self) -> Result<BackfillResponse> {
        let response = self
            .client
            .post(self.endpoint("/locations/backfill-h3"))
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body("{}")
            .timeout(self.backfill_timeout)
            .send()
            .await
            .context("backfill request failed")?
            .error_for_status()
            .context("backfill request rejected")?;

        response.json().await.context("Failed to decode backfill response")
    }
}

// ============================================================================
// BATCH IMPORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportOptions {
    pub chunk_size: usize,
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: u64,
    pub errors: u64,
    pub total: usize,
    pub chunks: usize,
}

/// Number of chunks `total` records split into
pub fn chunk_count(total: usize, chunk_size: usize) -> usize {
    total.div_ceil(chunk_size.max(1))
}

/// POST records chunk by chunk. Transport failures are counted, never retried.
pub async fn import_records<A: LocationApi + ?Sized>(
    api: &A,
    records: &[LocationRecord],
    options: ImportOptions,
) -> ImportSummary {
    let chunk_size = options.chunk_size.max(1);
    let total_chunks = chunk_count(records.len(), chunk_size);
    let mut summary = ImportSummary { total: records.len(), chunks: total_chunks, ..Default::default() };

    for (index, chunk) in records.chunks(chunk_size).enumerate() {
        match api.post_batch(chunk).await {
            Ok(response) => {
                summary.imported += response.imported;
                summary.errors += response.errors;
                println!(
                    "   [{}/{}] ✅ {} imported, {} errors",
                    index + 1,
                    total_chunks,
                    response.imported,
                    response.errors
                );
            }
            Err(e) => {
                summary.errors += chunk.len() as u64;
                error!(chunk = index, error = %format!("{:#}", e), "batch upload failed");
                println!("   [{}/{}] ❌ Error: {:#}", index + 1, total_chunks, e);
            }
        }

        if index + 1 < total_chunks && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
    }

    info!(imported = summary.imported, errors = summary.errors, total = summary.total, "import finished");
    summary
}

/// Output file name for dry-run batch `index`
pub fn batch_file_name(index: usize) -> String {
    format!("batch_{:04}.json", index)
}

/// Dry run: write each chunk as `{"locations": [...]}` instead of posting it
pub fn write_batches(output_dir: &Path, records: &[LocationRecord], chunk_size: usize) -> Result<Vec<WrittenChunk>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let mut written = Vec::new();

    for (index, chunk) in records.chunks(chunk_size.max(1)).enumerate() {
        let path = output_dir.join(batch_file_name(index));
        let body = serde_json::to_vec(&BatchRequest { locations: chunk })
            .context("Failed to serialize records")?;
        fs::write(&path, &body)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        written.push(WrittenChunk { path, entries: chunk.len(), size_bytes: body.len() });
    }

    Ok(written)
}

// ============================================================================
// H3 BACKFILL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackfillOptions {
    pub delay: Duration,
    pub retry_delay: Duration,
    /// Stop after the first successful call
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    pub total_updated: u64,
    /// Every attempt, failed ones included
    pub requests: usize,
    pub failures: usize,
}

/// Call the backfill endpoint until it reports completion.
///
/// Transport failures wait `retry_delay` and retry without limit.
pub async fn run_backfill<A: LocationApi + ?Sized>(api: &A, options: BackfillOptions) -> BackfillSummary {
    let mut summary = BackfillSummary::default();

    loop {
        summary.requests += 1;

        let response = match api.backfill_h3().await {
            Ok(response) => response,
            Err(e) => {
                summary.failures += 1;
                error!(attempt = summary.requests, error = %format!("{:#}", e), "backfill request failed");
                println!("   ❌ Request error: {:#}", e);
                println!("   retrying in {:.0}s...", options.retry_delay.as_secs_f64());
                tokio::time::sleep(options.retry_delay).await;
                continue;
            }
        };

        summary.total_updated += response.updated;
        println!(
            "   [{}] ✅ {} updated, {} remaining (status: {})",
            summary.requests, response.updated, response.remaining, response.status
        );

        if response.is_complete() {
            break;
        }

        if options.dry_run {
            println!("\n🔍 Dry run: stopping after one call");
            break;
        }

        tokio::time::sleep(options.delay).await;
    }

    info!(total_updated = summary.total_updated, requests = summary.requests, "backfill finished");
    summary
}

// ============================================================================
// TESTS
// ============================================================================

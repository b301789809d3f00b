// ✂️ Chunk Splitter
// Raw entries → successive documents under a byte budget each
//
// Entries are re-serialized as-is (not normalized), so every chunk can be fed
// back through the router.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default per-chunk budget in MB
pub const DEFAULT_MAX_MB: u64 = 4;

/// Chunk - entries that go into one output document
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub entries: Vec<Value>,
    /// Sum of the compact serialized sizes of the entries
    pub size_bytes: usize,
}

impl Chunk {
    fn new() -> Self {
        Chunk { entries: Vec::new(), size_bytes: 0 }
    }
}

/// Serialized size of one entry in bytes (UTF-8, non-ASCII unescaped)
pub fn entry_size(entry: &Value) -> Result<usize> {
    let bytes = serde_json::to_vec(entry).context("Failed to serialize entry")?;
    Ok(bytes.len())
}

/// Group entries into chunks whose entry bytes sum to at most `max_bytes`.
///
/// Only entry bytes count: the written file adds the `{"<key>":[...]}`
/// wrapper and one comma between entries on top of the budget.
/// An entry larger than the budget still gets a chunk of its own.
/// Order is preserved and nothing is dropped.
pub fn split_entries(entries: Vec<Value>, max_bytes: usize) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();
    let mut current = Chunk::new();

    for entry in entries {
        let size = entry_size(&entry)?;

        if current.size_bytes + size > max_bytes && !current.entries.is_empty() {
            chunks.push(std::mem::replace(&mut current, Chunk::new()));
        }

        current.entries.push(entry);
        current.size_bytes += size;
    }

    if !current.entries.is_empty() {
        chunks.push(current);
    }

    Ok(chunks)
}

/// WrittenChunk - report line for one chunk file
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenChunk {
    pub path: PathBuf,
    pub entries: usize,
    pub size_bytes: usize,
}

impl WrittenChunk {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Output file name for chunk `index`
pub fn chunk_file_name(index: usize) -> String {
    format!("chunk_{:04}.json", index)
}

/// Write each chunk as `{<top_key>: [...]}` into `output_dir`
pub fn write_chunks(output_dir: &Path, top_key: &str, chunks: Vec<Chunk>) -> Result<Vec<WrittenChunk>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let mut written = Vec::with_capacity(chunks.len());

    for (index, chunk) in chunks.into_iter().enumerate() {
        let path = output_dir.join(chunk_file_name(index));
        let entries = chunk.entries.len();
        let size_bytes = chunk.size_bytes;

        let mut document = Map::new();
        document.insert(top_key.to_string(), Value::Array(chunk.entries));
        write_json(&path, &Value::Object(document))?;

        info!(path = %path.display(), entries, size_bytes, "chunk written");
        written.push(WrittenChunk { path, entries, size_bytes });
    }

    Ok(written)
}

/// Serialize a JSON value compactly to `path`
pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(n: usize) -> Vec<Value> {
        (0..n).map(|i| json!({"i": i})).collect()
    }

    #[test]
    fn test_entry_size_is_utf8_length() {
        assert_eq!(entry_size(&json!({"a": 1})).unwrap(), 7);
        // "東京" is 6 bytes in UTF-8 and is not escaped
        assert_eq!(entry_size(&json!("東京")).unwrap(), 8);
    }

    #[test]
    fn test_split_respects_budget() {
        // each {"i":N} with one digit is 7 bytes
        let chunks = split_entries(entries(10), 21).unwrap();

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].entries.len(), 3);
        assert_eq!(chunks[0].size_bytes, 21);
        assert_eq!(chunks[3].entries.len(), 1);
        assert!(chunks.iter().all(|c| c.size_bytes <= 21));
    }

    #[test]
    fn test_oversize_entry_gets_own_chunk() {
        let chunks = split_entries(entries(3), 1).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.entries.len() == 1));
    }

    #[test]
    fn test_split_preserves_order() {
        let original = entries(25);
        for budget in [1, 7, 8, 50, 10_000] {
            let chunks = split_entries(original.clone(), budget).unwrap();
            let joined: Vec<Value> = chunks.into_iter().flat_map(|c| c.entries).collect();
            assert_eq!(joined, original, "budget {}", budget);
        }
    }

    #[test]
    fn test_split_empty() {
        assert!(split_entries(Vec::new(), 100).unwrap().is_empty());
    }

    #[test]
    fn test_budget_excludes_wrapper_bytes() {
        let chunks = split_entries(entries(3), 21).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].size_bytes, 21);

        // {"locations":[e,e,e]} is larger than the budget by wrapper + commas
        let document = json!({"locations": chunks[0].entries});
        assert_eq!(entry_size(&document).unwrap(), 21 + 16 + 2);
    }

    #[test]
    fn test_written_chunk_size_mb() {
        let chunk = WrittenChunk { path: PathBuf::from("chunk_0000.json"), entries: 1, size_bytes: 3 * 1024 * 1024 / 2 };
        assert_eq!(chunk.size_mb(), 1.5);
    }

    #[test]
    fn test_chunk_file_name() {
        assert_eq!(chunk_file_name(0), "chunk_0000.json");
        assert_eq!(chunk_file_name(42), "chunk_0042.json");
    }
}

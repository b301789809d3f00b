// Location History - Core Library
// Exposes all modules for use in the CLI, the sync client, and tests

pub mod coordinate;
pub mod timestamp;
pub mod point;
pub mod extractor;
pub mod router;
pub mod stats;
pub mod export;
pub mod split;
pub mod config;

#[cfg(feature = "api")]
pub mod sync;

// Re-export commonly used types
pub use coordinate::parse_coordinate_pair;
pub use timestamp::{parse_timestamp, parse_timestamp_str, DateRange};
pub use point::{LocationRecord, Point, CSV_HEADER};
pub use extractor::{extract_point, EntryKind, SkipReason};
pub use router::{
    describe_document, load_and_route, load_document, route,
    KeySummary, Layout, RoutedDocument,
};
pub use stats::LocationStats;
pub use export::{export_csv, read_records, write_csv, ExportSummary};
pub use split::{split_entries, write_chunks, Chunk, WrittenChunk};
pub use config::Config;

#[cfg(feature = "api")]
pub use sync::{
    import_records, run_backfill, write_batches,
    BackfillOptions, BackfillSummary, HttpApi, ImportOptions, ImportSummary, LocationApi,
};

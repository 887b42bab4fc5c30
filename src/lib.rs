pub mod discovery;
pub mod errors;
pub mod extractor;
pub mod incremental;
pub mod parallel_processing;
pub mod prenormalize;
pub mod reader;
pub mod sources;
pub mod tei;

// Re-export the single-document pipeline
pub use errors::StructureError;
pub use extractor::resolver::ConversionConfig;
pub use extractor::{extract_play, DocumentReport, PlayDocument};
pub use tei::{render_tei, TeiOptions};

// Re-export corpus processing types and functions for the binary and benchmarks
pub use parallel_processing::{
    process_files_parallel, write_run_stats, FileStats, RunOptions, RunStats, RunSummary,
};

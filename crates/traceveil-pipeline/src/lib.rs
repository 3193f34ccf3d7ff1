//! TraceVeil File Pipeline
//!
//! Drives files through the masking pipeline:
//! `Received -> PresetResolved -> Scanned -> Masked -> MappingExported ->
//! Completed`, with `Failed` reachable from any step. Many files are
//! processed concurrently by a fixed-size worker pool; masked output and
//! export artifacts are written atomically.

pub mod atomic;
pub mod export_writer;
pub mod pipeline;
pub mod state;

pub use atomic::AtomicWriter;
pub use export_writer::{export_path, write_export};
pub use pipeline::{CancelToken, FileJob, Pipeline, PipelineConfig};
pub use state::{FileReport, FileState};

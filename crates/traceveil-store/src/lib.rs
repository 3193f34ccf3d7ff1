//! TraceVeil Mapping Store
//!
//! This crate provides the masking map: the persisted set of
//! (category, original value) -> masked value records used for consistency
//! and audit:
//! - The `MappingStore` trait with concurrency-safe lookup-or-create
//! - An in-memory implementation for tests and one-shot runs
//! - Search filtering, sorting, and pagination
//! - The JSON export artifact

pub mod export;
pub mod filter;
pub mod memory;
pub mod store;

pub use export::MappingExport;
pub use filter::{MappingFilter, MappingFilterBuilder, SearchResults, SortDirection, SortKey};
pub use memory::MemoryMappingStore;
pub use store::{LookupOutcome, MappingStore};

//! TraceVeil SQLite Mapping Store
//!
//! SQLite-backed implementation of the `MappingStore` trait. Persists
//! mappings across runs so re-masking the same values stays consistent,
//! and backs the search/export/purge surface of the CLI.

pub mod sqlite_mapping_store;

pub use sqlite_mapping_store::SqliteMappingStore;

//! TraceVeil Rule-Set File Loading
//!
//! Loads rule-set catalogs from YAML or TOML files and compiles them into
//! read-only `Catalog` values for the engine.

pub mod loader;

pub use loader::{load_catalog, load_catalog_spec};

//! End-to-end integration tests for TraceVeil
//!
//! These tests wire together the rule-set loader, scan engine, mapping
//! stores, and file pipeline to verify the full masking flow, including
//! persistence across runs against the SQLite store.

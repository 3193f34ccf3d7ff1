//! Mapping store trait

use crate::filter::{MappingFilter, SearchResults};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use traceveil_core::{Category, MaskedValue, MaskingMapping, Result};

/// Result of a lookup-or-create call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOutcome {
    pub mapping: MaskingMapping,
    /// Whether this call created the mapping (as opposed to reusing an
    /// existing row)
    pub created: bool,
}

/// Persistent lookup-or-create store for masking mappings
///
/// Implementations guarantee that at most one mapping is ever created per
/// (category, original_value) pair: concurrent callers racing on the same
/// pair observe exactly one creation and receive the same masked value.
/// A write conflict during creation is recovered by re-reading the winning
/// row, never surfaced to the caller.
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Return the existing mapping for the pair, or create one with the
    /// given masked value.
    ///
    /// When `masked.collision_checked` is set and another original in the
    /// same category already maps to the same masked value, creation fails
    /// with `HashCollision` instead of silently merging the two originals.
    async fn lookup_or_create(
        &self,
        category: &Category,
        original_value: &str,
        masked: &MaskedValue,
    ) -> Result<LookupOutcome>;

    /// Fetch a mapping without creating one
    async fn get(&self, category: &Category, original_value: &str)
    -> Result<Option<MaskingMapping>>;

    /// Search accumulated mappings with filtering, sorting, and pagination
    async fn search(&self, filter: &MappingFilter) -> Result<SearchResults<MaskingMapping>>;

    /// Total number of stored mappings
    async fn count(&self) -> Result<u64>;

    /// Bulk-delete mappings, optionally only those created before the given
    /// instant. Returns the number of deleted rows.
    async fn purge(&self, older_than: Option<DateTime<Utc>>) -> Result<u64>;
}

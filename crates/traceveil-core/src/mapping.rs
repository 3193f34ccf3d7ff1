//! Masking map records
//!
//! A mapping ties one original value, within one category, to the masked
//! value it was replaced with. Mappings are created lazily during scanning
//! and persist for audit and search; they are never mutated, only created
//! or bulk-purged.

use crate::category::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted (category, original value) -> masked value record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskingMapping {
    /// Store-assigned id
    pub id: i64,

    pub category: Category,

    pub original_value: String,

    pub masked_value: String,

    pub created_at: DateTime<Utc>,
}

/// A masked value computed by the masker, ready for store insertion
///
/// `collision_checked` is set for hash-action values: two distinct originals
/// hashing to the same masked value is a fatal collision, while replace and
/// redact actions are many-to-one by design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedValue {
    pub value: String,
    pub collision_checked: bool,
}

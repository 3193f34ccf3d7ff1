//! Mapping export artifact
//!
//! The export artifact is the JSON document handed to downstream audit
//! tooling after a file completes the pipeline. It carries every mapping
//! that was looked up or created while masking that file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use traceveil_core::MaskingMapping;

/// Serialized mapping set for one processed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingExport {
    pub file_id: String,

    pub product_name: String,

    pub export_timestamp: DateTime<Utc>,

    pub total_mappings: usize,

    pub mappings: Vec<MaskingMapping>,
}

impl MappingExport {
    pub fn new(
        file_id: impl Into<String>,
        product_name: impl Into<String>,
        mappings: Vec<MaskingMapping>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            product_name: product_name.into(),
            export_timestamp: Utc::now(),
            total_mappings: mappings.len(),
            mappings,
        }
    }
}

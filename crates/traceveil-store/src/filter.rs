//! Mapping search and filtering

use serde::{Deserialize, Serialize};
use traceveil_core::Category;

/// Sort key for mapping searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Category,
    OriginalValue,
    MaskedValue,
    #[default]
    CreatedAt,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Filter criteria for searching mappings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingFilter {
    /// Free-text query matched against original and masked values
    #[serde(default)]
    pub query: Option<String>,

    /// Restrict to one category
    #[serde(default)]
    pub category: Option<Category>,

    #[serde(default)]
    pub sort: SortKey,

    #[serde(default)]
    pub direction: SortDirection,

    /// Maximum results returned
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Number of results skipped
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

impl Default for MappingFilter {
    fn default() -> Self {
        Self {
            query: None,
            category: None,
            sort: SortKey::default(),
            direction: SortDirection::default(),
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl MappingFilter {
    /// Maximum length for free-text queries
    const MAX_QUERY_LEN: usize = 1000;

    /// Maximum results per search
    const MAX_LIMIT: usize = 1000;

    /// Create a new filter builder
    pub fn builder() -> MappingFilterBuilder {
        MappingFilterBuilder::default()
    }

    /// Validate the filter parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.limit == 0 {
            return Err("limit must be greater than 0".to_string());
        }

        if self.limit > Self::MAX_LIMIT {
            return Err(format!("limit exceeds maximum {}", Self::MAX_LIMIT));
        }

        if let Some(ref query) = self.query
            && query.len() > Self::MAX_QUERY_LEN
        {
            return Err(format!(
                "query exceeds maximum length of {}",
                Self::MAX_QUERY_LEN
            ));
        }

        Ok(())
    }
}

/// Builder for MappingFilter
#[derive(Debug, Default)]
pub struct MappingFilterBuilder {
    filter: MappingFilter,
}

impl MappingFilterBuilder {
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.filter.query = Some(query.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.filter.category = Some(category);
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.filter.sort = sort;
        self
    }

    pub fn direction(mut self, direction: SortDirection) -> Self {
        self.filter.direction = direction;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.filter.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.filter.offset = offset;
        self
    }

    pub fn build(self) -> Result<MappingFilter, String> {
        self.filter.validate()?;
        Ok(self.filter)
    }
}

/// Search results with pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults<T> {
    /// Matching items for the requested page
    pub items: Vec<T>,

    /// Total count of matching items across all pages
    pub total_count: u64,

    pub limit: usize,

    pub offset: usize,
}

impl<T> SearchResults<T> {
    pub fn new(items: Vec<T>, total_count: u64, limit: usize, offset: usize) -> Self {
        Self {
            items,
            total_count,
            limit,
            offset,
        }
    }

    pub fn has_more(&self) -> bool {
        (self.offset + self.items.len()) < self.total_count as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let filter = MappingFilter::builder().build().unwrap();
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);
        assert_eq!(filter.sort, SortKey::CreatedAt);
        assert_eq!(filter.direction, SortDirection::Asc);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let result = MappingFilter::builder().limit(0).build();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("limit must be greater than 0"));
    }

    #[test]
    fn test_limit_bound() {
        assert!(MappingFilter::builder().limit(1000).build().is_ok());

        let result = MappingFilter::builder().limit(1001).build();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("exceeds maximum"));
    }

    #[test]
    fn test_query_length_bound() {
        assert!(MappingFilter::builder().query("a".repeat(1000)).build().is_ok());

        let result = MappingFilter::builder().query("a".repeat(1001)).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_sort_key_serde() {
        let json = serde_json::to_string(&SortKey::OriginalValue).unwrap();
        assert_eq!(json, "\"original_value\"");

        let parsed: SortKey = serde_json::from_str("\"masked_value\"").unwrap();
        assert_eq!(parsed, SortKey::MaskedValue);
    }

    #[test]
    fn test_search_results_has_more() {
        let results = SearchResults::new(vec![1, 2, 3], 10, 3, 0);
        assert!(results.has_more());

        let results = SearchResults::new(vec![9, 10], 10, 3, 8);
        assert!(!results.has_more());
    }
}

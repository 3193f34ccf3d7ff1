//! In-memory mapping store
//!
//! Backed by a concurrent map with insert-if-absent semantics. Used by
//! tests and by one-shot CLI runs that do not need mappings to survive the
//! process.

use crate::filter::{MappingFilter, SearchResults, SortDirection, SortKey};
use crate::store::{LookupOutcome, MappingStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use traceveil_core::{Category, Error, MaskedValue, MaskingMapping, Result};

/// Concurrency-safe in-memory mapping store
#[derive(Debug, Default)]
pub struct MemoryMappingStore {
    mappings: DashMap<(Category, String), MaskingMapping>,
    // (category, masked_value) -> original_value, for hash-collision checks
    masked_index: DashMap<(Category, String), String>,
    next_id: AtomicI64,
}

impl MemoryMappingStore {
    pub fn new() -> Self {
        Self {
            mappings: DashMap::new(),
            masked_index: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl MappingStore for MemoryMappingStore {
    async fn lookup_or_create(
        &self,
        category: &Category,
        original_value: &str,
        masked: &MaskedValue,
    ) -> Result<LookupOutcome> {
        let key = (category.clone(), original_value.to_string());

        match self.mappings.entry(key) {
            Entry::Occupied(existing) => Ok(LookupOutcome {
                mapping: existing.get().clone(),
                created: false,
            }),
            Entry::Vacant(vacant) => {
                if masked.collision_checked {
                    let index_key = (category.clone(), masked.value.clone());
                    match self.masked_index.entry(index_key) {
                        Entry::Occupied(owner) if owner.get() != original_value => {
                            return Err(Error::HashCollision {
                                category: category.to_string(),
                                masked: masked.value.clone(),
                            });
                        }
                        Entry::Occupied(_) => {}
                        Entry::Vacant(slot) => {
                            slot.insert(original_value.to_string());
                        }
                    }
                }

                let mapping = MaskingMapping {
                    id: self.next_id.fetch_add(1, AtomicOrdering::SeqCst),
                    category: category.clone(),
                    original_value: original_value.to_string(),
                    masked_value: masked.value.clone(),
                    created_at: Utc::now(),
                };
                vacant.insert(mapping.clone());
                Ok(LookupOutcome {
                    mapping,
                    created: true,
                })
            }
        }
    }

    async fn get(
        &self,
        category: &Category,
        original_value: &str,
    ) -> Result<Option<MaskingMapping>> {
        let key = (category.clone(), original_value.to_string());
        Ok(self.mappings.get(&key).map(|entry| entry.clone()))
    }

    async fn search(&self, filter: &MappingFilter) -> Result<SearchResults<MaskingMapping>> {
        filter.validate().map_err(Error::MappingStore)?;

        let query = filter.query.as_deref().map(str::to_lowercase);
        let mut matches: Vec<MaskingMapping> = self
            .mappings
            .iter()
            .filter(|entry| {
                let mapping = entry.value();

                if let Some(category) = &filter.category
                    && &mapping.category != category
                {
                    return false;
                }

                if let Some(query) = &query {
                    return mapping.original_value.to_lowercase().contains(query)
                        || mapping.masked_value.to_lowercase().contains(query);
                }

                true
            })
            .map(|entry| entry.value().clone())
            .collect();

        matches.sort_by(|a, b| {
            let ordering = match filter.sort {
                SortKey::Category => a.category.cmp(&b.category),
                SortKey::OriginalValue => a.original_value.cmp(&b.original_value),
                SortKey::MaskedValue => a.masked_value.cmp(&b.masked_value),
                SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            let ordering = match filter.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            // Stable tiebreak so pagination never repeats or skips rows
            match ordering {
                Ordering::Equal => a.id.cmp(&b.id),
                other => other,
            }
        });

        let total_count = matches.len() as u64;
        let items: Vec<MaskingMapping> = matches
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect();

        Ok(SearchResults::new(
            items,
            total_count,
            filter.limit,
            filter.offset,
        ))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.mappings.len() as u64)
    }

    async fn purge(&self, older_than: Option<DateTime<Utc>>) -> Result<u64> {
        let before = self.mappings.len();

        match older_than {
            Some(cutoff) => {
                let doomed: Vec<(Category, String)> = self
                    .mappings
                    .iter()
                    .filter(|entry| entry.value().created_at < cutoff)
                    .map(|entry| entry.key().clone())
                    .collect();

                for key in &doomed {
                    if let Some((_, mapping)) = self.mappings.remove(key) {
                        self.masked_index
                            .remove(&(mapping.category, mapping.masked_value));
                    }
                }
            }
            None => {
                self.mappings.clear();
                self.masked_index.clear();
            }
        }

        let purged = (before - self.mappings.len()) as u64;
        tracing::info!(purged, "purged mappings from in-memory store");
        Ok(purged)
    }
}

//! SQLite-backed mapping store
//!
//! Persistence keeps masking consistent across re-runs and makes the
//! accumulated mappings searchable for audit. The uniqueness guarantee is
//! enforced by a UNIQUE constraint on (category, original_value); a write
//! conflict between concurrent creators is recovered by re-reading the
//! winning row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;

use traceveil_core::{Category, Error, MaskedValue, MaskingMapping, Result};
use traceveil_store::{
    LookupOutcome, MappingFilter, MappingStore, SearchResults, SortDirection, SortKey,
};

/// Raw mapping row as stored in SQLite
#[derive(Debug, sqlx::FromRow)]
struct MappingRow {
    id: i64,
    category: String,
    original_value: String,
    masked_value: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MappingRow> for MaskingMapping {
    type Error = Error;

    fn try_from(row: MappingRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            category: Category::new(row.category)?,
            original_value: row.original_value,
            masked_value: row.masked_value,
            created_at: row.created_at,
        })
    }
}

/// SQLite mapping store
#[derive(Clone)]
pub struct SqliteMappingStore {
    pool: SqlitePool,
}

impl SqliteMappingStore {
    pub async fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(db_path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal),
            )
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Self::initialize_schema(&pool).await?;

        let version: i32 = sqlx::query_scalar("SELECT version FROM schema_version")
            .fetch_one(&pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        if version != 1 {
            return Err(Error::Database(format!(
                "Unsupported schema version: {}",
                version
            )));
        }

        Ok(Self { pool })
    }

    async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (1)")
            .execute(pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS mappings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL,
                original_value TEXT NOT NULL,
                masked_value TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL,
                UNIQUE(category, original_value)
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_mappings_created ON mappings(created_at DESC)",
        )
        .execute(pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_mappings_masked ON mappings(category, masked_value)",
        )
        .execute(pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    async fn fetch(
        &self,
        category: &Category,
        original_value: &str,
    ) -> Result<Option<MaskingMapping>> {
        let row: Option<MappingRow> = sqlx::query_as(
            r#"
            SELECT id, category, original_value, masked_value, created_at
            FROM mappings
            WHERE category = ? AND original_value = ?
            "#,
        )
        .bind(category.as_str())
        .bind(original_value)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        row.map(MaskingMapping::try_from).transpose()
    }
}

/// Escape LIKE wildcards in a free-text query
fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn order_by_clause(sort: SortKey, direction: SortDirection) -> String {
    let column = match sort {
        SortKey::Category => "category",
        SortKey::OriginalValue => "original_value",
        SortKey::MaskedValue => "masked_value",
        SortKey::CreatedAt => "created_at",
    };
    let direction = match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    // id tiebreak keeps pagination stable across equal sort keys
    format!(" ORDER BY {column} {direction}, id {direction}")
}

#[async_trait]
impl MappingStore for SqliteMappingStore {
    async fn lookup_or_create(
        &self,
        category: &Category,
        original_value: &str,
        masked: &MaskedValue,
    ) -> Result<LookupOutcome> {
        if let Some(existing) = self.fetch(category, original_value).await? {
            return Ok(LookupOutcome {
                mapping: existing,
                created: false,
            });
        }

        if masked.collision_checked {
            let owner: Option<String> = sqlx::query_scalar(
                "SELECT original_value FROM mappings WHERE category = ? AND masked_value = ? LIMIT 1",
            )
            .bind(category.as_str())
            .bind(&masked.value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

            if let Some(owner) = owner
                && owner != original_value
            {
                return Err(Error::HashCollision {
                    category: category.to_string(),
                    masked: masked.value.clone(),
                });
            }
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO mappings (category, original_value, masked_value, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(category, original_value) DO NOTHING
            "#,
        )
        .bind(category.as_str())
        .bind(original_value)
        .bind(&masked.value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        // Re-read unconditionally: on conflict another creator won the race
        // and its row is the one every caller must observe.
        let mapping = self.fetch(category, original_value).await?.ok_or_else(|| {
            Error::Database("mapping missing after insert".to_string())
        })?;

        Ok(LookupOutcome {
            mapping,
            created: inserted.rows_affected() == 1,
        })
    }

    async fn get(
        &self,
        category: &Category,
        original_value: &str,
    ) -> Result<Option<MaskingMapping>> {
        self.fetch(category, original_value).await
    }

    async fn search(&self, filter: &MappingFilter) -> Result<SearchResults<MaskingMapping>> {
        filter.validate().map_err(Error::MappingStore)?;

        let mut conditions: Vec<&str> = Vec::new();
        if filter.category.is_some() {
            conditions.push("category = ?");
        }
        if filter.query.is_some() {
            conditions.push("(original_value LIKE ? ESCAPE '\\' OR masked_value LIKE ? ESCAPE '\\')");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let like_pattern = filter
            .query
            .as_deref()
            .map(|q| format!("%{}%", escape_like(q)));

        let count_sql = format!("SELECT COUNT(*) FROM mappings{where_clause}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(category) = &filter.category {
            count_query = count_query.bind(category.as_str().to_string());
        }
        if let Some(pattern) = &like_pattern {
            count_query = count_query.bind(pattern.clone()).bind(pattern.clone());
        }
        let total_count = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let select_sql = format!(
            "SELECT id, category, original_value, masked_value, created_at FROM mappings{}{} LIMIT ? OFFSET ?",
            where_clause,
            order_by_clause(filter.sort, filter.direction),
        );
        let mut select_query = sqlx::query_as::<_, MappingRow>(&select_sql);
        if let Some(category) = &filter.category {
            select_query = select_query.bind(category.as_str().to_string());
        }
        if let Some(pattern) = &like_pattern {
            select_query = select_query.bind(pattern.clone()).bind(pattern.clone());
        }
        let rows = select_query
            .bind(filter.limit as i64)
            .bind(filter.offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let items = rows
            .into_iter()
            .map(MaskingMapping::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(SearchResults::new(
            items,
            total_count as u64,
            filter.limit,
            filter.offset,
        ))
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mappings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count as u64)
    }

    async fn purge(&self, older_than: Option<DateTime<Utc>>) -> Result<u64> {
        let result = match older_than {
            Some(cutoff) => sqlx::query("DELETE FROM mappings WHERE created_at < ?")
                .bind(cutoff)
                .execute(&self.pool)
                .await,
            None => sqlx::query("DELETE FROM mappings").execute(&self.pool).await,
        }
        .map_err(|e| Error::Database(e.to_string()))?;

        let purged = result.rows_affected();
        tracing::info!(purged, "purged mappings from SQLite store");
        Ok(purged)
    }
}

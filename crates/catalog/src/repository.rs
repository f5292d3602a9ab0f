//! Record store for provisional and final catalog entries

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::sync::RwLock;
use tracing::debug;

use crate::normalizer::{FinalRecord, ProvisionalRecord};
use crate::{CatalogError, Result};

/// Field a catalog filter can target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Year,
    Genre,
    Director,
    Actor,
    Rating,
    Plot,
}

impl FilterField {
    /// Column holding the field in `catalog_titles`
    pub fn column(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Genre => "genre",
            Self::Director => "director",
            Self::Actor => "actors",
            Self::Rating => "rating_value",
            Self::Plot => "plot",
        }
    }

    pub fn value_of<'a>(&self, record: &'a FinalRecord) -> &'a str {
        match self {
            Self::Year => &record.year,
            Self::Genre => &record.genre,
            Self::Director => &record.director,
            Self::Actor => &record.actors,
            Self::Rating => &record.rating_value,
            Self::Plot => &record.plot,
        }
    }
}

/// Conjunctive, case-insensitive substring filters over final records
///
/// Absent or blank filters are left out of the query entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldFilters {
    pub year: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub actor: Option<String>,
    pub rating: Option<String>,
    pub plot: Option<String>,
}

impl FieldFilters {
    /// Present filters paired with the field they target
    pub fn clauses(&self) -> Vec<(FilterField, &str)> {
        [
            (FilterField::Year, &self.year),
            (FilterField::Genre, &self.genre),
            (FilterField::Director, &self.director),
            (FilterField::Actor, &self.actor),
            (FilterField::Rating, &self.rating),
            (FilterField::Plot, &self.plot),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (field, v))
        })
        .collect()
    }

    pub fn matches(&self, record: &FinalRecord) -> bool {
        self.clauses().iter().all(|(field, needle)| {
            field
                .value_of(record)
                .to_lowercase()
                .contains(&needle.to_lowercase())
        })
    }
}

/// Storage for the two record phases
///
/// The store does not serialize concurrent writers; duplicate final records
/// are kept out by the unique `external_id` rule each implementation enforces.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stage a provisional record (duplicates are allowed)
    async fn insert_provisional(&self, record: &ProvisionalRecord) -> Result<()>;

    /// Remove every provisional record for `external_id`, returning how many went
    async fn delete_provisional(&self, external_id: &str) -> Result<u64>;

    async fn find_final(&self, external_id: &str) -> Result<Vec<FinalRecord>>;

    async fn find_all_final(&self) -> Result<Vec<FinalRecord>>;

    /// Insert a final record unless one already exists for its `external_id`
    ///
    /// Returns `false` when the record was already present.
    async fn insert_final(&self, record: &FinalRecord) -> Result<bool>;

    async fn filter_final(&self, filters: &FieldFilters) -> Result<Vec<FinalRecord>>;

    /// Insert the final record, then drop its provisional records
    ///
    /// The insert runs first, so a failed delete leaves stale provisional
    /// records behind rather than losing the final record. Stores with
    /// transactions override this to commit both steps as one unit.
    async fn commit_promotion(&self, record: &FinalRecord) -> Result<bool> {
        let inserted = self.insert_final(record).await?;
        let removed = self.delete_provisional(&record.external_id).await?;

        debug!(
            external_id = %record.external_id,
            inserted,
            removed,
            "Committed promotion"
        );
        Ok(inserted)
    }
}

/// Escape `%`, `_` and `\` so user input is matched literally by ILIKE
fn like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

const FINAL_COLUMNS: &str = "title, translated_title, poster_url, external_id, year, genre, \
                             director, actors, rating_value, plot, videos";

/// PostgreSQL implementation of RecordStore
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))
    }

    async fn insert_final_with<'e, E>(executor: E, record: &FinalRecord) -> Result<bool>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO catalog_titles (
                title, translated_title, poster_url, external_id, year, genre,
                director, actors, rating_value, plot, videos
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (external_id) DO NOTHING
            "#,
        )
        .bind(&record.title)
        .bind(&record.translated_title)
        .bind(&record.poster_url)
        .bind(&record.external_id)
        .bind(&record.year)
        .bind(&record.genre)
        .bind(&record.director)
        .bind(&record.actors)
        .bind(&record.rating_value)
        .bind(&record.plot)
        .bind(&record.videos)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn insert_provisional(&self, record: &ProvisionalRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO provisional_titles (title, media_type, external_id, rich_provider_id, videos)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&record.title)
        .bind(record.media_type.as_str())
        .bind(&record.external_id)
        .bind(&record.rich_provider_id)
        .bind(&record.videos)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_provisional(&self, external_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM provisional_titles WHERE external_id = $1")
            .bind(external_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_final(&self, external_id: &str) -> Result<Vec<FinalRecord>> {
        let query = format!(
            "SELECT {} FROM catalog_titles WHERE external_id = $1 ORDER BY id",
            FINAL_COLUMNS
        );
        Ok(sqlx::query_as(&query)
            .bind(external_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_all_final(&self) -> Result<Vec<FinalRecord>> {
        let query = format!("SELECT {} FROM catalog_titles ORDER BY id", FINAL_COLUMNS);
        Ok(sqlx::query_as(&query).fetch_all(&self.pool).await?)
    }

    async fn insert_final(&self, record: &FinalRecord) -> Result<bool> {
        Self::insert_final_with(&self.pool, record).await
    }

    async fn filter_final(&self, filters: &FieldFilters) -> Result<Vec<FinalRecord>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM catalog_titles WHERE TRUE",
            FINAL_COLUMNS
        ));

        for (field, value) in filters.clauses() {
            builder
                .push(format!(" AND {} ILIKE ", field.column()))
                .push_bind(like_pattern(value));
        }
        builder.push(" ORDER BY id");

        Ok(builder
            .build_query_as::<FinalRecord>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn commit_promotion(&self, record: &FinalRecord) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let inserted = Self::insert_final_with(&mut *tx, record).await?;

        let removed = sqlx::query("DELETE FROM provisional_titles WHERE external_id = $1")
            .bind(&record.external_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        debug!(
            external_id = %record.external_id,
            inserted,
            removed,
            "Committed promotion"
        );
        Ok(inserted)
    }
}

#[derive(Debug, Default)]
struct InMemoryState {
    provisional: Vec<ProvisionalRecord>,
    finals: Vec<FinalRecord>,
}

/// In-memory RecordStore for development and tests
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    state: RwLock<InMemoryState>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with final records
    pub fn with_final_records(records: Vec<FinalRecord>) -> Self {
        Self {
            state: RwLock::new(InMemoryState {
                provisional: Vec::new(),
                finals: records,
            }),
        }
    }

    pub async fn provisional_count(&self) -> usize {
        self.state.read().await.provisional.len()
    }

    pub async fn final_count(&self) -> usize {
        self.state.read().await.finals.len()
    }
}

fn insert_unique(finals: &mut Vec<FinalRecord>, record: &FinalRecord) -> bool {
    if finals.iter().any(|r| r.external_id == record.external_id) {
        return false;
    }
    finals.push(record.clone());
    true
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert_provisional(&self, record: &ProvisionalRecord) -> Result<()> {
        self.state.write().await.provisional.push(record.clone());
        Ok(())
    }

    async fn delete_provisional(&self, external_id: &str) -> Result<u64> {
        let mut state = self.state.write().await;
        let before = state.provisional.len();
        state.provisional.retain(|r| r.external_id != external_id);
        Ok((before - state.provisional.len()) as u64)
    }

    async fn find_final(&self, external_id: &str) -> Result<Vec<FinalRecord>> {
        Ok(self
            .state
            .read()
            .await
            .finals
            .iter()
            .filter(|r| r.external_id == external_id)
            .cloned()
            .collect())
    }

    async fn find_all_final(&self) -> Result<Vec<FinalRecord>> {
        Ok(self.state.read().await.finals.clone())
    }

    async fn insert_final(&self, record: &FinalRecord) -> Result<bool> {
        Ok(insert_unique(&mut self.state.write().await.finals, record))
    }

    async fn filter_final(&self, filters: &FieldFilters) -> Result<Vec<FinalRecord>> {
        Ok(self
            .state
            .read()
            .await
            .finals
            .iter()
            .filter(|r| filters.matches(r))
            .cloned()
            .collect())
    }

}

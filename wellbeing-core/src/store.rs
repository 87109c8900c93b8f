//! Record Store: the append-only table of survey responses.
//!
//! `SurveyStore` is a cheap-to-clone handle over the connection pool. There is
//! no update or delete path; rows are created once and only read afterwards.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::WellbeingError;
use crate::models::{RecordId, Ratings, SurveyResponse};

/// Ordering of list queries by creation time (ties broken by id).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrder {
    /// Oldest first, as consumed by charts.
    Chronological,
    /// Newest first, as consumed by raw feeds.
    ReverseChronological,
}

impl RecordOrder {
    fn sql(&self) -> &'static str {
        match self {
            Self::Chronological => "created_at ASC, id ASC",
            Self::ReverseChronological => "created_at DESC, id DESC",
        }
    }
}

/// Raw per-field means over the whole table, `None` when the table is empty.
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct FieldAverages {
    pub stress: Option<f64>,
    pub workload: Option<f64>,
    pub satisfaction: Option<f64>,
    pub count: i64,
}

const COLUMNS: &str = "id, created_at, stress, workload, satisfaction, notes";

#[derive(Debug, Clone)]
pub struct SurveyStore {
    pool: SqlitePool,
}

impl SurveyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Validate and persist one response. Nothing is written if any rating is
    /// outside 1-10.
    pub async fn insert(
        &self,
        stress: i64,
        workload: i64,
        satisfaction: i64,
        notes: Option<&str>,
    ) -> Result<RecordId, WellbeingError> {
        let ratings = Ratings::new(stress, workload, satisfaction)?;
        self.insert_ratings(ratings, notes).await
    }

    pub async fn insert_ratings(
        &self,
        ratings: Ratings,
        notes: Option<&str>,
    ) -> Result<RecordId, WellbeingError> {
        let created_at = storage_timestamp(Utc::now());

        let result = sqlx::query(
            r#"
            INSERT INTO survey_responses (created_at, stress, workload, satisfaction, notes)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(created_at)
        .bind(ratings.stress())
        .bind(ratings.workload())
        .bind(ratings.satisfaction())
        .bind(notes.unwrap_or(""))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, "Inserted survey response");
        Ok(id)
    }

    /// The `limit` most recent responses, returned in `order`.
    pub async fn list_recent(
        &self,
        limit: u32,
        order: RecordOrder,
    ) -> Result<Vec<SurveyResponse>, WellbeingError> {
        // The window is always the newest rows; `order` only decides how it is returned.
        let sql = format!(
            "SELECT {cols} FROM (SELECT {cols} FROM survey_responses ORDER BY {newest} LIMIT ?) ORDER BY {order}",
            cols = COLUMNS,
            newest = RecordOrder::ReverseChronological.sql(),
            order = order.sql(),
        );

        let rows = sqlx::query_as::<_, SurveyResponse>(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_all(&self, order: RecordOrder) -> Result<Vec<SurveyResponse>, WellbeingError> {
        let sql = format!(
            "SELECT {} FROM survey_responses ORDER BY {}",
            COLUMNS,
            order.sql()
        );

        let rows = sqlx::query_as::<_, SurveyResponse>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64, WellbeingError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM survey_responses")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    pub async fn averages(&self) -> Result<FieldAverages, WellbeingError> {
        let averages = sqlx::query_as::<_, FieldAverages>(
            r#"
            SELECT
                AVG(stress)       AS stress,
                AVG(workload)     AS workload,
                AVG(satisfaction) AS satisfaction,
                COUNT(*)          AS count
            FROM survey_responses
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(averages)
    }
}

/// Fixed-width UTC text (microsecond precision) so `created_at` sorts lexically.
fn storage_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

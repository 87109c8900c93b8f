use std::str::FromStr;

use crate::config::DatabaseConfig;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS survey_responses (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at   TEXT    NOT NULL,
        stress       INTEGER NOT NULL CHECK (stress BETWEEN 1 AND 10),
        workload     INTEGER NOT NULL CHECK (workload BETWEEN 1 AND 10),
        satisfaction INTEGER NOT NULL CHECK (satisfaction BETWEEN 1 AND 10),
        notes        TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_survey_responses_created_at ON survey_responses (created_at)",
];

pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

    // Every connection to `:memory:` opens its own empty database, and closing
    // the last one discards it: pin a single connection for the pool's lifetime.
    let pool_options = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections.max(1))
    };

    pool_options.connect_with(options).await
}

/// Create the survey table and its `created_at` index if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

pub async fn health_check(pool: &SqlitePool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT sqlite_version()")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

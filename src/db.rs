//! Database connection management for the leaderboard pipeline.
//!
//! Opens the embedded SQLite database file inside the data directory and
//! runs migrations. The single connection is shared by every stage of a run;
//! all writes funnel through it, which serializes mutation ordering.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::time::sleep;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {source}")]
    ConnectionFailed {
        #[from]
        source: sea_orm::DbErr,
    },
    #[error("Invalid database path: {message}")]
    InvalidPath { message: String },
}

/// File name of the embedded database inside the data directory.
pub const DB_FILE_NAME: &str = "leaderboard.db";

/// Open (creating if needed) the embedded database for a data directory and
/// bring the schema up to date.
///
/// Retries transient connection errors with exponential backoff.
pub async fn init_db(data_dir: &Path) -> Result<DatabaseConnection> {
    let db_path = data_dir.join(DB_FILE_NAME);
    let Some(path_str) = db_path.to_str() else {
        return Err(DatabaseError::InvalidPath {
            message: format!("{} is not valid UTF-8", db_path.display()),
        }
        .into());
    };

    let conn = connect(&format!("sqlite://{path_str}?mode=rwc")).await?;
    Migrator::up(&conn, None).await?;
    Ok(conn)
}

/// Open an in-memory database with the full schema. Test and dry-run helper.
pub async fn init_in_memory() -> Result<DatabaseConnection> {
    let conn = connect("sqlite::memory:").await?;
    Migrator::up(&conn, None).await?;
    Ok(conn)
}

async fn connect(url: &str) -> Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(url);
    opt.max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let max_retries = 3;
    let mut retry_delay = Duration::from_millis(100);

    for attempt in 1..=max_retries {
        match Database::connect(opt.clone()).await {
            Ok(conn) => {
                tracing::debug!("connected to database (attempt {attempt})");
                return Ok(conn);
            }
            Err(e) => {
                if attempt == max_retries {
                    tracing::error!("failed to connect to database after {max_retries} attempts: {e}");
                    return Err(DatabaseError::ConnectionFailed { source: e }.into());
                }
                tracing::warn!(
                    "database connection attempt {attempt} failed: {e}, retrying in {retry_delay:?}"
                );
                sleep(retry_delay).await;
                retry_delay *= 2;
            }
        }
    }

    unreachable!("retry loop returns on final attempt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Statement};

    #[tokio::test]
    async fn in_memory_db_has_schema() {
        let db = init_in_memory().await.unwrap();

        let stmt = Statement::from_string(
            db.get_database_backend(),
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name".to_string(),
        );
        let rows = db.query_all(stmt).await.unwrap();
        let tables: Vec<String> = rows
            .iter()
            .map(|r| r.try_get::<String>("", "name").unwrap())
            .collect();

        for expected in [
            "activities",
            "activity_definitions",
            "badge_definitions",
            "contributor_aggregate_definitions",
            "contributor_aggregates",
            "contributor_badges",
            "contributors",
            "global_aggregates",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing {expected}");
        }
    }

    #[tokio::test]
    async fn file_db_is_created_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let _db = init_db(dir.path()).await.unwrap();
        assert!(dir.path().join(DB_FILE_NAME).exists());
    }
}

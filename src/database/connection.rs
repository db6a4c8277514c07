use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, Sqlite, SqliteConnection};
use tracing::{debug, instrument};

use crate::env::Config;
use crate::error::AppError;

/// Opens a single connection for one operation. The rollback journal keeps
/// the whole database in one file so backups can copy it as-is.
#[instrument]
pub async fn open_connection(
    path: &Path,
    create_if_missing: bool,
) -> Result<SqliteConnection, AppError> {
    debug!("Opening database connection");
    let conn = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create_if_missing)
        .journal_mode(SqliteJournalMode::Delete)
        .foreign_keys(true)
        .connect()
        .await?;

    Ok(conn)
}

pub async fn open_existing(config: &Config) -> Result<SqliteConnection, AppError> {
    if !config.database_exists() {
        return Err(AppError::DatabaseMissing(config.database_path.clone()));
    }

    open_connection(&config.database_path, false).await
}

pub async fn count_rows(
    executor: impl sqlx::Executor<'_, Database = Sqlite>,
    table: &str,
) -> Result<i64, sqlx::Error> {
    let sql = format!(r#"SELECT COUNT(*) FROM "{}""#, table);
    sqlx::query_scalar::<_, i64>(&sql).fetch_one(executor).await
}

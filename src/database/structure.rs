use sqlx::Connection;
use tracing::{info, instrument, warn};

use super::{BatchReport, Schema, TableOutcome, open_connection};
use crate::env::Config;
use crate::error::AppError;

/// Creates every missing table, referenced tables first. A statement that
/// fails is recorded and the remaining tables are still attempted.
#[instrument(skip_all, fields(path = %config.database_path.display()))]
pub async fn create_database_structure(
    config: &Config,
    schema: &Schema,
) -> Result<BatchReport, AppError> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let mut conn = open_connection(&config.database_path, true).await?;
    let mut tx = conn.begin().await?;
    let mut report = BatchReport::default();

    for table in schema.creation_order() {
        let outcome = match sqlx::query(table.create_sql).execute(&mut *tx).await {
            Ok(_) => TableOutcome::Created,
            Err(e) => TableOutcome::Failed(e.to_string()),
        };
        report.record(table.name, outcome);
    }

    tx.commit().await?;
    conn.close().await?;

    if report.is_success() {
        info!("All {} tables created", schema.table_count());
    } else {
        warn!("Created {}/{} tables", report.succeeded(), schema.table_count());
    }

    Ok(report)
}

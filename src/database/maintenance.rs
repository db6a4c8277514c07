use sqlx::{Connection, SqliteConnection};
use tracing::instrument;

use super::{BatchReport, Schema, TableDef, TableOutcome, count_rows, open_existing};
use crate::env::Config;
use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
enum Teardown {
    Drop,
    Truncate,
}

impl Teardown {
    fn statement(self, table: &TableDef) -> String {
        match self {
            Teardown::Drop => format!(r#"DROP TABLE IF EXISTS "{}""#, table.name),
            Teardown::Truncate => format!(r#"DELETE FROM "{}""#, table.name),
        }
    }

    fn outcome(self, rows_affected: u64) -> TableOutcome {
        match self {
            Teardown::Drop => TableOutcome::Dropped,
            Teardown::Truncate => TableOutcome::Truncated(rows_affected),
        }
    }
}

#[instrument(skip_all)]
pub async fn drop_tables(config: &Config, schema: &Schema) -> Result<BatchReport, AppError> {
    let mut conn = open_existing(config).await?;
    let report = without_foreign_keys(&mut conn, schema, Teardown::Drop).await?;
    conn.close().await?;
    Ok(report)
}

/// Empties every table but keeps its definition.
#[instrument(skip_all)]
pub async fn truncate_tables(config: &Config, schema: &Schema) -> Result<BatchReport, AppError> {
    let mut conn = open_existing(config).await?;
    let report = without_foreign_keys(&mut conn, schema, Teardown::Truncate).await?;
    conn.close().await?;
    Ok(report)
}

/// Forgets the stored auto-increment counter of every table, so the next
/// insert starts again from 1. Tables without a counter are untouched.
#[instrument(skip_all)]
pub async fn reset_auto_increment(
    config: &Config,
    schema: &Schema,
) -> Result<BatchReport, AppError> {
    let mut conn = open_existing(config).await?;
    let mut tx = conn.begin().await?;
    let mut report = BatchReport::default();

    for table in schema.creation_order() {
        let outcome = match sqlx::query("DELETE FROM sqlite_sequence WHERE name = ?")
            .bind(table.name)
            .execute(&mut *tx)
            .await
        {
            Ok(_) => TableOutcome::SequenceReset,
            Err(e) => TableOutcome::Failed(e.to_string()),
        };
        report.record(table.name, outcome);
    }

    tx.commit().await?;
    conn.close().await?;
    Ok(report)
}

/// Read-only. A table that cannot be counted is reported inline.
#[instrument(skip_all)]
pub async fn count_records(config: &Config, schema: &Schema) -> Result<BatchReport, AppError> {
    let mut conn = open_existing(config).await?;
    let mut report = BatchReport::default();

    for table in schema.creation_order() {
        let outcome = match count_rows(&mut conn, table.name).await {
            Ok(count) => TableOutcome::Counted(count),
            Err(e) => TableOutcome::Failed(e.to_string()),
        };
        report.record(table.name, outcome);
    }

    conn.close().await?;
    Ok(report)
}

/// Runs the teardown statement on every table, referencing tables first,
/// inside a transaction with foreign key enforcement switched off. The
/// pragma is a no-op inside a transaction, so it brackets the transaction.
async fn without_foreign_keys(
    conn: &mut SqliteConnection,
    schema: &Schema,
    teardown: Teardown,
) -> Result<BatchReport, AppError> {
    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(&mut *conn)
        .await?;

    let mut tx = conn.begin().await?;
    let mut report = BatchReport::default();

    for table in schema.teardown_order() {
        let sql = teardown.statement(table);
        let outcome = match sqlx::query(&sql).execute(&mut *tx).await {
            Ok(result) => teardown.outcome(result.rows_affected()),
            Err(e) => TableOutcome::Failed(e.to_string()),
        };
        report.record(table.name, outcome);
    }

    tx.commit().await?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;

    Ok(report)
}

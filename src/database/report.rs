use std::fmt;

use tracing::{error, info};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum TableOutcome {
    Created,
    Inserted(u64),
    Skipped { existing: i64 },
    Dropped,
    Truncated(u64),
    SequenceReset,
    Counted(i64),
    Failed(String),
}

impl TableOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, TableOutcome::Failed(_))
    }
}

impl fmt::Display for TableOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableOutcome::Created => write!(f, "created"),
            TableOutcome::Inserted(rows) => write!(f, "inserted {} rows", rows),
            TableOutcome::Skipped { existing } => {
                write!(f, "already holds {} rows, skipped", existing)
            }
            TableOutcome::Dropped => write!(f, "dropped"),
            TableOutcome::Truncated(rows) => write!(f, "emptied ({} rows deleted)", rows),
            TableOutcome::SequenceReset => write!(f, "auto-increment counter reset"),
            TableOutcome::Counted(rows) => write!(f, "{} records", rows),
            TableOutcome::Failed(message) => write!(f, "error - {}", message),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableReport {
    pub table: &'static str,
    pub outcome: TableOutcome,
}

/// Per-table results of an operation that walks the table list. A failed
/// table never stops the walk; it only clears the aggregate flag.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub tables: Vec<TableReport>,
}

impl BatchReport {
    pub fn record(&mut self, table: &'static str, outcome: TableOutcome) {
        match &outcome {
            TableOutcome::Failed(message) => error!(table, error = %message, "Table step failed"),
            other => info!(table, outcome = %other, "Table step done"),
        }
        self.tables.push(TableReport { table, outcome });
    }

    pub fn record_result(&mut self, table: &'static str, result: Result<TableOutcome, AppError>) {
        let outcome = result.unwrap_or_else(|e| TableOutcome::Failed(e.to_string()));
        self.record(table, outcome);
    }

    pub fn is_success(&self) -> bool {
        !self.tables.iter().any(|t| t.outcome.is_failure())
    }

    pub fn succeeded(&self) -> usize {
        self.tables
            .iter()
            .filter(|t| !t.outcome.is_failure())
            .count()
    }

    #[cfg(test)]
    pub fn outcome(&self, table: &str) -> Option<&TableOutcome> {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .map(|t| &t.outcome)
    }
}

use std::path::PathBuf;

use thiserror::Error;
use tracing::{Span, error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database not found at {}. Create the database structure first.", .0.display())]
    DatabaseMissing(PathBuf),

    #[error("Backup directory not found: {}", .0.display())]
    BackupDirMissing(PathBuf),

    #[error("No backups found in {}", .0.display())]
    NoBackups(PathBuf),

    #[error("Invalid selection: {0}")]
    Selection(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn log_and_record(&self, ctx: &str) {
        let current_span = Span::current();
        let is_valid_span = !current_span.is_none();

        let message = self.to_string();
        let error_kind = match self {
            AppError::Database(err) => {
                error!(error = %message, context = %ctx, db_error = %err, "Database error");
                "database_error"
            }
            AppError::Io(err) => {
                error!(error = %message, context = %ctx, io_error = %err, "I/O error");
                "io_error"
            }
            AppError::DatabaseMissing(path) => {
                warn!(path = %path.display(), context = %ctx, "Database file missing");
                "precondition_error"
            }
            AppError::BackupDirMissing(path) | AppError::NoBackups(path) => {
                warn!(path = %path.display(), context = %ctx, "No backup available");
                "precondition_error"
            }
            AppError::Selection(msg) | AppError::InvalidInput(msg) => {
                warn!(message = %msg, context = %ctx, "Input error");
                "input_error"
            }
            AppError::Schema(msg) => {
                error!(message = %msg, context = %ctx, "Schema definition error");
                "schema_error"
            }
            AppError::Internal(msg) => {
                error!(message = %msg, context = %ctx, "Internal error");
                "internal_error"
            }
        };

        if is_valid_span {
            current_span.record("error", tracing::field::display(true));
            current_span.record("error.type", tracing::field::display(error_kind));
            current_span.record("error.message", tracing::field::display(&message));
        }
    }

    /// Precondition and input errors leave the database untouched.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseMissing(_)
                | AppError::BackupDirMissing(_)
                | AppError::NoBackups(_)
                | AppError::Selection(_)
                | AppError::InvalidInput(_)
        )
    }
}

impl From<scrypt::errors::InvalidParams> for AppError {
    fn from(error: scrypt::errors::InvalidParams) -> Self {
        AppError::Internal(format!("Password hashing error: {}", error))
    }
}

impl From<scrypt::errors::InvalidOutputLen> for AppError {
    fn from(error: scrypt::errors::InvalidOutputLen) -> Self {
        AppError::Internal(format!("Password hashing error: {}", error))
    }
}

impl From<dotenvy::Error> for AppError {
    fn from(error: dotenvy::Error) -> Self {
        AppError::Internal(format!("Environment file error: {}", error))
    }
}

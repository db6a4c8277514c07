use std::path::PathBuf;

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, instrument};

use crate::env::Config;
use crate::error::AppError;

pub const BACKUP_PREFIX: &str = "sonosphere_backup_";
pub const PRE_RESTORE_PREFIX: &str = "pre_restore_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

static BACKUP_FILE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{}.+\.db$", regex::escape(BACKUP_PREFIX)))
        .expect("valid backup name regex")
});

/// `<prefix><YYYYMMDD_HHMMSS>.db`, local time. Two copies taken within the
/// same second share a name.
pub fn stamped_file_name(prefix: &str, at: DateTime<Local>) -> String {
    format!("{}{}.db", prefix, at.format(TIMESTAMP_FORMAT))
}

pub fn is_backup_file_name(name: &str) -> bool {
    BACKUP_FILE_NAME.is_match(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub file_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored_from: BackupEntry,
    pub safety_copy: Option<PathBuf>,
}

/// Copies the live database file, byte for byte, into the backup directory.
#[instrument(skip_all, fields(path = %config.database_path.display()))]
pub async fn backup_database(config: &Config) -> Result<PathBuf, AppError> {
    if !config.database_exists() {
        return Err(AppError::DatabaseMissing(config.database_path.clone()));
    }

    tokio::fs::create_dir_all(&config.backup_dir).await?;

    let backup_path = config
        .backup_dir
        .join(stamped_file_name(BACKUP_PREFIX, Local::now()));
    tokio::fs::copy(&config.database_path, &backup_path).await?;

    info!(backup = %backup_path.display(), "Backup created");
    Ok(backup_path)
}

/// Backups in the backup directory, oldest first. Safety copies taken before
/// a restore are not listed.
pub async fn list_backups(config: &Config) -> Result<Vec<BackupEntry>, AppError> {
    if !config.backup_dir.is_dir() {
        return Err(AppError::BackupDirMissing(config.backup_dir.clone()));
    }

    let mut entries = tokio::fs::read_dir(&config.backup_dir).await?;
    let mut backups = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if is_backup_file_name(&file_name) {
            backups.push(BackupEntry {
                file_name,
                path: entry.path(),
            });
        }
    }

    if backups.is_empty() {
        return Err(AppError::NoBackups(config.backup_dir.clone()));
    }

    backups.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(backups)
}

/// Turns the answer to the "which backup" prompt into an index into the
/// listing. `0` cancels and yields `None`.
pub fn parse_backup_choice(input: &str, available: usize) -> Result<Option<usize>, AppError> {
    let choice: i64 = input
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("'{}' is not a number", input.trim())))?;

    match usize::try_from(choice) {
        Ok(0) => Ok(None),
        Ok(n) if n <= available => Ok(Some(n - 1)),
        _ => Err(AppError::Selection(format!(
            "{} is not between 1 and {}",
            choice, available
        ))),
    }
}

/// Overwrites the live database with `backup`. An existing live file is
/// first copied aside under the pre-restore prefix.
#[instrument(skip_all, fields(backup = %backup.file_name))]
pub async fn restore_database(
    config: &Config,
    backup: &BackupEntry,
) -> Result<RestoreReport, AppError> {
    let safety_copy = if config.database_exists() {
        tokio::fs::create_dir_all(&config.backup_dir).await?;
        let path = config
            .backup_dir
            .join(stamped_file_name(PRE_RESTORE_PREFIX, Local::now()));
        tokio::fs::copy(&config.database_path, &path).await?;
        info!(safety_copy = %path.display(), "Pre-restore backup created");
        Some(path)
    } else {
        None
    };

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    tokio::fs::copy(&backup.path, &config.database_path).await?;
    info!("Database restored");

    Ok(RestoreReport {
        restored_from: backup.clone(),
        safety_copy,
    })
}

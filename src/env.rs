use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::AppError;

const DB_PATH_VAR: &str = "SONOSPHERE_DB_PATH";
const BACKUP_DIR_VAR: &str = "SONOSPHERE_BACKUP_DIR";
const STATIC_DIR_VAR: &str = "SONOSPHERE_STATIC_DIR";

const DEFAULT_DB_PATH: &str = "db/sonosphere.db";
const DEFAULT_BACKUP_DIR: &str = "db/backup";
const DEFAULT_STATIC_DIR: &str = "static";

pub fn load_environment() -> Result<(), AppError> {
    let env_files = vec!["config/common.env", ".env"];

    for env_file in env_files {
        load_env_file(env_file)?;
    }

    Ok(())
}

fn load_env_file(path: &str) -> Result<(), AppError> {
    if !Path::new(path).exists() {
        warn!("Warning: Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path)?;
    info!("Loaded environment from: {}", path);
    Ok(())
}

/// Filesystem locations the manager works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub backup_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            database_path: path_var(DB_PATH_VAR, DEFAULT_DB_PATH)?,
            backup_dir: path_var(BACKUP_DIR_VAR, DEFAULT_BACKUP_DIR)?,
            static_dir: path_var(STATIC_DIR_VAR, DEFAULT_STATIC_DIR)?,
        })
    }

    /// Lays every location out under `root`, the way the defaults sit under
    /// the working directory.
    #[cfg(test)]
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            database_path: root.join(DEFAULT_DB_PATH),
            backup_dir: root.join(DEFAULT_BACKUP_DIR),
            static_dir: root.join(DEFAULT_STATIC_DIR),
        }
    }

    pub fn database_exists(&self) -> bool {
        self.database_path.is_file()
    }

    pub fn profile_image_dir(&self) -> PathBuf {
        self.static_dir.join("images").join("pfp")
    }
}

fn path_var(name: &str, default: &str) -> Result<PathBuf, AppError> {
    match dotenvy::var(name) {
        Ok(value) if value.trim().is_empty() => Err(AppError::InvalidInput(format!(
            "{} is set but empty",
            name
        ))),
        Ok(value) => Ok(PathBuf::from(value)),
        Err(_) => Ok(PathBuf::from(default)),
    }
}

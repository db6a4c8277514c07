#[cfg(test)]
pub mod test_utils {
    use std::path::Path;
    use std::sync::Once;

    use sqlx::{Row, SqliteConnection};
    use tempfile::TempDir;
    use tracing::level_filters::LevelFilter;

    use crate::database::{
        Schema, count_rows, create_database_structure, hash_with_salt, initialize_default_data,
        open_connection,
    };
    use crate::env::Config;

    static INIT: Once = Once::new();

    /// A throwaway directory laid out like the working directory of the
    /// manager: `db/`, `db/backup/`, `static/`.
    pub struct TestWorkspace {
        dir: TempDir,
        pub config: Config,
        pub schema: Schema,
    }

    impl TestWorkspace {
        pub fn new() -> Self {
            INIT.call_once(|| {
                let _ = tracing_subscriber::fmt()
                    .with_max_level(LevelFilter::DEBUG)
                    .with_test_writer()
                    .try_init();
            });

            let dir = tempfile::tempdir().expect("Failed to create temporary directory");
            let config = Config::rooted_at(dir.path());
            let schema = Schema::festival().expect("Festival schema should resolve");

            Self {
                dir,
                config,
                schema,
            }
        }

        pub async fn with_structure() -> Self {
            let workspace = Self::new();
            let report = create_database_structure(&workspace.config, &workspace.schema)
                .await
                .expect("Failed to create database structure");
            assert!(report.is_success());
            workspace
        }

        pub async fn seeded() -> Self {
            let workspace = Self::with_structure().await;
            let report = initialize_default_data(&workspace.config)
                .await
                .expect("Failed to seed default data");
            assert!(report.is_success());
            workspace
        }

        pub fn root(&self) -> &Path {
            self.dir.path()
        }

        pub async fn connect(&self) -> SqliteConnection {
            open_connection(&self.config.database_path, false)
                .await
                .expect("Failed to open test database")
        }

        pub async fn count(&self, table: &str) -> Result<i64, sqlx::Error> {
            let mut conn = self.connect().await;
            count_rows(&mut conn, table).await
        }

        pub async fn execute(&self, sql: &str) -> Result<(), sqlx::Error> {
            let mut conn = self.connect().await;
            sqlx::query(sql).execute(&mut conn).await?;
            Ok(())
        }

        pub async fn table_names(&self) -> Vec<String> {
            let mut conn = self.connect().await;
            let rows = sqlx::query(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name != 'sqlite_sequence' ORDER BY name",
            )
            .fetch_all(&mut conn)
            .await
            .expect("Failed to fetch table names");

            rows.into_iter()
                .map(|row| row.get::<String, _>(0))
                .collect()
        }

        pub fn database_bytes(&self) -> Vec<u8> {
            std::fs::read(&self.config.database_path).expect("Failed to read database file")
        }

        pub fn backup_files_with_prefix(&self, prefix: &str) -> Vec<String> {
            let Ok(entries) = std::fs::read_dir(&self.config.backup_dir) else {
                return Vec::new();
            };

            let mut names: Vec<String> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|name| name.starts_with(prefix))
                .collect();
            names.sort();
            names
        }
    }

    /// Splits `scrypt:<n>:<r>:<p>$<salt>$<hex>` and hashes `password` again
    /// with the stored salt and parameters.
    pub fn rehash(password: &str, stored: &str) -> String {
        let mut parts = stored.split('$');
        let method = parts.next().unwrap();
        let salt = parts.next().unwrap();
        assert!(parts.next().is_some());

        let params: Vec<u64> = method
            .strip_prefix("scrypt:")
            .expect("hash should use the scrypt method")
            .split(':')
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(params.len(), 3);
        assert!(params[0].is_power_of_two());

        hash_with_salt(
            password,
            salt,
            params[0].trailing_zeros() as u8,
            params[1] as u32,
            params[2] as u32,
        )
        .unwrap()
    }
}

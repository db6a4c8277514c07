use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::backup::{backup_database, list_backups, parse_backup_choice, restore_database};
use crate::database::{
    BatchReport, Schema, UserSeedOutcome, count_records, create_database_structure,
    drop_tables, initialize_default_data, initialize_default_users, reset_auto_increment,
    truncate_tables,
};
use crate::env::Config;
use crate::error::AppError;

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CreateStructure,
    SeedData,
    SeedUsers,
    DropTables,
    TruncateTables,
    ResetAutoIncrement,
    CountRecords,
    Backup,
    Restore,
    FullInitialization,
    Exit,
}

impl Command {
    /// Menu order.
    pub const ALL: [Command; 11] = [
        Command::CreateStructure,
        Command::SeedData,
        Command::SeedUsers,
        Command::DropTables,
        Command::TruncateTables,
        Command::ResetAutoIncrement,
        Command::CountRecords,
        Command::Backup,
        Command::Restore,
        Command::FullInitialization,
        Command::Exit,
    ];

    pub fn number(self) -> u8 {
        match self {
            Command::Exit => 0,
            Command::CreateStructure => 1,
            Command::SeedData => 2,
            Command::SeedUsers => 3,
            Command::DropTables => 4,
            Command::TruncateTables => 5,
            Command::ResetAutoIncrement => 6,
            Command::CountRecords => 7,
            Command::Backup => 8,
            Command::Restore => 9,
            Command::FullInitialization => 10,
        }
    }

    /// Matches the typed line exactly: `07`, `+7` or ` 7` are not commands.
    pub fn from_input(input: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.number().to_string() == input)
    }

    pub fn label(self) -> &'static str {
        match self {
            Command::CreateStructure => "Create database structure (tables)",
            Command::SeedData => "Populate database with default data",
            Command::SeedUsers => "Create default users",
            Command::DropTables => "Drop all tables",
            Command::TruncateTables => "Empty all tables (keep structure)",
            Command::ResetAutoIncrement => "Reset auto-increment counters",
            Command::CountRecords => "Show record counts",
            Command::Backup => "Back up the database",
            Command::Restore => "Restore the database from a backup",
            Command::FullInitialization => "Full initialization (create + populate + users)",
            Command::Exit => "Exit",
        }
    }

    /// Warning shown before destructive commands, which run only after an
    /// explicit yes.
    pub fn confirmation(self) -> Option<&'static str> {
        match self {
            Command::DropTables => {
                Some("WARNING: this operation deletes every table and all of its data.")
            }
            Command::TruncateTables => Some("WARNING: this operation empties every table."),
            _ => None,
        }
    }
}

pub fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// How a console session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Finished,
    Interrupted,
}

/// Interactive menu loop over any line-based input and output.
pub struct Console<R, W> {
    input: R,
    output: W,
    config: Config,
    schema: Schema,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W, config: Config, schema: Schema) -> Self {
        Self {
            input,
            output,
            config,
            schema,
        }
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Runs until the exit command or the end of input. Only failures of the
    /// console itself are returned; failed operations are reported and the
    /// menu comes back.
    pub async fn run(&mut self) -> Result<(), AppError> {
        loop {
            self.print_menu().await?;

            let Some(choice) = self.prompt("\nSelect an operation [0-10]: ").await? else {
                self.say("\nExiting. Goodbye!").await?;
                return Ok(());
            };

            match Command::from_input(&choice) {
                Some(Command::Exit) => {
                    self.say("\nExiting. Goodbye!").await?;
                    return Ok(());
                }
                Some(command) => {
                    self.execute(command).await?;
                }
                None => {
                    self.say("\nInvalid choice. Try again.").await?;
                }
            }

            if self.prompt("\nPress ENTER to continue...").await?.is_none() {
                return Ok(());
            }
        }
    }

    /// Runs the session until it ends on its own or `interrupt` resolves,
    /// whichever comes first. An interrupted command is abandoned mid-way.
    pub async fn run_until<F>(&mut self, interrupt: F) -> Result<SessionEnd, AppError>
    where
        F: Future,
    {
        tokio::select! {
            result = self.run() => result.map(|_| SessionEnd::Finished),
            _ = interrupt => Ok(SessionEnd::Interrupted),
        }
    }

    /// Runs one command, asking for confirmation first when it is
    /// destructive. Returns whether the command succeeded.
    pub async fn execute(&mut self, command: Command) -> Result<bool, AppError> {
        info!(command = ?command, "Running menu command");

        if let Some(warning) = command.confirmation() {
            let answer = self
                .prompt(&format!("\n{}\nAre you sure you want to continue? (y/n): ", warning))
                .await?;
            if !answer.as_deref().is_some_and(is_confirmation) {
                self.say("Operation cancelled.").await?;
                return Ok(false);
            }
        }

        match command {
            Command::CreateStructure => self.create_structure().await,
            Command::SeedData => self.seed_data().await,
            Command::SeedUsers => self.seed_users().await,
            Command::DropTables => self.drop_all().await,
            Command::TruncateTables => self.truncate_all().await,
            Command::ResetAutoIncrement => self.reset_counters().await,
            Command::CountRecords => self.show_counts().await,
            Command::Backup => self.backup().await,
            Command::Restore => self.restore().await,
            Command::FullInitialization => self.full_initialization().await,
            Command::Exit => Ok(true),
        }
    }

    async fn create_structure(&mut self) -> Result<bool, AppError> {
        self.say("\nCreating database structure...").await?;
        let result = create_database_structure(&self.config, &self.schema).await;
        let total = self.schema.table_count();
        self.finish_batch(
            result,
            "create database structure",
            |report| {
                if report.is_success() {
                    "All tables created successfully!".to_string()
                } else {
                    format!(
                        "Created {}/{} tables. Errors occurred while creating the structure.",
                        report.succeeded(),
                        total
                    )
                }
            },
        )
        .await
    }

    async fn seed_data(&mut self) -> Result<bool, AppError> {
        self.say("\nPopulating database with default data...").await?;
        let result = initialize_default_data(&self.config).await;
        self.finish_batch(result, "populate default data", |report| {
            if report.is_success() {
                "Database populated successfully!".to_string()
            } else {
                "Errors occurred while populating the database.".to_string()
            }
        })
        .await
    }

    async fn seed_users(&mut self) -> Result<bool, AppError> {
        self.say("\nCreating default users...").await?;
        match initialize_default_users(&self.config).await {
            Ok(UserSeedOutcome::Inserted(count)) => {
                self.say(&format!("{} default users created successfully!", count))
                    .await?;
                Ok(true)
            }
            Ok(UserSeedOutcome::Skipped { existing }) => {
                self.say(&format!(
                    "There are already {} users in the database. User creation skipped.",
                    existing
                ))
                .await?;
                Ok(true)
            }
            Err(e) => {
                self.report_failure(e, "create default users").await?;
                self.say("No users were created.").await?;
                Ok(false)
            }
        }
    }

    async fn drop_all(&mut self) -> Result<bool, AppError> {
        let result = drop_tables(&self.config, &self.schema).await;
        self.finish_batch(result, "drop tables", |report| {
            if report.is_success() {
                "All tables dropped successfully!".to_string()
            } else {
                "Errors occurred while dropping the tables.".to_string()
            }
        })
        .await
    }

    async fn truncate_all(&mut self) -> Result<bool, AppError> {
        let result = truncate_tables(&self.config, &self.schema).await;
        self.finish_batch(result, "truncate tables", |report| {
            if report.is_success() {
                "All tables emptied successfully!".to_string()
            } else {
                "Errors occurred while emptying the tables.".to_string()
            }
        })
        .await
    }

    async fn reset_counters(&mut self) -> Result<bool, AppError> {
        let result = reset_auto_increment(&self.config, &self.schema).await;
        self.finish_batch(result, "reset auto-increment", |report| {
            if report.is_success() {
                "Auto-increment counters reset successfully!".to_string()
            } else {
                "Errors occurred while resetting the counters.".to_string()
            }
        })
        .await
    }

    async fn show_counts(&mut self) -> Result<bool, AppError> {
        match count_records(&self.config, &self.schema).await {
            Ok(report) => {
                self.say("\nRecords per table:").await?;
                self.say(&"-".repeat(40)).await?;
                for table in &report.tables {
                    self.say(&format!("{}: {}", table.table, table.outcome))
                        .await?;
                }
                self.say(&"-".repeat(40)).await?;
                Ok(true)
            }
            Err(e) => {
                self.report_failure(e, "count records").await?;
                Ok(false)
            }
        }
    }

    async fn backup(&mut self) -> Result<bool, AppError> {
        match backup_database(&self.config).await {
            Ok(path) => {
                self.say(&format!("Backup created: {}", path.display()))
                    .await?;
                Ok(true)
            }
            Err(e) => {
                self.report_failure(e, "backup").await?;
                self.say("Errors occurred while creating the backup.").await?;
                Ok(false)
            }
        }
    }

    async fn restore(&mut self) -> Result<bool, AppError> {
        let backups = match list_backups(&self.config).await {
            Ok(backups) => backups,
            Err(e) => {
                self.report_failure(e, "restore").await?;
                return self.restore_aborted().await;
            }
        };

        self.say("\nAvailable backups:").await?;
        for (i, backup) in backups.iter().enumerate() {
            self.say(&format!("{}. {}", i + 1, backup.file_name)).await?;
        }

        let Some(answer) = self
            .prompt("\nSelect the backup number to restore (0 to cancel): ")
            .await?
        else {
            return self.restore_aborted().await;
        };

        let selected = match parse_backup_choice(&answer, backups.len()) {
            Ok(Some(index)) => &backups[index],
            Ok(None) => return self.restore_aborted().await,
            Err(e) => {
                self.report_failure(e, "restore").await?;
                return self.restore_aborted().await;
            }
        };

        match restore_database(&self.config, selected).await {
            Ok(report) => {
                if let Some(copy) = &report.safety_copy {
                    self.say(&format!("Pre-restore backup created: {}", copy.display()))
                        .await?;
                }
                self.say(&format!(
                    "Database restored successfully from backup: {}",
                    report.restored_from.file_name
                ))
                .await?;
                Ok(true)
            }
            Err(e) => {
                self.report_failure(e, "restore").await?;
                self.restore_aborted().await
            }
        }
    }

    async fn restore_aborted(&mut self) -> Result<bool, AppError> {
        self.say("Restore cancelled or failed.").await?;
        Ok(false)
    }

    /// Structure, then default data, then users. Stops at the first step
    /// that does not fully succeed.
    async fn full_initialization(&mut self) -> Result<bool, AppError> {
        self.say("\nFull database initialization...").await?;

        self.say("1. Creating structure...").await?;
        let mut success = self.create_structure().await?;

        if success {
            self.say("2. Populating default data...").await?;
            success = self.seed_data().await?;
        }

        if success {
            self.say("3. Creating users...").await?;
            success = self.seed_users().await?;
        }

        if success {
            self.say("\nFull initialization completed successfully!")
                .await?;
        } else {
            self.say("\nFull initialization ran into errors.").await?;
        }

        Ok(success)
    }

    async fn finish_batch(
        &mut self,
        result: Result<BatchReport, AppError>,
        context: &str,
        summary: impl FnOnce(&BatchReport) -> String,
    ) -> Result<bool, AppError> {
        match result {
            Ok(report) => {
                for table in &report.tables {
                    self.say(&format!("  {}: {}", table.table, table.outcome))
                        .await?;
                }
                self.say(&summary(&report)).await?;
                Ok(report.is_success())
            }
            Err(e) => {
                self.report_failure(e, context).await?;
                Ok(false)
            }
        }
    }

    async fn report_failure(&mut self, error: AppError, context: &str) -> Result<(), AppError> {
        error.log_and_record(context);
        if error.is_user_facing() {
            self.say(&error.to_string()).await
        } else {
            self.say(&format!("Error during {}: {}", context, error))
                .await
        }
    }

    async fn print_menu(&mut self) -> Result<(), AppError> {
        let rule = "=".repeat(RULE_WIDTH);
        self.say(&format!("\n{}", rule)).await?;
        self.say(&format!(
            "{:^width$}",
            "SONOSPHERE DATABASE MANAGER",
            width = RULE_WIDTH
        ))
        .await?;
        self.say(&rule).await?;

        self.say("\nAVAILABLE OPERATIONS:").await?;
        for command in Command::ALL {
            self.say(&format!("{}. {}", command.number(), command.label()))
                .await?;
        }

        let status = if self.config.database_exists() {
            "PRESENT"
        } else {
            "NOT PRESENT"
        };
        self.say(&format!("\nDatabase status: {}", status)).await
    }

    async fn say(&mut self, line: &str) -> Result<(), AppError> {
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }

    /// `None` once the input is exhausted.
    async fn prompt(&mut self, message: &str) -> Result<Option<String>, AppError> {
        self.output.write_all(message.as_bytes()).await?;
        self.output.flush().await?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

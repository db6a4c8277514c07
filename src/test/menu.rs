#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::BufReader;

    use crate::backup::{PRE_RESTORE_PREFIX, backup_database};
    use crate::menu::{Command, Console, SessionEnd, is_confirmation};
    use crate::test::utils::test_utils::TestWorkspace;

    fn console<'a>(workspace: &TestWorkspace, script: &'a str) -> Console<&'a [u8], Vec<u8>> {
        Console::new(
            script.as_bytes(),
            Vec::new(),
            workspace.config.clone(),
            workspace.schema.clone(),
        )
    }

    fn transcript(console: &Console<&[u8], Vec<u8>>) -> String {
        String::from_utf8_lossy(console.output()).into_owned()
    }

    #[test]
    fn test_command_numbers_round_trip() {
        for command in Command::ALL {
            let input = command.number().to_string();
            assert_eq!(Command::from_input(&input), Some(command));
        }

        assert_eq!(Command::from_input("7"), Some(Command::CountRecords));
        assert_eq!(Command::from_input(" 7 "), None);
        assert_eq!(Command::from_input("07"), None);
        assert_eq!(Command::from_input("+7"), None);
        assert_eq!(Command::from_input("0"), Some(Command::Exit));
        assert_eq!(Command::from_input("11"), None);
        assert_eq!(Command::from_input("seven"), None);
        assert_eq!(Command::from_input(""), None);
    }

    #[test]
    fn test_only_destructive_commands_ask_for_confirmation() {
        let confirmed: Vec<Command> = Command::ALL
            .into_iter()
            .filter(|c| c.confirmation().is_some())
            .collect();

        assert_eq!(confirmed, vec![Command::DropTables, Command::TruncateTables]);
    }

    #[test]
    fn test_is_confirmation() {
        assert!(is_confirmation("y"));
        assert!(is_confirmation("Y"));
        assert!(is_confirmation(" yes "));
        assert!(!is_confirmation("n"));
        assert!(!is_confirmation(""));
        assert!(!is_confirmation("s"));
    }

    #[tokio::test]
    async fn test_full_initialization_session() {
        let workspace = TestWorkspace::new();
        let mut console = console(&workspace, "10\n\n7\n\n0\n");

        console.run().await.expect("Session should end cleanly");

        let output = transcript(&console);
        assert!(output.contains("SONOSPHERE DATABASE MANAGER"));
        assert!(output.contains("Database status: NOT PRESENT"));
        assert!(output.contains("Database status: PRESENT"));
        assert!(output.contains("Full initialization completed successfully!"));
        assert!(output.contains("genres: 12 records"));
        assert!(output.contains("users: 9 records"));
        assert!(output.contains("Exiting. Goodbye!"));
    }

    #[tokio::test]
    async fn test_padded_choice_is_invalid() {
        let workspace = TestWorkspace::new();
        let mut console = console(&workspace, "01\n\n0\n");

        console.run().await.unwrap();

        let output = transcript(&console);
        assert!(output.contains("Invalid choice. Try again."));
        assert!(!workspace.config.database_exists());
    }

    #[tokio::test]
    async fn test_interrupt_ends_waiting_session() {
        let workspace = TestWorkspace::new();
        // Input that never arrives, like a terminal nobody types into.
        let (idle_input, _keep_open) = tokio::io::duplex(64);
        let mut console = Console::new(
            BufReader::new(idle_input),
            Vec::new(),
            workspace.config.clone(),
            workspace.schema.clone(),
        );

        let end = console
            .run_until(tokio::time::sleep(Duration::from_millis(50)))
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::Interrupted);
        let output = String::from_utf8_lossy(console.output()).into_owned();
        assert!(output.contains("Select an operation [0-10]: "));
        assert!(!output.contains("Exiting. Goodbye!"));
    }

    #[tokio::test]
    async fn test_session_finishes_before_interrupt() {
        let workspace = TestWorkspace::new();
        let mut console = console(&workspace, "0\n");

        let end = console
            .run_until(std::future::pending::<()>())
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::Finished);
        assert!(transcript(&console).contains("Exiting. Goodbye!"));
    }

    #[tokio::test]
    async fn test_end_of_input_exits() {
        let workspace = TestWorkspace::new();
        let mut console = console(&workspace, "");

        console.run().await.unwrap();

        assert!(transcript(&console).contains("Exiting. Goodbye!"));
    }

    #[tokio::test]
    async fn test_invalid_choice_reprompts() {
        let workspace = TestWorkspace::new();
        let mut console = console(&workspace, "42\n\n0\n");

        console.run().await.unwrap();

        let output = transcript(&console);
        assert!(output.contains("Invalid choice. Try again."));
        assert_eq!(output.matches("AVAILABLE OPERATIONS:").count(), 2);
    }

    #[tokio::test]
    async fn test_operation_without_database_reports_and_continues() {
        let workspace = TestWorkspace::new();
        let mut console = console(&workspace, "2\n\n0\n");

        console.run().await.unwrap();

        let output = transcript(&console);
        assert!(output.contains("Database not found"));
        assert!(output.contains("Exiting. Goodbye!"));
        assert!(!workspace.config.database_exists());
    }

    #[tokio::test]
    async fn test_drop_needs_confirmation() {
        let workspace = TestWorkspace::with_structure().await;
        let mut console = console(&workspace, "n\n");

        let done = console.execute(Command::DropTables).await.unwrap();

        assert!(!done);
        assert!(transcript(&console).contains("Operation cancelled."));
        assert_eq!(workspace.table_names().await.len(), 7);
    }

    #[tokio::test]
    async fn test_drop_confirmed() {
        let workspace = TestWorkspace::with_structure().await;
        let mut console = console(&workspace, "y\n");

        let done = console.execute(Command::DropTables).await.unwrap();

        assert!(done);
        assert!(transcript(&console).contains("All tables dropped successfully!"));
        assert!(workspace.table_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_truncate_confirmed() {
        let workspace = TestWorkspace::seeded().await;
        let mut console = console(&workspace, "YES\n");

        let done = console.execute(Command::TruncateTables).await.unwrap();

        assert!(done);
        assert_eq!(workspace.count("genres").await.unwrap(), 0);
        assert_eq!(workspace.table_names().await.len(), 7);
    }

    #[tokio::test]
    async fn test_restore_by_number() {
        let workspace = TestWorkspace::seeded().await;
        backup_database(&workspace.config).await.unwrap();
        let mut console = console(&workspace, "1\n");

        let done = console.execute(Command::Restore).await.unwrap();

        let output = transcript(&console);
        assert!(done);
        assert!(output.contains("Available backups:"));
        assert!(output.contains("1. sonosphere_backup_"));
        assert!(output.contains("Pre-restore backup created"));
        assert!(output.contains("Database restored successfully from backup"));
        assert_eq!(
            workspace.backup_files_with_prefix(PRE_RESTORE_PREFIX).len(),
            1
        );
    }

    #[tokio::test]
    async fn test_restore_rejects_bad_input() {
        let workspace = TestWorkspace::seeded().await;
        backup_database(&workspace.config).await.unwrap();
        let before = workspace.database_bytes();

        for script in ["abc\n", "5\n", "-1\n", "0\n"] {
            let mut console = console(&workspace, script);

            let done = console.execute(Command::Restore).await.unwrap();

            assert!(!done, "{:?} should not restore", script);
            assert!(transcript(&console).contains("Restore cancelled or failed."));
        }

        assert!(workspace.backup_files_with_prefix(PRE_RESTORE_PREFIX).is_empty());
        assert_eq!(workspace.database_bytes(), before);
    }

    #[tokio::test]
    async fn test_restore_without_backups() {
        let workspace = TestWorkspace::seeded().await;
        let mut console = console(&workspace, "");

        let done = console.execute(Command::Restore).await.unwrap();

        assert!(!done);
        assert!(transcript(&console).contains("Backup directory not found"));
    }

    #[tokio::test]
    async fn test_seed_users_skip_message() {
        let workspace = TestWorkspace::seeded().await;
        let mut console = console(&workspace, "");

        assert!(console.execute(Command::SeedUsers).await.unwrap());
        assert!(console.execute(Command::SeedUsers).await.unwrap());

        let output = transcript(&console);
        assert!(output.contains("9 default users created successfully!"));
        assert!(output.contains("There are already 9 users in the database."));
    }
}

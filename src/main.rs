mod backup;
mod database;
mod env;
mod error;
mod menu;
mod telemetry;
#[cfg(test)]
mod test;

use database::Schema;
use env::{Config, load_environment};
use menu::{Console, SessionEnd};
use telemetry::init_tracing;
use tokio::io::BufReader;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    load_environment()?;

    let config = Config::from_env()?;
    let schema = Schema::festival()?;

    info!(
        database = %config.database_path.display(),
        backups = %config.backup_dir.display(),
        tables = ?schema.table_names(),
        "Starting Sonosphere database manager"
    );

    let mut console = Console::new(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        config,
        schema,
    );

    if console.run_until(tokio::signal::ctrl_c()).await? == SessionEnd::Interrupted {
        println!("\n\nOperation interrupted. Exiting.");
        // The pending stdin read would otherwise hold the runtime open.
        std::process::exit(0);
    }

    Ok(())
}

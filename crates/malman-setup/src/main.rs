use anyhow::Result;
use clap::{Parser, Subcommand};

use malman_cli::logging;
use malman_db::{schema, Connection};

#[derive(Parser, Debug)]
#[clap(name = "malman-setup")]
struct Cli {
    #[clap(long, env = "MALMAN_DB", default_value = "malman.sqlite3")]
    pub db: String,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database and install the schema
    Init,
}

/// Initialize the database
async fn db_init(filename: &str) -> Result<()> {
    let conn = Connection::open(filename).await?;
    schema::install(&conn).await?;
    tracing::info!(filename, "database schema installed");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Init => db_init(&cli.db).await?,
    }
    Ok(())
}

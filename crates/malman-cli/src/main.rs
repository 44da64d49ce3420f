use anyhow::Result;

use malman_cli::cli::{Cli, Command};
use malman_cli::config::Context;
use malman_cli::logging;
use malman_db::Connection;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();
    let cli = Cli::init();

    let db = Connection::open(&cli.db).await?;
    let ctx = Context::new(db, cli.config());
    match cli.command {
        Command::Balance(cmd) => cmd.run(&ctx).await,
        Command::Transactions(cmd) => cmd.run(&ctx).await,
        Command::Reimbursements(cmd) => cmd.run(&ctx).await,
        Command::Attachments(cmd) => cmd.run(&ctx).await,
        Command::Bar(cmd) => cmd.run(&ctx).await,
        Command::Stock(cmd) => cmd.run(&ctx).await,
        Command::Fees(cmd) => cmd.run(&ctx).await,
        Command::Cash(cmd) => cmd.run(&ctx).await,
        Command::Reports(cmd) => cmd.run(&ctx).await,
        Command::Members(cmd) => cmd.run(&ctx).await,
        Command::Banks(cmd) => cmd.run(&ctx).await,
        Command::Categories(cmd) => cmd.run(&ctx).await,
    }?;

    Ok(())
}

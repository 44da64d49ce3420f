use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{
    Attachments, Balance, Banks, Bar, Cash, Categories, Fees, Members, Reimbursements, Reports,
    Stock, Transactions,
};
use crate::config::Config;

#[derive(Parser, Debug)]
#[clap(name = "malman", version=env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[clap(long, env = "MALMAN_DB", default_value = "malman.sqlite3")]
    pub db: String,

    /// Id of the member acting
    #[clap(long, env = "MALMAN_USER")]
    pub user: Option<u32>,

    #[clap(long, env = "MALMAN_ATTACHMENTS", default_value = "attachments")]
    pub attachments_dir: PathBuf,

    #[clap(long, env = "MALMAN_ITEMS_PER_PAGE", default_value_t = 1000)]
    pub items_per_page: usize,

    /// Prefix of the confirmation printed after an edit
    #[clap(long, env = "MALMAN_CHANGE_MSG", default_value = "These values were updated: ")]
    pub change_message: String,

    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn init() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            user: self.user,
            attachments_dir: self.attachments_dir.clone(),
            items_per_page: self.items_per_page,
            change_message: self.change_message.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show bank and cash balances
    #[clap(name = "balance")]
    Balance(Balance),
    /// The general ledger
    #[clap(subcommand)]
    Transactions(Transactions),
    #[clap(subcommand)]
    Reimbursements(Reimbursements),
    #[clap(subcommand)]
    Attachments(Attachments),
    /// Bar accounts
    #[clap(subcommand)]
    Bar(Bar),
    /// Bar stock and its log
    #[clap(subcommand)]
    Stock(Stock),
    /// Membership fees
    #[clap(subcommand)]
    Fees(Fees),
    /// The cash register log
    #[clap(subcommand)]
    Cash(Cash),
    /// Legal ledgers
    #[clap(subcommand)]
    Reports(Reports),
    #[clap(subcommand)]
    Members(Members),
    #[clap(subcommand)]
    Banks(Banks),
    #[clap(subcommand)]
    Categories(Categories),
}

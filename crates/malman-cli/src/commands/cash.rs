use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use inquire::Confirm;
use rust_decimal::Decimal;

use malman_accounting::{
    cash::{record_cash, remove_cash},
    datetime,
    listing::cash_log,
    permissions,
};
use malman_data::{CashTransaction, Retrieve, Role};

use crate::config::Context;
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Cash {
    /// Show the cash register log
    #[clap(name = "list")]
    List(ListCash),
    /// Add an entry to the cash register log
    #[clap(name = "add")]
    Add(AddCash),
    /// Remove an entry from the cash register log
    #[clap(name = "remove")]
    Remove(RemoveCash),
}

impl Cash {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Cash::List(cmd) => cmd.run(ctx).await,
            Cash::Add(cmd) => cmd.run(ctx).await,
            Cash::Remove(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListCash {
    #[clap(short, long, default_value_t = 1)]
    pub page: usize,
}

impl ListCash {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;

        let page = cash_log(&ctx.db, self.page, ctx.config.items_per_page).await?;
        page.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddCash {
    /// Defaults to today
    #[clap(short, long)]
    pub date: Option<NaiveDate>,
    #[clap(short, long, allow_negative_numbers = true)]
    pub amount: Decimal,
    #[clap(long)]
    pub description: String,
}

impl AddCash {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let date = self.date.unwrap_or_else(datetime::today);
        let entry = record_cash(&ctx.db, &actor, date, self.amount, &self.description).await?;
        println!("cash register entry added with id {}", entry.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RemoveCash {
    #[clap(short, long)]
    pub id: u32,
}

impl RemoveCash {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Finances)?;

        let entry: CashTransaction = ctx.db.retrieve(self.id).await?;
        println!("{}\t{:.2}\t{}", entry.date, entry.amount, entry.description);
        let confirm = Confirm::new("Remove entry from the cash register log?").with_default(false);
        if !confirm.prompt()? {
            return Ok(());
        }
        remove_cash(&ctx.db, &actor, entry.id).await?;
        Ok(())
    }
}

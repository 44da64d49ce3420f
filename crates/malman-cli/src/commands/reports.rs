use anyhow::Result;
use clap::{Args, Subcommand};

use malman_accounting::{
    ledger::{load_dagboek, load_kasboek, DagboekQuery, KasboekQuery, LedgerType},
    permissions,
};
use malman_data::Role;

use crate::config::Context;
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Reports {
    /// Cash book of one bank
    #[clap(name = "kasboek")]
    Kasboek(ShowKasboek),
    /// Daily ledger of revenues or expenses
    #[clap(name = "dagboek")]
    Dagboek(ShowDagboek),
}

impl Reports {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;
        match self {
            Reports::Kasboek(cmd) => cmd.run(ctx).await,
            Reports::Dagboek(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ShowKasboek {
    /// Bank name, the first bank if omitted
    #[clap(short, long)]
    pub bank: Option<String>,
    /// Defaults to the most recent year
    #[clap(short, long)]
    pub year: Option<i32>,
    #[clap(long)]
    pub json: bool,
}

impl ShowKasboek {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let query = KasboekQuery {
            bank: self.bank,
            year: self.year,
        };
        let kasboek = load_kasboek(&ctx.db, &query).await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&kasboek)?);
        } else {
            kasboek.print_formatted();
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ShowDagboek {
    #[clap(short, long)]
    pub year: Option<i32>,
    /// revenues or expenses
    #[clap(short = 't', long = "type", default_value = "revenues")]
    pub kind: LedgerType,
    #[clap(long)]
    pub json: bool,
}

impl ShowDagboek {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let query = DagboekQuery {
            year: self.year,
            kind: self.kind,
        };
        let dagboek = load_dagboek(&ctx.db, &query).await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&dagboek)?);
        } else {
            dagboek.print_formatted();
        }
        Ok(())
    }
}

use anyhow::Result;
use clap::{Args, Subcommand};

use malman_accounting::{
    fees::{bar_account_credit, topup_bar_account},
    permissions,
};
use malman_data::{Member, Retrieve, Role};

use crate::config::Context;

#[derive(Subcommand, Debug)]
pub enum Bar {
    /// Credit a filed transaction to a member's bar account
    #[clap(name = "topup")]
    Topup(TopupBarAccount),
    /// Show the total credit of a member
    #[clap(name = "credit")]
    Credit(ShowCredit),
}

impl Bar {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Bar::Topup(cmd) => cmd.run(ctx).await,
            Bar::Credit(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct TopupBarAccount {
    #[clap(short, long)]
    pub transaction: u32,
    #[clap(short, long)]
    pub member: u32,
}

impl TopupBarAccount {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let topup = topup_bar_account(&ctx.db, &actor, self.transaction, self.member).await?;
        println!("{}", topup.describe());
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ShowCredit {
    /// Defaults to the acting member
    #[clap(short, long)]
    pub member: Option<u32>,
}

impl ShowCredit {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;

        let member: Member = match self.member {
            Some(id) => ctx.db.retrieve(id).await?,
            None => actor,
        };
        let credit = bar_account_credit(&ctx.db, &member).await?;
        println!("{}:\t€{:.2}", member.name, credit);
        Ok(())
    }
}

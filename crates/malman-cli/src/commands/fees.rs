use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use malman_accounting::{fees::file_membership_fee, listing::membership_fee_log, permissions};
use malman_data::{Member, Retrieve, Role};

use crate::config::Context;
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Fees {
    /// Book a filed transaction as a membership fee payment
    #[clap(name = "file")]
    File(FileMembershipFee),
    /// List paid membership fees
    #[clap(name = "list")]
    List(ListMembershipFees),
}

impl Fees {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Fees::File(cmd) => cmd.run(ctx).await,
            Fees::List(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct FileMembershipFee {
    #[clap(short, long)]
    pub transaction: u32,
    #[clap(short, long)]
    pub member: u32,
    /// Any day of the last month the payment covers
    #[clap(short, long)]
    pub until: NaiveDate,
}

impl FileMembershipFee {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let (member, fee) =
            file_membership_fee(&ctx.db, &actor, self.transaction, self.member, self.until)
                .await?;
        println!("{}: {}", member.name, fee.describe());
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListMembershipFees {
    #[clap(short, long)]
    pub member: Option<u32>,
    #[clap(short, long, default_value_t = 1)]
    pub page: usize,
}

impl ListMembershipFees {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;

        let member: Option<Member> = match self.member {
            Some(id) => Some(ctx.db.retrieve(id).await?),
            None => None,
        };
        let page = membership_fee_log(
            &ctx.db,
            member.as_ref(),
            self.page,
            ctx.config.items_per_page,
        )
        .await?;
        page.print_formatted();
        Ok(())
    }
}

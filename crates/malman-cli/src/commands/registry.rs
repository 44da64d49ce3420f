use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use malman_accounting::{
    forms::categories_for,
    permissions,
    registry::{add_bank, add_category, add_member, grant_role},
};
use malman_data::{
    Bank, BankFilter, Category, CategoryFilter, CategoryPurpose, Member, MemberFilter, Query,
    Retrieve, Role,
};

use crate::config::Context;
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Members {
    /// Show a member
    #[clap(name = "show")]
    Show(ShowMember),
    /// List members
    #[clap(name = "list")]
    List(ListMembers),
    /// Add a member
    #[clap(name = "add")]
    Add(AddMember),
    /// Grant a role to a member
    #[clap(name = "grant")]
    Grant(GrantRole),
}

impl Members {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Members::Show(cmd) => cmd.run(ctx).await,
            Members::List(cmd) => cmd.run(ctx).await,
            Members::Add(cmd) => cmd.run(ctx).await,
            Members::Grant(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ShowMember {
    #[clap(short, long)]
    pub id: u32,
}

impl ShowMember {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;

        let member: Member = ctx.db.retrieve(self.id).await?;
        println!();
        member.print_formatted();
        println!();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListMembers {
    #[clap(short, long)]
    pub name: Option<String>,
    #[clap(short, long)]
    pub email: Option<String>,
}

impl ListMembers {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;

        let filter = MemberFilter {
            name: self.name,
            email: self.email,
            ..Default::default()
        };
        let members: Vec<Member> = ctx.db.query(&filter).await?;
        println!("{} members.", members.len());
        members.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddMember {
    #[clap(short, long)]
    pub name: String,
    #[clap(short, long)]
    pub email: String,
    #[clap(long)]
    pub member_since: Option<NaiveDate>,
    /// Monthly membership dues
    #[clap(short, long, default_value = "0")]
    pub dues: Decimal,
    /// Roles to grant right away
    #[clap(short, long)]
    pub role: Vec<Role>,
}

impl AddMember {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = match ctx.config.user {
            Some(_) => Some(ctx.actor().await?),
            None => None,
        };
        let member = Member {
            name: self.name,
            email: self.email,
            active_member: true,
            member_since: self.member_since,
            membership_dues: self.dues,
            roles: self.role,
            ..Default::default()
        };
        let member = add_member(&ctx.db, actor.as_ref(), member).await?;
        println!("member added with id {}", member.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct GrantRole {
    #[clap(short, long)]
    pub id: u32,
    /// member or finances
    #[clap(short, long)]
    pub role: Role,
}

impl GrantRole {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let member: Member = ctx.db.retrieve(self.id).await?;
        let member = grant_role(&ctx.db, &actor, member, self.role).await?;
        println!();
        member.print_formatted();
        println!();
        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum Banks {
    #[clap(name = "list")]
    List(ListBanks),
    #[clap(name = "add")]
    Add(AddBank),
}

impl Banks {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Banks::List(cmd) => cmd.run(ctx).await,
            Banks::Add(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListBanks {}

impl ListBanks {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;

        let banks: Vec<Bank> = ctx.db.query(&BankFilter::default()).await?;
        banks.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddBank {
    #[clap(short, long)]
    pub name: String,
}

impl AddBank {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let bank = add_bank(&ctx.db, &actor, &self.name).await?;
        println!("bank added with id {}", bank.id);
        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum Categories {
    #[clap(name = "list")]
    List(ListCategories),
    #[clap(name = "add")]
    Add(AddCategory),
}

impl Categories {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Categories::List(cmd) => cmd.run(ctx).await,
            Categories::Add(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListCategories {
    /// Only revenue categories
    #[clap(long, conflicts_with = "expenses")]
    pub revenues: bool,
    /// Only expense categories
    #[clap(long)]
    pub expenses: bool,
}

impl ListCategories {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;

        let categories: Vec<Category> = match (self.revenues, self.expenses) {
            (true, _) => categories_for(&ctx.db, true).await?,
            (_, true) => categories_for(&ctx.db, false).await?,
            _ => ctx.db.query(&CategoryFilter::default()).await?,
        };
        categories.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddCategory {
    #[clap(short, long)]
    pub name: String,
    /// Column the category is booked under in the ledgers
    #[clap(short, long)]
    pub legal_category: String,
    #[clap(short, long)]
    pub revenue: bool,
    /// general, bar_topup or membership_fee
    #[clap(short, long, default_value = "general")]
    pub purpose: CategoryPurpose,
}

impl AddCategory {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let category = Category {
            name: self.name,
            legal_category: self.legal_category,
            is_revenue: self.revenue,
            purpose: self.purpose,
            ..Default::default()
        };
        let category = add_category(&ctx.db, &actor, category).await?;
        println!("category added with id {}", category.id);
        Ok(())
    }
}

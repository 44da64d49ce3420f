use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use malman_accounting::{
    attachments::Upload,
    datetime,
    forms::{Approval, ReimbursementRequest},
    permissions,
    reimbursements::{approve_reimbursement, pending_reimbursements, request_reimbursement},
    AccountingError,
};
use malman_data::{Retrieve, Role, Transaction};

use crate::config::Context;
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Reimbursements {
    /// Ask to be paid back for an expense
    #[clap(name = "request")]
    Request(RequestReimbursement),
    /// List requests waiting for approval
    #[clap(name = "list")]
    List(ListReimbursements),
    /// Approve and file a request
    #[clap(name = "approve")]
    Approve(ApproveReimbursement),
}

impl Reimbursements {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Reimbursements::Request(cmd) => cmd.run(ctx).await,
            Reimbursements::List(cmd) => cmd.run(ctx).await,
            Reimbursements::Approve(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct RequestReimbursement {
    /// When the money was advanced, defaults to today
    #[clap(short = 'd', long)]
    pub advance_date: Option<NaiveDate>,
    #[clap(short, long)]
    pub amount: Decimal,
    #[clap(long)]
    pub description: String,
    #[clap(short, long)]
    pub comments: Option<String>,
    #[clap(long)]
    pub attachment: Option<PathBuf>,
}

impl RequestReimbursement {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let upload = match &self.attachment {
            Some(source) => Some(Upload::check(source).map_err(AccountingError::from)?),
            None => None,
        };
        let request = ReimbursementRequest {
            advance_date: self.advance_date.unwrap_or_else(datetime::today),
            amount: self.amount,
            description: self.description,
            comments: self.comments,
        };
        let tx = request_reimbursement(&ctx.db, &actor, request).await?;
        if let Some(upload) = &upload {
            ctx.attachments().attach(&ctx.db, &actor, tx.id, upload).await?;
        }
        println!("the request was filed with id {}", tx.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListReimbursements {}

impl ListReimbursements {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Finances)?;

        let pending = pending_reimbursements(&ctx.db).await?;
        println!("{} requests waiting for approval.", pending.len());
        pending.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ApproveReimbursement {
    #[clap(short, long)]
    pub id: u32,
    /// Date of the payment, defaults to today
    #[clap(short, long)]
    pub date: Option<NaiveDate>,
    /// Defaults to the requested amount
    #[clap(short, long, allow_negative_numbers = true)]
    pub amount: Option<Decimal>,
    #[clap(long)]
    pub description: Option<String>,
    /// Defaults to the requesting member
    #[clap(short, long)]
    pub to_from: Option<String>,
    #[clap(short, long)]
    pub category: u32,
    #[clap(short, long)]
    pub bank: u32,
    #[clap(short, long)]
    pub statement: Option<u32>,
}

impl ApproveReimbursement {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let today = datetime::today();
        let request: Transaction = ctx.db.retrieve(self.id).await?;

        let approval = Approval {
            date: self.date.unwrap_or(today),
            amount: self.amount.unwrap_or(request.amount),
            description: self.description.unwrap_or(request.description),
            to_from: self.to_from.unwrap_or(request.to_from),
            category_id: self.category,
            bank_id: self.bank,
            bank_statement_number: self.statement,
        };
        let tx = approve_reimbursement(&ctx.db, &actor, self.id, approval, today).await?;
        println!("the reimbursement was approved");
        println!();
        tx.print_formatted();
        Ok(())
    }
}

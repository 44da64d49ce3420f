use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use malman_accounting::{
    attachments::Upload,
    changes::edit_transaction,
    datetime,
    filing::{add_transaction, FollowUp},
    forms::TransactionFields,
    ledger::LedgerType,
    listing::{general_ledger, LedgerFilter},
    permissions, AccountingError,
};
use malman_data::{Retrieve, Role, Transaction};

use crate::config::Context;
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Transactions {
    /// List filed transactions
    #[clap(name = "list")]
    List(ListTransactions),
    /// Show a transaction with its attachments
    #[clap(name = "show")]
    Show(ShowTransaction),
    /// File a transaction
    #[clap(name = "add")]
    Add(AddTransaction),
    /// Edit a filed transaction
    #[clap(name = "edit")]
    Edit(EditTransaction),
}

impl Transactions {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Transactions::List(cmd) => cmd.run(ctx).await,
            Transactions::Show(cmd) => cmd.run(ctx).await,
            Transactions::Add(cmd) => cmd.run(ctx).await,
            Transactions::Edit(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListTransactions {
    /// revenues or expenses
    #[clap(short = 't', long = "type")]
    pub kind: Option<LedgerType>,
    #[clap(short, long)]
    pub bank: Option<u32>,
    #[clap(short, long)]
    pub category: Option<u32>,
    #[clap(short, long, default_value_t = 1)]
    pub page: usize,
}

impl ListTransactions {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;

        let filter = LedgerFilter {
            is_revenue: self.kind.map(|k| k.is_revenue()),
            bank_id: self.bank,
            category_id: self.category,
        };
        let page = general_ledger(&ctx.db, &filter, self.page, ctx.config.items_per_page).await?;
        page.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ShowTransaction {
    #[clap(short, long)]
    pub id: u32,
}

impl ShowTransaction {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;

        let tx: Transaction = ctx.db.retrieve(self.id).await?;
        println!();
        tx.print_formatted();
        for attachment in tx.get_attachments(&ctx.db).await? {
            println!("Attachment:\t\t{}\t{}", attachment.id, attachment.filename);
        }
        println!();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddTransaction {
    /// Defaults to today
    #[clap(short, long)]
    pub date: Option<NaiveDate>,
    /// Defaults to the date
    #[clap(short, long)]
    pub facturation_date: Option<NaiveDate>,
    /// File as revenue instead of expense
    #[clap(short, long)]
    pub revenue: bool,
    #[clap(short, long, allow_negative_numbers = true)]
    pub amount: Decimal,
    #[clap(long)]
    pub description: String,
    #[clap(short, long)]
    pub to_from: String,
    #[clap(short, long)]
    pub category: u32,
    #[clap(short, long)]
    pub bank: u32,
    #[clap(short, long)]
    pub statement: Option<u32>,
    #[clap(long)]
    pub attachment: Option<PathBuf>,
}

impl AddTransaction {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let today = datetime::today();
        let upload = match &self.attachment {
            Some(source) => Some(Upload::check(source).map_err(AccountingError::from)?),
            None => None,
        };
        let fields = TransactionFields {
            date: self.date.unwrap_or(today),
            facturation_date: self.facturation_date,
            is_revenue: self.revenue,
            amount: self.amount,
            description: self.description,
            to_from: self.to_from,
            category_id: self.category,
            bank_id: self.bank,
            bank_statement_number: self.statement,
        };

        let filed = add_transaction(&ctx.db, &actor, fields, today).await?;
        let tx = filed.transaction;
        if let Some(upload) = &upload {
            ctx.attachments().attach(&ctx.db, &actor, tx.id, upload).await?;
        }
        println!("the transaction was filed with id {}", tx.id);

        match filed.follow_up {
            FollowUp::None => {}
            FollowUp::TopUpBarAccount(id) => {
                println!("top up the bar account: malman bar topup --transaction {} --member <id>", id)
            }
            FollowUp::FileMembershipFee(id) => println!(
                "file the membership fee: malman fees file --transaction {} --member <id> --until <date>",
                id
            ),
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct EditTransaction {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub date: Option<NaiveDate>,
    #[clap(short, long, conflicts_with = "clear_facturation_date")]
    pub facturation_date: Option<NaiveDate>,
    /// Blank the facturation date, it falls back to the date
    #[clap(long)]
    pub clear_facturation_date: bool,
    #[clap(short, long)]
    pub revenue: Option<bool>,
    #[clap(short, long, allow_negative_numbers = true)]
    pub amount: Option<Decimal>,
    #[clap(long)]
    pub description: Option<String>,
    #[clap(short, long)]
    pub to_from: Option<String>,
    #[clap(short, long)]
    pub category: Option<u32>,
    #[clap(short, long)]
    pub bank: Option<u32>,
    #[clap(short, long, conflicts_with = "clear_statement")]
    pub statement: Option<u32>,
    /// Remove the bank statement number
    #[clap(long)]
    pub clear_statement: bool,
}

impl EditTransaction {
    /// Apply the given values on top of the stored ones
    fn fields(self, tx: &Transaction) -> Result<TransactionFields> {
        let mut fields = TransactionFields::from_transaction(tx)?;
        if let Some(date) = self.date {
            fields.date = date;
        }
        if self.clear_facturation_date {
            fields.facturation_date = None;
        } else if let Some(date) = self.facturation_date {
            fields.facturation_date = Some(date);
        }
        if let Some(revenue) = self.revenue {
            fields.is_revenue = revenue;
        }
        if let Some(amount) = self.amount {
            fields.amount = amount;
        }
        if let Some(description) = self.description {
            fields.description = description;
        }
        if let Some(to_from) = self.to_from {
            fields.to_from = to_from;
        }
        if let Some(category) = self.category {
            fields.category_id = category;
        }
        if let Some(bank) = self.bank {
            fields.bank_id = bank;
        }
        if self.clear_statement {
            fields.bank_statement_number = None;
        } else if let Some(statement) = self.statement {
            fields.bank_statement_number = Some(statement);
        }
        Ok(fields)
    }

    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let id = self.id;
        let tx: Transaction = ctx.db.retrieve(id).await?;
        let fields = self.fields(&tx)?;

        let log = edit_transaction(&ctx.db, &actor, id, fields).await?;
        if log.is_empty() {
            println!("nothing was changed");
        } else {
            println!("{}", log.confirmation(&ctx.config.change_message));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use malman_data::{Bank, Category, Insert, Member, Query, TransactionFilter};
    use malman_db::Connection;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::Config;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn context(attachments_dir: &Path) -> (Context, Bank, Category) {
        let db = Connection::open_test().await;
        let treasurer = db
            .insert(Member {
                name: "Treasurer".to_string(),
                email: "finances@mal.be".to_string(),
                roles: vec![Role::Finances],
                ..Default::default()
            })
            .await
            .unwrap();
        let bank = db
            .insert(Bank {
                name: "Triodos".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let category = db
            .insert(Category {
                name: "donations".to_string(),
                legal_category: "Giften".to_string(),
                is_revenue: true,
                ..Default::default()
            })
            .await
            .unwrap();
        let config = Config {
            user: Some(treasurer.id),
            attachments_dir: attachments_dir.to_path_buf(),
            items_per_page: 1000,
            change_message: "These values were updated: ".to_string(),
        };
        (Context::new(db, config), bank, category)
    }

    #[tokio::test]
    async fn test_add_with_rejected_attachment_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, bank, category) = context(&dir.path().join("store")).await;
        let source = dir.path().join("statement.sh");
        tokio::fs::write(&source, b"#!/bin/sh").await.unwrap();

        let cmd = AddTransaction {
            date: Some(date(2024, 3, 4)),
            facturation_date: None,
            revenue: true,
            amount: dec!(50),
            description: "Gift".to_string(),
            to_from: "A friend".to_string(),
            category: category.id,
            bank: bank.id,
            statement: None,
            attachment: Some(source),
        };
        assert!(cmd.run(&ctx).await.is_err());

        let ledger: Vec<Transaction> = ctx.db.query(&TransactionFilter::ledger()).await.unwrap();
        assert!(ledger.is_empty());
    }

    fn edit(id: u32) -> EditTransaction {
        EditTransaction {
            id,
            date: None,
            facturation_date: None,
            clear_facturation_date: false,
            revenue: None,
            amount: None,
            description: None,
            to_from: None,
            category: None,
            bank: None,
            statement: None,
            clear_statement: false,
        }
    }

    #[test]
    fn test_edit_fields_clear() {
        let tx = Transaction {
            id: 7,
            date: Some(date(2024, 3, 1)),
            facturation_date: Some(date(2024, 2, 28)),
            is_revenue: true,
            amount: dec!(15),
            description: "Lidgeld".to_string(),
            to_from: "Test Member".to_string(),
            category_id: Some(1),
            bank_id: Some(1),
            bank_statement_number: Some(4),
            date_filed: Some(date(2024, 3, 2)),
            ..Default::default()
        };

        let fields = edit(tx.id).fields(&tx).unwrap();
        assert_eq!(fields.facturation_date, Some(date(2024, 2, 28)));
        assert_eq!(fields.bank_statement_number, Some(4));

        let cmd = EditTransaction {
            clear_facturation_date: true,
            clear_statement: true,
            ..edit(tx.id)
        };
        let fields = cmd.fields(&tx).unwrap();
        assert_eq!(fields.facturation_date, None);
        assert_eq!(fields.resolved_facturation_date(), date(2024, 3, 1));
        assert_eq!(fields.bank_statement_number, None);
    }

    #[test]
    fn test_edit_clear_conflicts_with_value() {
        use clap::Parser;

        let result = crate::cli::Cli::try_parse_from([
            "malman",
            "transactions",
            "edit",
            "--id",
            "7",
            "--statement",
            "3",
            "--clear-statement",
        ]);
        assert!(result.is_err());
    }
}

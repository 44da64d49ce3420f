//! Submitted form data and its validation.
//!
//! Forms are composed rather than derived from each other: the
//! fields shared by filing, editing and approving live in
//! [`TransactionFields`], the other forms convert into it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use malman_data::{Bank, Category, Query, QueryError, Retrieve, Transaction};

use crate::{AccountingError, FormErrors};

const REQUIRED: &str = "this field is required";

/// The fields of a filed transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionFields {
    pub date: NaiveDate,
    /// Falls back to `date` when left blank
    pub facturation_date: Option<NaiveDate>,
    pub is_revenue: bool,
    pub amount: Decimal,
    pub description: String,
    pub to_from: String,
    pub category_id: u32,
    pub bank_id: u32,
    pub bank_statement_number: Option<u32>,
}

impl TransactionFields {
    /// Prefill the fields from a stored transaction. Pending
    /// requests lack date, bank and category and yield the
    /// missing fields as errors.
    pub fn from_transaction(tx: &Transaction) -> Result<Self, FormErrors> {
        let mut errors = FormErrors::default();
        if tx.date.is_none() {
            errors.push("date", REQUIRED);
        }
        if tx.category_id.is_none() {
            errors.push("category_id", REQUIRED);
        }
        if tx.bank_id.is_none() {
            errors.push("bank_id", REQUIRED);
        }
        match (tx.date, tx.category_id, tx.bank_id) {
            (Some(date), Some(category_id), Some(bank_id)) => Ok(Self {
                date,
                facturation_date: tx.facturation_date,
                is_revenue: tx.is_revenue,
                amount: tx.amount,
                description: tx.description.clone(),
                to_from: tx.to_from.clone(),
                category_id,
                bank_id,
                bank_statement_number: tx.bank_statement_number,
            }),
            _ => Err(errors),
        }
    }

    pub fn resolved_facturation_date(&self) -> NaiveDate {
        self.facturation_date.unwrap_or(self.date)
    }

    /// Validate against the selected category and bank.
    pub fn validate(&self, category: Option<&Category>, bank: Option<&Bank>) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        if self.description.trim().is_empty() {
            errors.push("description", REQUIRED);
        }
        if self.to_from.trim().is_empty() {
            errors.push("to_from", REQUIRED);
        }
        if bank.is_none() {
            errors.push("bank_id", "please pick an existing bank");
        }
        match category {
            None => errors.push("category_id", "please pick an existing category"),
            Some(category) if category.is_revenue && !self.is_revenue => errors.push(
                "category_id",
                "This is an expense, please pick a corresponding category",
            ),
            Some(category) if !category.is_revenue && self.is_revenue => errors.push(
                "category_id",
                "This is a revenue, please pick a corresponding category",
            ),
            Some(_) => {}
        }
        errors.into_result()
    }

    /// Look up category and bank and validate. Returns the category
    /// so callers can act on its purpose.
    pub async fn check<DB>(&self, db: &DB) -> Result<Category, AccountingError>
    where
        DB: Retrieve<Category, Key = u32> + Retrieve<Bank, Key = u32> + Send + Sync,
    {
        let category: Option<Category> = lookup(db, self.category_id).await?;
        let bank: Option<Bank> = lookup(db, self.bank_id).await?;
        self.validate(category.as_ref(), bank.as_ref())?;
        category.ok_or_else(|| AccountingError::NotFound(format!("category {}", self.category_id)))
    }
}

/// Retrieve a referenced record. Only a missing record counts as
/// absent, any other failure is passed on.
async fn lookup<T, DB>(db: &DB, id: u32) -> Result<Option<T>, AccountingError>
where
    DB: Retrieve<T, Key = u32> + Send + Sync,
{
    match db.retrieve(id).await {
        Ok(item) => Ok(Some(item)),
        Err(err) => match err.downcast_ref::<QueryError>() {
            Some(QueryError::NotFound) => Ok(None),
            _ => Err(err.into()),
        },
    }
}

/// A member asking to get an advance paid back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReimbursementRequest {
    pub advance_date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    pub comments: Option<String>,
}

impl ReimbursementRequest {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            errors.push("amount", "please enter a positive number");
        }
        if self.description.trim().is_empty() {
            errors.push("description", REQUIRED);
        }
        errors.into_result()
    }
}

/// What the treasurer fills in when approving a request. The
/// type is fixed: a reimbursement is always an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    pub to_from: String,
    pub category_id: u32,
    pub bank_id: u32,
    pub bank_statement_number: Option<u32>,
}

impl From<Approval> for TransactionFields {
    fn from(approval: Approval) -> Self {
        TransactionFields {
            date: approval.date,
            facturation_date: Some(approval.date),
            is_revenue: false,
            amount: approval.amount,
            description: approval.description,
            to_from: approval.to_from,
            category_id: approval.category_id,
            bank_id: approval.bank_id,
            bank_statement_number: approval.bank_statement_number,
        }
    }
}

/// Categories offered for a transaction type
pub async fn categories_for<DB>(db: &DB, is_revenue: bool) -> anyhow::Result<Vec<Category>>
where
    DB: Query<Category, Filter = malman_data::CategoryFilter> + Send + Sync,
{
    db.query(&malman_data::CategoryFilter {
        is_revenue: Some(is_revenue),
        ..Default::default()
    })
    .await
}

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use malman_data::{
    Bank, BankFilter, Category, CategoryFilter, Query, Transaction, TransactionFilter,
};

use crate::{AccountingError, FormErrors};

/// Which half of the dagboek is shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerType {
    #[default]
    Revenues,
    Expenses,
}

impl LedgerType {
    pub fn is_revenue(&self) -> bool {
        matches!(self, LedgerType::Revenues)
    }
}

impl fmt::Display for LedgerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerType::Revenues => write!(f, "revenues"),
            LedgerType::Expenses => write!(f, "expenses"),
        }
    }
}

impl FromStr for LedgerType {
    type Err = FormErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revenues" => Ok(LedgerType::Revenues),
            "expenses" => Ok(LedgerType::Expenses),
            _ => {
                let mut errors = FormErrors::default();
                errors.push("type", "pick either revenues or expenses");
                Err(errors)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DagboekQuery {
    pub year: Option<i32>,
    pub kind: LedgerType,
}

/// Bank column of a dagboek row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankColumn {
    pub bank_id: u32,
    pub name: String,
    pub number: u32,
    pub amount: Decimal,
}

/// Category column of a dagboek row, keyed by the legal category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryColumn {
    pub legal_category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DagboekRow {
    pub id: u32,
    pub facturation_date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub bank: Option<BankColumn>,
    pub category: Option<CategoryColumn>,
}

impl DagboekRow {
    /// Sequence number of the row within `bank`
    pub fn number(&self, bank: &Bank) -> Option<u32> {
        self.bank
            .as_ref()
            .filter(|col| col.bank_id == bank.id)
            .map(|col| col.number)
    }

    pub fn bank_amount(&self, bank: &Bank) -> Option<Decimal> {
        self.bank
            .as_ref()
            .filter(|col| col.bank_id == bank.id)
            .map(|col| col.amount)
    }

    pub fn category_amount(&self, legal_category: &str) -> Option<Decimal> {
        self.category
            .as_ref()
            .filter(|col| col.legal_category == legal_category)
            .map(|col| col.amount)
    }
}

/// The daily ledger of one year and one type
#[derive(Debug, Clone, Serialize)]
pub struct Dagboek {
    pub years: Vec<i32>,
    pub year: Option<i32>,
    pub kind: LedgerType,
    pub rows: Vec<DagboekRow>,
    pub banks: Vec<Bank>,
    pub categories: Vec<String>,
}

/// Years with booked transactions, most recent first
fn ledger_years(dates: impl Iterator<Item = NaiveDate>) -> Vec<i32> {
    let years: BTreeSet<i32> = dates.map(|d| d.year()).collect();
    years.into_iter().rev().collect()
}

/// Build the dagboek from a set of transactions. Only transactions
/// with a facturation date take part.
///
/// Rows of a bank are numbered 1..N by facturation date before the
/// split into revenues and expenses, so a row keeps its number under
/// either type.
pub fn dagboek(
    transactions: Vec<Transaction>,
    banks: &[Bank],
    categories: &[Category],
    query: &DagboekQuery,
) -> Dagboek {
    let mut pool: Vec<(NaiveDate, Transaction)> = transactions
        .into_iter()
        .filter_map(|tx| tx.facturation_date.map(|d| (d, tx)))
        .collect();
    pool.sort_by_key(|(date, tx)| (*date, tx.id));

    let years = ledger_years(pool.iter().map(|(date, _)| *date));
    let year = query.year.or_else(|| years.first().copied());
    if let Some(year) = year {
        pool.retain(|(date, _)| date.year() == year);
    }

    let banks_by_id: HashMap<u32, &Bank> = banks.iter().map(|b| (b.id, b)).collect();
    let categories_by_id: HashMap<u32, &Category> =
        categories.iter().map(|c| (c.id, c)).collect();

    let mut counters: HashMap<u32, u32> = HashMap::new();
    let mut rows = vec![];
    for (facturation_date, tx) in pool {
        let bank = tx
            .bank_id
            .and_then(|id| banks_by_id.get(&id))
            .map(|bank| {
                let number = counters.entry(bank.id).or_insert(0);
                *number += 1;
                BankColumn {
                    bank_id: bank.id,
                    name: bank.name.clone(),
                    number: *number,
                    amount: tx.amount,
                }
            });
        if tx.is_revenue != query.kind.is_revenue() {
            continue;
        }
        let category = tx
            .category_id
            .and_then(|id| categories_by_id.get(&id))
            .map(|c| CategoryColumn {
                legal_category: c.legal_category.clone(),
                amount: tx.amount,
            });
        rows.push(DagboekRow {
            id: tx.id,
            facturation_date,
            description: tx.description,
            amount: tx.amount,
            bank,
            category,
        });
    }

    let mut used_banks: Vec<Bank> = banks
        .iter()
        .filter(|b| rows.iter().any(|r| r.number(b).is_some()))
        .cloned()
        .collect();
    used_banks.sort_by_key(|b| b.id);
    let used_categories: BTreeSet<String> = rows
        .iter()
        .filter_map(|r| r.category.as_ref())
        .map(|c| c.legal_category.clone())
        .collect();

    Dagboek {
        years,
        year,
        kind: query.kind,
        rows,
        banks: used_banks,
        categories: used_categories.into_iter().collect(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct KasboekQuery {
    pub bank: Option<String>,
    pub year: Option<i32>,
}

/// The cash book of one bank and one year
#[derive(Debug, Clone, Serialize)]
pub struct Kasboek {
    pub banks: Vec<Bank>,
    pub bank: Bank,
    pub years: Vec<i32>,
    pub year: Option<i32>,
    pub transactions: Vec<Transaction>,
}

impl Kasboek {
    pub fn total(&self) -> Decimal {
        self.transactions.iter().map(|tx| tx.amount).sum()
    }
}

/// Build the kasboek from a set of transactions. The bank defaults
/// to the first one registered, the year to the most recent
/// facturation year. The year selects on the transaction date.
pub fn kasboek(
    transactions: Vec<Transaction>,
    banks: &[Bank],
    query: &KasboekQuery,
) -> Result<Kasboek, AccountingError> {
    let mut banks = banks.to_vec();
    banks.sort_by_key(|b| b.id);

    let bank = match &query.bank {
        Some(name) => banks.iter().find(|b| &b.name == name),
        None => banks.first(),
    }
    .cloned()
    .ok_or_else(|| {
        AccountingError::NotFound(match &query.bank {
            Some(name) => format!("bank {}", name),
            None => "no banks registered".to_string(),
        })
    })?;

    let mut pool: Vec<Transaction> = transactions
        .into_iter()
        .filter(|tx| tx.facturation_date.is_some())
        .collect();
    let years = ledger_years(pool.iter().filter_map(|tx| tx.facturation_date));
    let year = query.year.or_else(|| years.first().copied());

    pool.retain(|tx| tx.bank_id == Some(bank.id));
    if let Some(year) = year {
        pool.retain(|tx| tx.date.map(|d| d.year()) == Some(year));
    }
    pool.sort_by_key(|tx| (tx.facturation_date, tx.id));

    Ok(Kasboek {
        banks,
        bank,
        years,
        year,
        transactions: pool,
    })
}

async fn booked_transactions<DB>(db: &DB) -> Result<Vec<Transaction>, AccountingError>
where
    DB: Query<Transaction, Filter = TransactionFilter> + Send + Sync,
{
    let transactions = db
        .query(&TransactionFilter {
            has_facturation_date: Some(true),
            ..Default::default()
        })
        .await?;
    Ok(transactions)
}

pub async fn load_dagboek<DB>(db: &DB, query: &DagboekQuery) -> Result<Dagboek, AccountingError>
where
    DB: Query<Transaction, Filter = TransactionFilter>
        + Query<Bank, Filter = BankFilter>
        + Query<Category, Filter = CategoryFilter>
        + Send
        + Sync,
{
    let transactions = booked_transactions(db).await?;
    let banks: Vec<Bank> = db.query(&BankFilter::default()).await?;
    let categories: Vec<Category> = db.query(&CategoryFilter::default()).await?;
    tracing::debug!(transactions = transactions.len(), year = ?query.year, kind = %query.kind,
        "building dagboek");
    Ok(dagboek(transactions, &banks, &categories, query))
}

pub async fn load_kasboek<DB>(db: &DB, query: &KasboekQuery) -> Result<Kasboek, AccountingError>
where
    DB: Query<Transaction, Filter = TransactionFilter> + Query<Bank, Filter = BankFilter> + Send + Sync,
{
    let transactions = booked_transactions(db).await?;
    let banks: Vec<Bank> = db.query(&BankFilter::default()).await?;
    tracing::debug!(transactions = transactions.len(), bank = ?query.bank, year = ?query.year,
        "building kasboek");
    kasboek(transactions, &banks, query)
}

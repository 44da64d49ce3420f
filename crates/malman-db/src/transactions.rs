use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, QueryBuilder, Sqlite};

use malman_data::{
    Delete, FilePending, Insert, Query, QueryError, Retrieve, Transaction, TransactionFilter,
    Update,
};

use crate::{
    results::{decimal, Id},
    Connection,
};

#[derive(FromRow)]
struct TransactionRow {
    id: u32,
    date: Option<NaiveDate>,
    facturation_date: Option<NaiveDate>,
    advance_date: Option<NaiveDate>,
    is_revenue: bool,
    amount: String,
    description: String,
    to_from: String,
    category_id: Option<u32>,
    bank_id: Option<u32>,
    bank_statement_number: Option<u32>,
    date_filed: Option<NaiveDate>,
    filed_by_id: Option<u32>,
    reimbursement_comments: Option<String>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = anyhow::Error;

    fn try_from(row: TransactionRow) -> Result<Self> {
        Ok(Transaction {
            id: row.id,
            date: row.date,
            facturation_date: row.facturation_date,
            advance_date: row.advance_date,
            is_revenue: row.is_revenue,
            amount: decimal(&row.amount)?,
            description: row.description,
            to_from: row.to_from,
            category_id: row.category_id,
            bank_id: row.bank_id,
            bank_statement_number: row.bank_statement_number,
            date_filed: row.date_filed,
            filed_by_id: row.filed_by_id,
            reimbursement_comments: row.reimbursement_comments,
        })
    }
}

/// Bind all mutable columns of a transaction as `column = value`
fn push_assignments(qry: &mut QueryBuilder<'_, Sqlite>, tx: &Transaction) {
    qry.push(" date = ")
        .push_bind(tx.date)
        .push(", facturation_date = ")
        .push_bind(tx.facturation_date)
        .push(", advance_date = ")
        .push_bind(tx.advance_date)
        .push(", is_revenue = ")
        .push_bind(tx.is_revenue)
        .push(", amount = ")
        .push_bind(tx.amount.to_string())
        .push(", description = ")
        .push_bind(tx.description.clone())
        .push(", to_from = ")
        .push_bind(tx.to_from.clone())
        .push(", category_id = ")
        .push_bind(tx.category_id)
        .push(", bank_id = ")
        .push_bind(tx.bank_id)
        .push(", bank_statement_number = ")
        .push_bind(tx.bank_statement_number)
        .push(", date_filed = ")
        .push_bind(tx.date_filed)
        .push(", filed_by_id = ")
        .push_bind(tx.filed_by_id)
        .push(", reimbursement_comments = ")
        .push_bind(tx.reimbursement_comments.clone());
}

#[async_trait]
impl Query<Transaction> for Connection {
    type Filter = TransactionFilter;

    /// Transactions, most recent first
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Transaction>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                date,
                facturation_date,
                advance_date,
                is_revenue,
                amount,
                description,
                to_from,
                category_id,
                bank_id,
                bank_statement_number,
                date_filed,
                filed_by_id,
                reimbursement_comments
            FROM transactions
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        match filter.filed {
            Some(true) => {
                qry.push(" AND date_filed IS NOT NULL");
            }
            Some(false) => {
                qry.push(" AND date_filed IS NULL");
            }
            None => {}
        }
        if let Some(is_revenue) = filter.is_revenue {
            qry.push(" AND is_revenue = ").push_bind(is_revenue);
        }
        if let Some(bank_id) = filter.bank_id {
            qry.push(" AND bank_id = ").push_bind(bank_id);
        }
        if let Some(category_id) = filter.category_id {
            qry.push(" AND category_id = ").push_bind(category_id);
        }
        match filter.has_facturation_date {
            Some(true) => {
                qry.push(" AND facturation_date IS NOT NULL");
            }
            Some(false) => {
                qry.push(" AND facturation_date IS NULL");
            }
            None => {}
        }
        qry.push(" ORDER BY date DESC, bank_statement_number DESC, id DESC");

        tracing::debug!(?filter, "querying transactions");
        let rows: Vec<TransactionRow> = qry.build_query_as().fetch_all(&mut *conn).await?;
        rows.into_iter().map(Transaction::try_from).collect()
    }
}

#[async_trait]
impl Retrieve<Transaction> for Connection {
    type Key = u32;

    async fn retrieve(&self, id: Self::Key) -> Result<Transaction> {
        let filter = TransactionFilter {
            id: Some(id),
            ..Default::default()
        };
        let transaction = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(transaction)
    }
}

#[async_trait]
impl Insert<Transaction> for Connection {
    async fn insert(&self, transaction: Transaction) -> Result<Transaction> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"INSERT INTO transactions (
                date,
                facturation_date,
                advance_date,
                is_revenue,
                amount,
                description,
                to_from,
                category_id,
                bank_id,
                bank_statement_number,
                date_filed,
                filed_by_id,
                reimbursement_comments
            ) VALUES (
            "#,
        );
        qry.separated(", ")
            .push_bind(transaction.date)
            .push_bind(transaction.facturation_date)
            .push_bind(transaction.advance_date)
            .push_bind(transaction.is_revenue)
            .push_bind(transaction.amount.to_string())
            .push_bind(&transaction.description)
            .push_bind(&transaction.to_from)
            .push_bind(transaction.category_id)
            .push_bind(transaction.bank_id)
            .push_bind(transaction.bank_statement_number)
            .push_bind(transaction.date_filed)
            .push_bind(transaction.filed_by_id)
            .push_bind(&transaction.reimbursement_comments);
        qry.push(") RETURNING id ");
        let insert: Id<u32> = qry.build_query_as().fetch_one(&mut *conn).await?;
        drop(conn);

        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<Transaction> for Connection {
    async fn update(&self, transaction: Transaction) -> Result<Transaction> {
        {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new("UPDATE transactions SET");
            push_assignments(&mut qry, &transaction);
            qry.push(" WHERE id = ").push_bind(transaction.id);
            let result = qry.build().execute(&mut *conn).await?;
            if result.rows_affected() == 0 {
                return Err(QueryError::NotFound.into());
            }
        }
        self.retrieve(transaction.id).await
    }
}

#[async_trait]
impl FilePending<Transaction> for Connection {
    async fn file_pending(&self, transaction: Transaction) -> Result<bool> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new("UPDATE transactions SET");
        push_assignments(&mut qry, &transaction);
        qry.push(" WHERE id = ")
            .push_bind(transaction.id)
            .push(" AND date_filed IS NULL");
        let result = qry.build().execute(&mut *conn).await?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl Delete<Transaction> for Connection {
    async fn delete(&self, transaction: Transaction) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM transactions WHERE id = ")
            .push_bind(transaction.id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

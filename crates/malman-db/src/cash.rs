use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, QueryBuilder, Sqlite};

use malman_data::{
    CashTransaction, CashTransactionFilter, Delete, Insert, Query, QueryError, Retrieve,
};

use crate::{
    results::{decimal, Id},
    Connection,
};

#[derive(FromRow)]
struct CashTransactionRow {
    id: u32,
    date: NaiveDate,
    amount: String,
    description: String,
}

impl TryFrom<CashTransactionRow> for CashTransaction {
    type Error = anyhow::Error;

    fn try_from(row: CashTransactionRow) -> Result<Self> {
        Ok(CashTransaction {
            id: row.id,
            date: row.date,
            amount: decimal(&row.amount)?,
            description: row.description,
        })
    }
}

#[async_trait]
impl Query<CashTransaction> for Connection {
    type Filter = CashTransactionFilter;

    /// The cash register log, newest entry first
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<CashTransaction>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "SELECT id, date, amount, description FROM cash_transactions WHERE 1",
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        qry.push(" ORDER BY id DESC");
        let rows: Vec<CashTransactionRow> = qry.build_query_as().fetch_all(&mut *conn).await?;
        rows.into_iter().map(CashTransaction::try_from).collect()
    }
}

#[async_trait]
impl Retrieve<CashTransaction> for Connection {
    type Key = u32;

    async fn retrieve(&self, id: Self::Key) -> Result<CashTransaction> {
        let entry = self
            .query(&CashTransactionFilter { id: Some(id) })
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(entry)
    }
}

#[async_trait]
impl Insert<CashTransaction> for Connection {
    async fn insert(&self, entry: CashTransaction) -> Result<CashTransaction> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "INSERT INTO cash_transactions (date, amount, description) VALUES (",
        );
        qry.separated(", ")
            .push_bind(entry.date)
            .push_bind(entry.amount.to_string())
            .push_bind(&entry.description);
        qry.push(") RETURNING id");
        let insert: Id<u32> = qry.build_query_as().fetch_one(&mut *conn).await?;
        drop(conn);

        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Delete<CashTransaction> for Connection {
    async fn delete(&self, entry: CashTransaction) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM cash_transactions WHERE id = ")
            .push_bind(entry.id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[tokio::test]
    async fn test_cash_log_insert_remove() {
        let db = Connection::open_test().await;
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let first = db
            .insert(CashTransaction {
                date,
                amount: dec!(20.00),
                description: "float".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let second = db
            .insert(CashTransaction {
                date,
                amount: dec!(-4.5),
                description: "milk".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let log: Vec<CashTransaction> = db.query(&CashTransactionFilter::default()).await.unwrap();
        assert_eq!(log, vec![second.clone(), first]);

        db.delete(second).await.unwrap();
        let log: Vec<CashTransaction> = db.query(&CashTransactionFilter::default()).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].amount, dec!(20));
    }
}

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use malman_data::{Bank, BankFilter, Insert, Query, QueryError, Retrieve};

use crate::{results::Id, Connection};

#[async_trait]
impl Query<Bank> for Connection {
    type Filter = BankFilter;

    /// Banks ordered by id
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Bank>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new("SELECT id, name FROM banks WHERE 1");
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(name) = filter.name.clone() {
            qry.push(" AND name = ").push_bind(name);
        }
        qry.push(" ORDER BY id");
        let banks: Vec<Bank> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(banks)
    }
}

#[async_trait]
impl Retrieve<Bank> for Connection {
    type Key = u32;

    async fn retrieve(&self, id: Self::Key) -> Result<Bank> {
        let bank = self
            .query(&BankFilter {
                id: Some(id),
                ..Default::default()
            })
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(bank)
    }
}

#[async_trait]
impl Insert<Bank> for Connection {
    async fn insert(&self, bank: Bank) -> Result<Bank> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new("INSERT INTO banks (name) VALUES (");
        qry.push_bind(&bank.name).push(") RETURNING id");
        let insert: Id<u32> = qry.build_query_as().fetch_one(&mut *conn).await?;
        drop(conn);
        self.retrieve(insert.id).await
    }
}

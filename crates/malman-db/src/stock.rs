use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{FromRow, QueryBuilder, Sqlite};

use malman_data::{
    BarLogEntry, BarLogFilter, BarLogKind, Delete, Insert, Query, QueryError, Retrieve,
    StockCategory, StockCategoryFilter, StockItem, StockItemFilter, Update,
};

use crate::{
    results::{decimal, Id},
    Connection,
};

#[async_trait]
impl Query<StockCategory> for Connection {
    type Filter = StockCategoryFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<StockCategory>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new("SELECT id, name FROM bar_categories WHERE 1");
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(name) = filter.name.clone() {
            qry.push(" AND name = ").push_bind(name);
        }
        qry.push(" ORDER BY name");
        let categories: Vec<StockCategory> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(categories)
    }
}

#[async_trait]
impl Retrieve<StockCategory> for Connection {
    type Key = u32;

    async fn retrieve(&self, id: Self::Key) -> Result<StockCategory> {
        let category = self
            .query(&StockCategoryFilter {
                id: Some(id),
                ..Default::default()
            })
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(category)
    }
}

#[async_trait]
impl Insert<StockCategory> for Connection {
    async fn insert(&self, category: StockCategory) -> Result<StockCategory> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new("INSERT INTO bar_categories (name) VALUES (");
        qry.push_bind(&category.name).push(") RETURNING id");
        let insert: Id<u32> = qry.build_query_as().fetch_one(&mut *conn).await?;
        drop(conn);
        self.retrieve(insert.id).await
    }
}

#[derive(FromRow)]
struct StockItemRow {
    id: u32,
    name: String,
    stock_max: u32,
    price: String,
    category_id: u32,
    josto: bool,
}

impl TryFrom<StockItemRow> for StockItem {
    type Error = anyhow::Error;

    fn try_from(row: StockItemRow) -> Result<Self> {
        Ok(StockItem {
            id: row.id,
            name: row.name,
            stock_max: row.stock_max,
            price: decimal(&row.price)?,
            category_id: row.category_id,
            josto: row.josto,
        })
    }
}

#[async_trait]
impl Query<StockItem> for Connection {
    type Filter = StockItemFilter;

    /// Stock items grouped by category, then by name
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<StockItem>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                name,
                stock_max,
                price,
                category_id,
                josto
            FROM bar_items
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(name) = filter.name.clone() {
            qry.push(" AND name = ").push_bind(name);
        }
        if let Some(category_id) = filter.category_id {
            qry.push(" AND category_id = ").push_bind(category_id);
        }
        qry.push(" ORDER BY category_id, name");
        let rows: Vec<StockItemRow> = qry.build_query_as().fetch_all(&mut *conn).await?;
        rows.into_iter().map(StockItem::try_from).collect()
    }
}

#[async_trait]
impl Retrieve<StockItem> for Connection {
    type Key = u32;

    async fn retrieve(&self, id: Self::Key) -> Result<StockItem> {
        let item = self
            .query(&StockItemFilter {
                id: Some(id),
                ..Default::default()
            })
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(item)
    }
}

#[async_trait]
impl Insert<StockItem> for Connection {
    async fn insert(&self, item: StockItem) -> Result<StockItem> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "INSERT INTO bar_items (name, stock_max, price, category_id, josto) VALUES (",
        );
        qry.separated(", ")
            .push_bind(&item.name)
            .push_bind(item.stock_max)
            .push_bind(item.price.to_string())
            .push_bind(item.category_id)
            .push_bind(item.josto);
        qry.push(") RETURNING id");
        let insert: Id<u32> = qry.build_query_as().fetch_one(&mut *conn).await?;
        drop(conn);
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<StockItem> for Connection {
    async fn update(&self, item: StockItem) -> Result<StockItem> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new("UPDATE bar_items SET");
        qry.push(" name = ")
            .push_bind(&item.name)
            .push(", stock_max = ")
            .push_bind(item.stock_max)
            .push(", price = ")
            .push_bind(item.price.to_string())
            .push(", category_id = ")
            .push_bind(item.category_id)
            .push(", josto = ")
            .push_bind(item.josto)
            .push(" WHERE id = ")
            .push_bind(item.id);
        qry.build().execute(&mut *conn).await?;
        drop(conn);
        self.retrieve(item.id).await
    }
}

#[derive(FromRow)]
struct BarLogRow {
    id: u32,
    item_id: u32,
    amount: i32,
    total_price: String,
    datetime: NaiveDateTime,
    member_id: u32,
    kind: BarLogKind,
}

impl TryFrom<BarLogRow> for BarLogEntry {
    type Error = anyhow::Error;

    fn try_from(row: BarLogRow) -> Result<Self> {
        Ok(BarLogEntry {
            id: row.id,
            item_id: row.item_id,
            amount: row.amount,
            total_price: decimal(&row.total_price)?,
            datetime: row.datetime,
            member_id: row.member_id,
            kind: row.kind,
        })
    }
}

#[async_trait]
impl Query<BarLogEntry> for Connection {
    type Filter = BarLogFilter;

    /// The bar log, most recent entry first
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<BarLogEntry>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                item_id,
                amount,
                total_price,
                datetime,
                member_id,
                kind
            FROM bar_log
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(item_id) = filter.item_id {
            qry.push(" AND item_id = ").push_bind(item_id);
        }
        if let Some(member_id) = filter.member_id {
            qry.push(" AND member_id = ").push_bind(member_id);
        }
        qry.push(" ORDER BY datetime DESC, id DESC");
        let rows: Vec<BarLogRow> = qry.build_query_as().fetch_all(&mut *conn).await?;
        rows.into_iter().map(BarLogEntry::try_from).collect()
    }
}

#[async_trait]
impl Retrieve<BarLogEntry> for Connection {
    type Key = u32;

    async fn retrieve(&self, id: Self::Key) -> Result<BarLogEntry> {
        let entry = self
            .query(&BarLogFilter {
                id: Some(id),
                ..Default::default()
            })
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(entry)
    }
}

#[async_trait]
impl Insert<BarLogEntry> for Connection {
    async fn insert(&self, entry: BarLogEntry) -> Result<BarLogEntry> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "INSERT INTO bar_log (item_id, amount, total_price, datetime, member_id, kind) VALUES (",
        );
        qry.separated(", ")
            .push_bind(entry.item_id)
            .push_bind(entry.amount)
            .push_bind(entry.total_price.to_string())
            .push_bind(entry.datetime)
            .push_bind(entry.member_id)
            .push_bind(entry.kind);
        qry.push(") RETURNING id");
        let insert: Id<u32> = qry.build_query_as().fetch_one(&mut *conn).await?;
        drop(conn);
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Delete<BarLogEntry> for Connection {
    async fn delete(&self, entry: BarLogEntry) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM bar_log WHERE id = ")
            .push_bind(entry.id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use malman_data::{Category, CategoryFilter, Insert, Query, QueryError, Retrieve};

use crate::{results::Id, Connection};

#[async_trait]
impl Query<Category> for Connection {
    type Filter = CategoryFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Category>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                name,
                legal_category,
                is_revenue,
                purpose
            FROM categories
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(is_revenue) = filter.is_revenue {
            qry.push(" AND is_revenue = ").push_bind(is_revenue);
        }
        qry.push(" ORDER BY id");
        let categories: Vec<Category> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(categories)
    }
}

#[async_trait]
impl Retrieve<Category> for Connection {
    type Key = u32;

    async fn retrieve(&self, id: Self::Key) -> Result<Category> {
        let category = self
            .query(&CategoryFilter {
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
impl Insert<Category> for Connection {
    async fn insert(&self, category: Category) -> Result<Category> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "INSERT INTO categories (name, legal_category, is_revenue, purpose) VALUES (",
        );
        qry.separated(", ")
            .push_bind(&category.name)
            .push_bind(&category.legal_category)
            .push_bind(category.is_revenue)
            .push_bind(category.purpose);
        qry.push(") RETURNING id");
        let insert: Id<u32> = qry.build_query_as().fetch_one(&mut *conn).await?;
        drop(conn);
        self.retrieve(insert.id).await
    }
}

#[cfg(test)]
mod tests {
    use malman_data::CategoryPurpose;

    use super::*;

    #[tokio::test]
    async fn test_category_insert_and_filter() {
        let db = Connection::open_test().await;
        let bar = db
            .insert(Category {
                name: "bar account top-up".to_string(),
                legal_category: "Bar".to_string(),
                is_revenue: true,
                purpose: CategoryPurpose::BarTopup,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(bar.purpose, CategoryPurpose::BarTopup);

        db.insert(Category {
            name: "rent".to_string(),
            legal_category: "Huur".to_string(),
            is_revenue: false,
            ..Default::default()
        })
        .await
        .unwrap();

        let revenues: Vec<Category> = db
            .query(&CategoryFilter {
                is_revenue: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(revenues, vec![bar]);
    }
}

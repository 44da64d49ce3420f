use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use malman_data::{Attachment, AttachmentFilter, Delete, Insert, Query, QueryError, Retrieve};

use crate::{results::Id, Connection};

#[async_trait]
impl Query<Attachment> for Connection {
    type Filter = AttachmentFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Attachment>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "SELECT id, transaction_id, filename FROM attachments WHERE 1",
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(transaction_id) = filter.transaction_id {
            qry.push(" AND transaction_id = ").push_bind(transaction_id);
        }
        if let Some(filename) = filter.filename.clone() {
            qry.push(" AND filename = ").push_bind(filename);
        }
        qry.push(" ORDER BY id");
        let attachments: Vec<Attachment> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(attachments)
    }
}

#[async_trait]
impl Retrieve<Attachment> for Connection {
    type Key = u32;

    async fn retrieve(&self, id: Self::Key) -> Result<Attachment> {
        let attachment = self
            .query(&AttachmentFilter {
                id: Some(id),
                ..Default::default()
            })
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(attachment)
    }
}

#[async_trait]
impl Insert<Attachment> for Connection {
    async fn insert(&self, attachment: Attachment) -> Result<Attachment> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "INSERT INTO attachments (transaction_id, filename) VALUES (",
        );
        qry.separated(", ")
            .push_bind(attachment.transaction_id)
            .push_bind(&attachment.filename);
        qry.push(") RETURNING id");
        let insert: Id<u32> = qry.build_query_as().fetch_one(&mut *conn).await?;
        drop(conn);

        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Delete<Attachment> for Connection {
    async fn delete(&self, attachment: Attachment) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM attachments WHERE id = ")
            .push_bind(attachment.id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use malman_data::Transaction;

    use super::*;

    #[tokio::test]
    async fn test_attachments_of_transaction() {
        let db = Connection::open_test().await;
        let tx = db.insert(Transaction::default()).await.unwrap();
        let other = db.insert(Transaction::default()).await.unwrap();

        for filename in ["invoice.pdf", "receipt.jpg"] {
            db.insert(Attachment {
                transaction_id: tx.id,
                filename: filename.to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        }
        db.insert(Attachment {
            transaction_id: other.id,
            filename: "other.pdf".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        let attachments = tx.get_attachments(&db).await.unwrap();
        let names: Vec<&str> = attachments.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["invoice.pdf", "receipt.jpg"]);

        db.delete(attachments[0].clone()).await.unwrap();
        assert_eq!(tx.get_attachments(&db).await.unwrap().len(), 1);
    }
}

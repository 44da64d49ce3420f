use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use malman_data::{
    BarAccountLog, BarAccountLogFilter, Insert, MembershipFee, MembershipFeeFilter, Query,
    QueryError, Retrieve,
};

use crate::{results::Id, Connection};

#[async_trait]
impl Query<MembershipFee> for Connection {
    type Filter = MembershipFeeFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<MembershipFee>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "SELECT id, member_id, transaction_id, until FROM membership_fees WHERE 1",
        );
        if let Some(member_id) = filter.member_id {
            qry.push(" AND member_id = ").push_bind(member_id);
        }
        qry.push(" ORDER BY id DESC");
        let fees: Vec<MembershipFee> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(fees)
    }
}

#[async_trait]
impl Retrieve<MembershipFee> for Connection {
    type Key = u32;

    async fn retrieve(&self, id: Self::Key) -> Result<MembershipFee> {
        let mut conn = self.lock().await;
        let fee: Option<MembershipFee> = QueryBuilder::<Sqlite>::new(
            "SELECT id, member_id, transaction_id, until FROM membership_fees WHERE id = ",
        )
        .push_bind(id)
        .build_query_as()
        .fetch_optional(&mut *conn)
        .await?;
        Ok(fee.ok_or(QueryError::NotFound)?)
    }
}

#[async_trait]
impl Insert<MembershipFee> for Connection {
    async fn insert(&self, fee: MembershipFee) -> Result<MembershipFee> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "INSERT INTO membership_fees (member_id, transaction_id, until) VALUES (",
        );
        qry.separated(", ")
            .push_bind(fee.member_id)
            .push_bind(fee.transaction_id)
            .push_bind(fee.until);
        qry.push(") RETURNING id");
        let insert: Id<u32> = qry.build_query_as().fetch_one(&mut *conn).await?;
        drop(conn);

        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Query<BarAccountLog> for Connection {
    type Filter = BarAccountLogFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<BarAccountLog>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "SELECT id, member_id, transaction_id FROM bar_account_log WHERE 1",
        );
        if let Some(member_id) = filter.member_id {
            qry.push(" AND member_id = ").push_bind(member_id);
        }
        if let Some(transaction_id) = filter.transaction_id {
            qry.push(" AND transaction_id = ").push_bind(transaction_id);
        }
        qry.push(" ORDER BY id");
        let log: Vec<BarAccountLog> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(log)
    }
}

#[async_trait]
impl Retrieve<BarAccountLog> for Connection {
    type Key = u32;

    async fn retrieve(&self, id: Self::Key) -> Result<BarAccountLog> {
        let mut conn = self.lock().await;
        let entry: Option<BarAccountLog> = QueryBuilder::<Sqlite>::new(
            "SELECT id, member_id, transaction_id FROM bar_account_log WHERE id = ",
        )
        .push_bind(id)
        .build_query_as()
        .fetch_optional(&mut *conn)
        .await?;
        Ok(entry.ok_or(QueryError::NotFound)?)
    }
}

#[async_trait]
impl Insert<BarAccountLog> for Connection {
    async fn insert(&self, entry: BarAccountLog) -> Result<BarAccountLog> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "INSERT INTO bar_account_log (member_id, transaction_id) VALUES (",
        );
        qry.separated(", ")
            .push_bind(entry.member_id)
            .push_bind(entry.transaction_id);
        qry.push(") RETURNING id");
        let insert: Id<u32> = qry.build_query_as().fetch_one(&mut *conn).await?;
        drop(conn);

        self.retrieve(insert.id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use malman_data::{Member, Transaction};

    use super::*;

    #[tokio::test]
    async fn test_membership_fee_insert_and_filter() {
        let db = Connection::open_test().await;
        let tx = db.insert(Transaction::default()).await.unwrap();
        let m1 = db
            .insert(Member {
                name: "Member 1".to_string(),
                email: "m1@mal.be".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let m2 = db
            .insert(Member {
                name: "Member 2".to_string(),
                email: "m2@mal.be".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let until = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        let fee = db
            .insert(MembershipFee {
                member_id: m1.id,
                transaction_id: tx.id,
                until,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(fee.id > 0);
        assert_eq!(fee.until, until);

        db.insert(MembershipFee {
            member_id: m2.id,
            transaction_id: tx.id,
            until,
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(m1.get_membership_fees(&db).await.unwrap(), vec![fee]);
        let all: Vec<MembershipFee> = db.query(&MembershipFeeFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_bar_account_log_insert() {
        let db = Connection::open_test().await;
        let tx = db.insert(Transaction::default()).await.unwrap();
        let member = db
            .insert(Member {
                name: "Thirsty".to_string(),
                email: "bar@mal.be".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let entry = db
            .insert(BarAccountLog {
                member_id: member.id,
                transaction_id: tx.id,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(member.get_bar_topups(&db).await.unwrap(), vec![entry]);
    }
}

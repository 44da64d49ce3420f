use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use malman_data::{Delete, Insert, Member, MemberFilter, Query, QueryError, Retrieve, Role, Update};

use crate::{
    results::{decimal, Id},
    Connection,
};

#[derive(FromRow)]
struct MemberRow {
    id: u32,
    name: String,
    email: String,
    active_member: bool,
    member_since: Option<NaiveDate>,
    membership_dues: String,
    roles: Option<String>,
}

impl TryFrom<MemberRow> for Member {
    type Error = anyhow::Error;

    fn try_from(row: MemberRow) -> Result<Self> {
        let roles = row
            .roles
            .unwrap_or_default()
            .split(',')
            .filter(|r| !r.is_empty())
            .map(|r| r.parse())
            .collect::<Result<Vec<Role>>>()?;
        Ok(Member {
            id: row.id,
            name: row.name,
            email: row.email,
            active_member: row.active_member,
            member_since: row.member_since,
            membership_dues: decimal(&row.membership_dues)?,
            roles,
        })
    }
}

/// Replace the roles of a member
async fn store_roles(conn: &mut SqliteConnection, member_id: u32, roles: &[Role]) -> Result<()> {
    QueryBuilder::<Sqlite>::new("DELETE FROM member_roles WHERE member_id = ")
        .push_bind(member_id)
        .build()
        .execute(&mut *conn)
        .await?;
    for role in roles {
        QueryBuilder::<Sqlite>::new("INSERT OR IGNORE INTO member_roles (member_id, role) VALUES (")
            .push_bind(member_id)
            .push(", ")
            .push_bind(*role)
            .push(")")
            .build()
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl Query<Member> for Connection {
    type Filter = MemberFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Member>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                name,
                email,
                active_member,
                member_since,
                membership_dues,
                (SELECT GROUP_CONCAT(role) FROM member_roles r
                  WHERE r.member_id = members.id) AS roles
            FROM members
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(name) = filter.name.clone() {
            qry.push(" AND name LIKE ").push_bind(format!("%{}%", name));
        }
        if let Some(email) = filter.email.clone() {
            qry.push(" AND email LIKE ").push_bind(email);
        }
        qry.push(" ORDER BY name, id");

        let rows: Vec<MemberRow> = qry.build_query_as().fetch_all(&mut *conn).await?;
        rows.into_iter().map(Member::try_from).collect()
    }
}

#[async_trait]
impl Retrieve<Member> for Connection {
    type Key = u32;

    async fn retrieve(&self, member_id: Self::Key) -> Result<Member> {
        let filter = MemberFilter {
            id: Some(member_id),
            ..Default::default()
        };
        let member = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(member)
    }
}

#[async_trait]
impl Insert<Member> for Connection {
    async fn insert(&self, member: Member) -> Result<Member> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"INSERT INTO members (
                name,
                email,
                active_member,
                member_since,
                membership_dues
            ) VALUES (
            "#,
        );
        qry.separated(", ")
            .push_bind(&member.name)
            .push_bind(&member.email)
            .push_bind(member.active_member)
            .push_bind(member.member_since)
            .push_bind(member.membership_dues.to_string());
        qry.push(") RETURNING id ");
        let insert: Id<u32> = qry.build_query_as().fetch_one(&mut *conn).await?;
        store_roles(&mut conn, insert.id, &member.roles).await?;
        drop(conn);

        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<Member> for Connection {
    /// Update member
    async fn update(&self, member: Member) -> Result<Member> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE members SET")
                .push(" name = ")
                .push_bind(&member.name)
                .push(", email = ")
                .push_bind(&member.email)
                .push(", active_member = ")
                .push_bind(member.active_member)
                .push(", member_since = ")
                .push_bind(member.member_since)
                .push(", membership_dues = ")
                .push_bind(member.membership_dues.to_string())
                .push(" WHERE id = ")
                .push_bind(member.id)
                .build()
                .execute(&mut *conn)
                .await?;
            store_roles(&mut conn, member.id, &member.roles).await?;
        }
        self.retrieve(member.id).await
    }
}

#[async_trait]
impl Delete<Member> for Connection {
    /// Delete member
    async fn delete(&self, member: Member) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM members WHERE id = ")
            .push_bind(member.id)
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
    async fn test_member_insert() {
        let db = Connection::open_test().await;
        let since = NaiveDate::from_ymd_opt(2019, 5, 1).unwrap();
        let member = Member {
            name: "Test Member".to_string(),
            email: "mail@test-member.mal".to_string(),
            active_member: true,
            member_since: Some(since),
            membership_dues: dec!(15.00),
            roles: vec![Role::Member, Role::Finances],
            ..Member::default()
        };
        let member = db.insert(member).await.unwrap();

        assert!(member.id > 0);
        assert_eq!(member.name, "Test Member");
        assert_eq!(member.email, "mail@test-member.mal");
        assert!(member.active_member);
        assert_eq!(member.member_since, Some(since));
        assert_eq!(member.membership_dues, dec!(15));
        assert!(member.has_role(Role::Member));
        assert!(member.has_role(Role::Finances));
    }

    #[tokio::test]
    async fn test_member_update() {
        let db = Connection::open_test().await;
        let member = Member {
            name: "Test Member".to_string(),
            email: "mal@hackerspace.be".to_string(),
            roles: vec![Role::Member],
            ..Member::default()
        };
        let mut member = db.insert(member).await.unwrap();
        member.name = "Test Member Updated".to_string();
        member.email = "new@email".to_string();
        member.roles = vec![Role::Finances];
        member.membership_dues = dec!(20);

        let member = db.update(member).await.unwrap();
        assert_eq!(member.name, "Test Member Updated");
        assert_eq!(member.email, "new@email");
        assert_eq!(member.roles, vec![Role::Finances]);
        assert_eq!(member.membership_dues, dec!(20));
    }

    #[tokio::test]
    async fn test_member_query_name_like() {
        let db = Connection::open_test().await;
        db.insert(Member {
            name: "Test Member 1".to_string(),
            email: "test1@mal.be".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
        db.insert(Member {
            name: "Test Member 2".to_string(),
            email: "test2@mal.be".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        let members: Vec<Member> = db
            .query(&MemberFilter {
                name: Some("mEmBer 2".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Test Member 2");
        assert!(members[0].roles.is_empty());
    }

    #[tokio::test]
    async fn test_member_delete() {
        let db = Connection::open_test().await;
        let member = db
            .insert(Member {
                name: "Test Member".to_string(),
                email: "gone@mal.be".to_string(),
                roles: vec![Role::Member],
                ..Default::default()
            })
            .await
            .unwrap();
        let id = member.id;
        db.delete(member).await.unwrap();

        let result: Result<Member> = db.retrieve(id).await;
        assert!(result.is_err());
    }
}

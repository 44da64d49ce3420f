use chrono::NaiveDate;
use rust_decimal::Decimal;

use malman_data::{CashTransaction, Delete, Insert, Member, Retrieve, Role};

use crate::{permissions, AccountingError, FormErrors};

/// Add an entry to the cash register log.
pub async fn record_cash<DB>(
    db: &DB,
    treasurer: &Member,
    date: NaiveDate,
    amount: Decimal,
    description: &str,
) -> Result<CashTransaction, AccountingError>
where
    DB: Insert<CashTransaction> + Send + Sync,
{
    permissions::require(treasurer, Role::Finances)?;
    let description = description.trim();
    if description.is_empty() {
        let mut errors = FormErrors::default();
        errors.push("description", "this field is required");
        return Err(errors.into());
    }

    let entry = db
        .insert(CashTransaction {
            date,
            amount,
            description: description.to_string(),
            ..Default::default()
        })
        .await?;
    tracing::info!(entry = entry.id, amount = %entry.amount, "cash register entry added");
    Ok(entry)
}

/// Take an entry out of the cash register log. Entries are never
/// edited, a wrong entry is removed and added again.
pub async fn remove_cash<DB>(
    db: &DB,
    treasurer: &Member,
    entry_id: u32,
) -> Result<CashTransaction, AccountingError>
where
    DB: Retrieve<CashTransaction, Key = u32> + Delete<CashTransaction> + Send + Sync,
{
    permissions::require(treasurer, Role::Finances)?;
    let entry: CashTransaction = db.retrieve(entry_id).await?;
    db.delete(entry.clone()).await?;
    tracing::info!(entry = entry.id, amount = %entry.amount, "cash register entry removed");
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use malman_db::Connection;
    use rust_decimal_macros::dec;

    use super::*;

    #[tokio::test]
    async fn test_record_and_remove_cash() {
        let db = Connection::open_test().await;
        let treasurer = db
            .insert(Member {
                name: "Treasurer".to_string(),
                email: "finances@mal.be".to_string(),
                roles: vec![Role::Finances],
                ..Default::default()
            })
            .await
            .unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let result = record_cash(&db, &treasurer, today, dec!(5), "  ").await;
        assert!(matches!(result, Err(AccountingError::Invalid(_))));

        let entry = record_cash(&db, &treasurer, today, dec!(5), "bar takings")
            .await
            .unwrap();
        assert_eq!(entry.description, "bar takings");

        let removed = remove_cash(&db, &treasurer, entry.id).await.unwrap();
        assert_eq!(removed, entry);
        let result = remove_cash(&db, &treasurer, entry.id).await;
        assert!(matches!(result, Err(AccountingError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_cash_needs_finances() {
        let db = Connection::open_test().await;
        let member = Member {
            name: "Member".to_string(),
            roles: vec![Role::Member],
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let result = record_cash(&db, &member, today, dec!(5), "bar").await;
        assert!(matches!(result, Err(AccountingError::Forbidden(_, Role::Finances))));
    }
}

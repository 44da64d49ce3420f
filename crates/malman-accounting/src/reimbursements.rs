use chrono::NaiveDate;

use malman_data::{
    Bank, Category, FilePending, Insert, Member, Query, Retrieve, Role, Transaction,
    TransactionFilter,
};

use crate::{
    forms::{Approval, ReimbursementRequest, TransactionFields},
    permissions, AccountingError,
};

/// File a request for reimbursement on behalf of `member`. The
/// resulting expense stays pending until it is approved.
pub async fn request_reimbursement<DB>(
    db: &DB,
    member: &Member,
    request: ReimbursementRequest,
) -> Result<Transaction, AccountingError>
where
    DB: Insert<Transaction> + Send + Sync,
{
    permissions::require(member, Role::Member)?;
    request.validate()?;

    let tx = db
        .insert(Transaction {
            advance_date: Some(request.advance_date),
            is_revenue: false,
            amount: request.amount,
            description: request.description,
            reimbursement_comments: request.comments,
            to_from: member.name.clone(),
            ..Default::default()
        })
        .await?;
    tracing::info!(transaction = tx.id, member = %member.name, amount = %tx.amount,
        "reimbursement requested");
    Ok(tx)
}

/// Requests waiting for approval
pub async fn pending_reimbursements<DB>(db: &DB) -> Result<Vec<Transaction>, AccountingError>
where
    DB: Query<Transaction, Filter = TransactionFilter> + Send + Sync,
{
    Ok(db.query(&TransactionFilter::pending()).await?)
}

/// Approve a pending request. The transaction is filed today by
/// the approver. Approving a request someone else filed in the
/// meantime fails instead of overwriting it.
pub async fn approve_reimbursement<DB>(
    db: &DB,
    approver: &Member,
    transaction_id: u32,
    approval: Approval,
    today: NaiveDate,
) -> Result<Transaction, AccountingError>
where
    DB: Retrieve<Transaction, Key = u32>
        + Retrieve<Category, Key = u32>
        + Retrieve<Bank, Key = u32>
        + FilePending<Transaction>
        + Send
        + Sync,
{
    permissions::require(approver, Role::Finances)?;
    let tx: Transaction = db.retrieve(transaction_id).await?;
    if tx.is_filed() {
        return Err(AccountingError::AlreadyFiled(transaction_id));
    }

    let fields: TransactionFields = approval.into();
    fields.check(db).await?;

    let tx = Transaction {
        date: Some(fields.date),
        facturation_date: Some(fields.resolved_facturation_date()),
        amount: fields.amount,
        to_from: fields.to_from,
        description: fields.description,
        category_id: Some(fields.category_id),
        bank_id: Some(fields.bank_id),
        bank_statement_number: fields.bank_statement_number,
        date_filed: Some(today),
        filed_by_id: Some(approver.id),
        ..tx
    };
    if !db.file_pending(tx).await? {
        return Err(AccountingError::AlreadyFiled(transaction_id));
    }
    tracing::info!(transaction = transaction_id, approver = %approver.name, "reimbursement filed");

    let filed: Transaction = db.retrieve(transaction_id).await?;
    Ok(filed)
}

#[cfg(test)]
mod tests {
    use malman_data::CategoryPurpose;
    use malman_db::Connection;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        db: Connection,
        member: Member,
        treasurer: Member,
        bank: Bank,
        expense: Category,
        revenue: Category,
    }

    async fn fixture() -> Fixture {
        let db = Connection::open_test().await;
        let member = db
            .insert(Member {
                name: "Test Member".to_string(),
                email: "member@mal.be".to_string(),
                active_member: true,
                roles: vec![Role::Member],
                ..Default::default()
            })
            .await
            .unwrap();
        let treasurer = db
            .insert(Member {
                name: "Treasurer".to_string(),
                email: "finances@mal.be".to_string(),
                active_member: true,
                roles: vec![Role::Finances],
                ..Default::default()
            })
            .await
            .unwrap();
        let bank = db
            .insert(Bank {
                name: "Triodos".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let expense = db
            .insert(Category {
                name: "bar purchases".to_string(),
                legal_category: "Aankopen".to_string(),
                is_revenue: false,
                purpose: CategoryPurpose::General,
                ..Default::default()
            })
            .await
            .unwrap();
        let revenue = db
            .insert(Category {
                name: "donations".to_string(),
                legal_category: "Giften".to_string(),
                is_revenue: true,
                ..Default::default()
            })
            .await
            .unwrap();
        Fixture {
            db,
            member,
            treasurer,
            bank,
            expense,
            revenue,
        }
    }

    fn request() -> ReimbursementRequest {
        ReimbursementRequest {
            advance_date: date(2024, 3, 1),
            amount: dec!(23.40),
            description: "Club-Mate".to_string(),
            comments: Some("cash please".to_string()),
        }
    }

    fn approval(f: &Fixture) -> Approval {
        Approval {
            date: date(2024, 3, 5),
            amount: dec!(-23.40),
            description: "Club-Mate".to_string(),
            to_from: "Test Member".to_string(),
            category_id: f.expense.id,
            bank_id: f.bank.id,
            bank_statement_number: Some(3),
        }
    }

    #[tokio::test]
    async fn test_request_creates_pending_expense() {
        let f = fixture().await;
        let tx = request_reimbursement(&f.db, &f.member, request()).await.unwrap();

        assert!(!tx.is_filed());
        assert!(!tx.is_revenue);
        assert_eq!(tx.to_from, "Test Member");
        assert_eq!(tx.advance_date, Some(date(2024, 3, 1)));
        assert_eq!(tx.reimbursement_comments, Some("cash please".to_string()));

        let pending = pending_reimbursements(&f.db).await.unwrap();
        assert_eq!(pending, vec![tx]);
    }

    #[tokio::test]
    async fn test_pending_not_in_ledger_until_approved() {
        let f = fixture().await;
        let tx = request_reimbursement(&f.db, &f.member, request()).await.unwrap();

        let ledger: Vec<Transaction> = f.db.query(&TransactionFilter::ledger()).await.unwrap();
        assert!(ledger.is_empty());

        let filed = approve_reimbursement(&f.db, &f.treasurer, tx.id, approval(&f), date(2024, 3, 6))
            .await
            .unwrap();
        assert_eq!(filed.date_filed, Some(date(2024, 3, 6)));
        assert_eq!(filed.filed_by_id, Some(f.treasurer.id));
        assert_eq!(filed.date, Some(date(2024, 3, 5)));
        assert_eq!(filed.facturation_date, Some(date(2024, 3, 5)));
        assert_eq!(filed.bank_id, Some(f.bank.id));
        assert_eq!(filed.amount, dec!(-23.4));
        // Comments of the request survive approval
        assert_eq!(filed.reimbursement_comments, Some("cash please".to_string()));

        let ledger: Vec<Transaction> = f.db.query(&TransactionFilter::ledger()).await.unwrap();
        assert_eq!(ledger, vec![filed]);
        assert!(pending_reimbursements(&f.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_approve_twice_fails() {
        let f = fixture().await;
        let tx = request_reimbursement(&f.db, &f.member, request()).await.unwrap();
        approve_reimbursement(&f.db, &f.treasurer, tx.id, approval(&f), date(2024, 3, 6))
            .await
            .unwrap();
        let result =
            approve_reimbursement(&f.db, &f.treasurer, tx.id, approval(&f), date(2024, 3, 7)).await;
        assert!(matches!(result, Err(AccountingError::AlreadyFiled(id)) if id == tx.id));
    }

    #[tokio::test]
    async fn test_approve_with_revenue_category_rejected() {
        let f = fixture().await;
        let tx = request_reimbursement(&f.db, &f.member, request()).await.unwrap();
        let mut approval = approval(&f);
        approval.category_id = f.revenue.id;
        let result = approve_reimbursement(&f.db, &f.treasurer, tx.id, approval, date(2024, 3, 6)).await;
        match result {
            Err(AccountingError::Invalid(errors)) => assert!(errors.has("category_id")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(pending_reimbursements(&f.db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_member_cannot_approve() {
        let f = fixture().await;
        let tx = request_reimbursement(&f.db, &f.member, request()).await.unwrap();
        let result = approve_reimbursement(&f.db, &f.member, tx.id, approval(&f), date(2024, 3, 6)).await;
        assert!(matches!(result, Err(AccountingError::Forbidden(_, Role::Finances))));
    }

    #[tokio::test]
    async fn test_approve_unknown_transaction() {
        let f = fixture().await;
        let result = approve_reimbursement(&f.db, &f.treasurer, 999, approval(&f), date(2024, 3, 6)).await;
        assert!(matches!(result, Err(AccountingError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_former_member_cannot_request() {
        let f = fixture().await;
        let former = Member {
            active_member: false,
            ..f.member.clone()
        };
        let result = request_reimbursement(&f.db, &former, request()).await;
        assert!(matches!(result, Err(AccountingError::Forbidden(_, Role::Member))));
        assert!(pending_reimbursements(&f.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_validation() {
        let f = fixture().await;
        let mut bad = request();
        bad.description = String::new();
        let result = request_reimbursement(&f.db, &f.member, bad).await;
        assert!(matches!(result, Err(AccountingError::Invalid(_))));
        assert!(pending_reimbursements(&f.db).await.unwrap().is_empty());
    }
}

use chrono::NaiveDate;

use malman_data::{Bank, Category, CategoryPurpose, Insert, Member, Retrieve, Role, Transaction};

use crate::{forms::TransactionFields, permissions, AccountingError};

/// The step that has to follow filing a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    None,
    TopUpBarAccount(u32),
    FileMembershipFee(u32),
}

#[derive(Debug, Clone)]
pub struct Filed {
    pub transaction: Transaction,
    pub follow_up: FollowUp,
}

/// File a transaction directly into the ledger.
pub async fn add_transaction<DB>(
    db: &DB,
    filer: &Member,
    fields: TransactionFields,
    today: NaiveDate,
) -> Result<Filed, AccountingError>
where
    DB: Retrieve<Category, Key = u32> + Retrieve<Bank, Key = u32> + Insert<Transaction> + Send + Sync,
{
    permissions::require(filer, Role::Finances)?;
    let category = fields.check(db).await?;

    let transaction = db
        .insert(Transaction {
            date: Some(fields.date),
            facturation_date: Some(fields.resolved_facturation_date()),
            is_revenue: fields.is_revenue,
            amount: fields.amount,
            to_from: fields.to_from,
            description: fields.description,
            category_id: Some(fields.category_id),
            bank_id: Some(fields.bank_id),
            bank_statement_number: fields.bank_statement_number,
            date_filed: Some(today),
            filed_by_id: Some(filer.id),
            ..Default::default()
        })
        .await?;
    tracing::info!(transaction = transaction.id, filer = %filer.name, amount = %transaction.amount,
        "transaction filed");

    let follow_up = match category.purpose {
        CategoryPurpose::General => FollowUp::None,
        CategoryPurpose::BarTopup => FollowUp::TopUpBarAccount(transaction.id),
        CategoryPurpose::MembershipFee => FollowUp::FileMembershipFee(transaction.id),
    };
    Ok(Filed {
        transaction,
        follow_up,
    })
}

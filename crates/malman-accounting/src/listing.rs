use malman_data::{
    CashTransaction, CashTransactionFilter, Member, MembershipFee, MembershipFeeFilter, Page,
    Query, Transaction, TransactionFilter,
};

use crate::AccountingError;

/// Narrowing of the general ledger
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    pub is_revenue: Option<bool>,
    pub bank_id: Option<u32>,
    pub category_id: Option<u32>,
}

impl From<&LedgerFilter> for TransactionFilter {
    fn from(filter: &LedgerFilter) -> Self {
        TransactionFilter {
            is_revenue: filter.is_revenue,
            bank_id: filter.bank_id,
            category_id: filter.category_id,
            ..TransactionFilter::ledger()
        }
    }
}

/// One page of filed transactions, most recent first. Pending
/// reimbursement requests never show up here.
pub async fn general_ledger<DB>(
    db: &DB,
    filter: &LedgerFilter,
    page: usize,
    per_page: usize,
) -> Result<Page<Transaction>, AccountingError>
where
    DB: Query<Transaction, Filter = TransactionFilter> + Send + Sync,
{
    let filter: TransactionFilter = filter.into();
    let transactions: Vec<Transaction> = db.query(&filter).await?;
    Ok(Page::slice(transactions, page, per_page)?)
}

/// Membership fees, most recent first, optionally of one member
pub async fn membership_fee_log<DB>(
    db: &DB,
    member: Option<&Member>,
    page: usize,
    per_page: usize,
) -> Result<Page<MembershipFee>, AccountingError>
where
    DB: Query<MembershipFee, Filter = MembershipFeeFilter> + Send + Sync,
{
    let fees: Vec<MembershipFee> = db
        .query(&MembershipFeeFilter {
            member_id: member.map(|m| m.id),
        })
        .await?;
    Ok(Page::slice(fees, page, per_page)?)
}

/// The cash register log, newest entries first
pub async fn cash_log<DB>(
    db: &DB,
    page: usize,
    per_page: usize,
) -> Result<Page<CashTransaction>, AccountingError>
where
    DB: Query<CashTransaction, Filter = CashTransactionFilter> + Send + Sync,
{
    let entries: Vec<CashTransaction> = db.query(&CashTransactionFilter::default()).await?;
    Ok(Page::slice(entries, page, per_page)?)
}

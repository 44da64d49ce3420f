use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Attachment, AttachmentFilter, Query};

/// Transaction filters. Every field narrows the result.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub id: Option<u32>,
    /// Some(true) for filed transactions, Some(false) for
    /// pending reimbursement requests.
    pub filed: Option<bool>,
    pub is_revenue: Option<bool>,
    pub bank_id: Option<u32>,
    pub category_id: Option<u32>,
    pub has_facturation_date: Option<bool>,
}

impl TransactionFilter {
    /// Filed transactions as listed in the general ledger.
    pub fn ledger() -> Self {
        Self {
            filed: Some(true),
            ..Default::default()
        }
    }

    /// Reimbursement requests waiting for approval.
    pub fn pending() -> Self {
        Self {
            filed: Some(false),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u32,
    pub date: Option<NaiveDate>,
    pub facturation_date: Option<NaiveDate>,
    pub advance_date: Option<NaiveDate>,
    pub is_revenue: bool,
    pub amount: Decimal,
    pub description: String,
    pub to_from: String,
    pub category_id: Option<u32>,
    pub bank_id: Option<u32>,
    pub bank_statement_number: Option<u32>,
    pub date_filed: Option<NaiveDate>,
    pub filed_by_id: Option<u32>,
    pub reimbursement_comments: Option<String>,
}

impl Transaction {
    /// A transaction without a filing date is a reimbursement
    /// request waiting for approval.
    pub fn is_filed(&self) -> bool {
        self.date_filed.is_some()
    }

    /// Get the attachments of the transaction in the order
    /// they were added.
    pub async fn get_attachments<DB>(&self, db: &DB) -> Result<Vec<Attachment>>
    where
        DB: Query<Attachment, Filter = AttachmentFilter>,
    {
        db.query(&AttachmentFilter {
            transaction_id: Some(self.id),
            ..Default::default()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_is_filed() {
        let mut tx = Transaction::default();
        assert!(!tx.is_filed());
        tx.date_filed = NaiveDate::from_ymd_opt(2024, 1, 3);
        assert!(tx.is_filed());
    }
}

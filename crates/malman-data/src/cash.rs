use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CashTransactionFilter {
    pub id: Option<u32>,
}

/// An entry in the cash register log. Entries are only
/// ever inserted or removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashTransaction {
    pub id: u32,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
}

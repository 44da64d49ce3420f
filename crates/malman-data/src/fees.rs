use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MembershipFeeFilter {
    pub member_id: Option<u32>,
}

/// A filed payment of membership dues, settling them
/// up to and including `until`.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct MembershipFee {
    pub id: u32,
    pub member_id: u32,
    pub transaction_id: u32,
    pub until: NaiveDate,
}

impl MembershipFee {
    /// Get a description for the membership fee payment.
    pub fn describe(&self) -> String {
        format!("Membership dues paid until the end of {}", self.until.format("%Y-%m"))
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BarAccountLogFilter {
    pub member_id: Option<u32>,
    pub transaction_id: Option<u32>,
}

/// A top-up of a member's bar account, the amount
/// is the amount of the linked transaction.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BarAccountLog {
    pub id: u32,
    pub member_id: u32,
    pub transaction_id: u32,
}

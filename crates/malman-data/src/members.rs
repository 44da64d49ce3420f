use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BarAccountLog, BarAccountLogFilter, MembershipFee, MembershipFeeFilter, Query};

/// Privileges a member can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Finances,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Member => write!(f, "member"),
            Role::Finances => write!(f, "finances"),
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "member" => Ok(Role::Member),
            "finances" => Ok(Role::Finances),
            other => Err(anyhow::anyhow!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemberFilter {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub active_member: bool,
    pub member_since: Option<NaiveDate>,
    pub membership_dues: Decimal,
    pub roles: Vec<Role>,
}

impl Member {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Get the membership fees filed for this member
    pub async fn get_membership_fees<DB>(&self, db: &DB) -> Result<Vec<MembershipFee>>
    where
        DB: Query<MembershipFee, Filter = MembershipFeeFilter>,
    {
        db.query(&MembershipFeeFilter {
            member_id: Some(self.id),
        })
        .await
    }

    /// Get the bar account top-ups of this member
    pub async fn get_bar_topups<DB>(&self, db: &DB) -> Result<Vec<BarAccountLog>>
    where
        DB: Query<BarAccountLog, Filter = BarAccountLogFilter>,
    {
        db.query(&BarAccountLogFilter {
            member_id: Some(self.id),
            ..Default::default()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("finances".parse::<Role>().unwrap(), Role::Finances);
        assert_eq!("member".parse::<Role>().unwrap(), Role::Member);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Finances.to_string(), "finances");
    }

    #[test]
    fn test_member_has_role() {
        let member = Member {
            roles: vec![Role::Member],
            ..Default::default()
        };
        assert!(member.has_role(Role::Member));
        assert!(!member.has_role(Role::Finances));
    }
}

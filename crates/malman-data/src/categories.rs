use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// What filing a transaction in a category leads to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CategoryPurpose {
    #[default]
    General,
    BarTopup,
    MembershipFee,
}

impl fmt::Display for CategoryPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryPurpose::General => write!(f, "general"),
            CategoryPurpose::BarTopup => write!(f, "bar_topup"),
            CategoryPurpose::MembershipFee => write!(f, "membership_fee"),
        }
    }
}

impl FromStr for CategoryPurpose {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "general" => Ok(CategoryPurpose::General),
            "bar_topup" => Ok(CategoryPurpose::BarTopup),
            "membership_fee" => Ok(CategoryPurpose::MembershipFee),
            other => Err(anyhow::anyhow!("unknown category purpose: {}", other)),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CategoryFilter {
    pub id: Option<u32>,
    pub is_revenue: Option<bool>,
}

/// An accounting category. The legal category is the
/// column a transaction is booked under in the ledgers.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    pub legal_category: String,
    pub is_revenue: bool,
    pub purpose: CategoryPurpose,
}

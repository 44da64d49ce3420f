use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StockCategoryFilter {
    pub id: Option<u32>,
    pub name: Option<String>,
}

/// Grouping of bar stock, e.g. soft drinks or snacks
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct StockCategory {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StockItemFilter {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub category_id: Option<u32>,
}

/// Something sold at the bar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: u32,
    pub name: String,
    /// The stock level aimed for when restocking
    pub stock_max: u32,
    pub price: Decimal,
    pub category_id: u32,
    /// Restocked through the josto order instead of a shop run
    pub josto: bool,
}

/// Direction of a stock movement
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BarLogKind {
    #[default]
    Consumption,
    Stockup,
}

impl fmt::Display for BarLogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarLogKind::Consumption => write!(f, "consumption"),
            BarLogKind::Stockup => write!(f, "stockup"),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BarLogFilter {
    pub id: Option<u32>,
    pub item_id: Option<u32>,
    pub member_id: Option<u32>,
}

/// A stock movement. Consumption is logged with a negative
/// amount, so the stock of an item is the sum of its amounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarLogEntry {
    pub id: u32,
    pub item_id: u32,
    pub amount: i32,
    pub total_price: Decimal,
    pub datetime: NaiveDateTime,
    pub member_id: u32,
    pub kind: BarLogKind,
}

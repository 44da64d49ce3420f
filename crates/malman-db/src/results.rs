use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Id<T> {
    pub id: T,
}

/// Amounts are stored as text to keep them exact.
pub fn decimal(value: &str) -> Result<Decimal> {
    Decimal::from_str(value).with_context(|| format!("invalid amount in database: {value}"))
}

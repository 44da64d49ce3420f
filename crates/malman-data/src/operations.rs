//! Storage operations on records.
//!
//! A store implements these per record type. Lookups that find
//! nothing fail with [`crate::QueryError::NotFound`] wrapped in
//! the returned error.

use anyhow::Result;
use async_trait::async_trait;

/// List records matching a filter
#[async_trait]
pub trait Query<T> {
    type Filter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<T>>;
}

/// Store a new record. The returned record carries its id.
#[async_trait]
pub trait Insert<T> {
    async fn insert(&self, item: T) -> Result<T>;
}

#[async_trait]
pub trait Update<T> {
    async fn update(&self, item: T) -> Result<T>;
}

/// Fetch a single record by its key
#[async_trait]
pub trait Retrieve<T> {
    type Key;
    async fn retrieve(&self, key: Self::Key) -> Result<T>;
}

#[async_trait]
pub trait Delete<T> {
    async fn delete(&self, item: T) -> Result<()>;
}

/// Write a record that is still awaiting filing.
///
/// The write only happens while the stored record is pending.
/// Returns `false` when it was filed in the meantime, in which
/// case nothing is changed.
#[async_trait]
pub trait FilePending<T> {
    async fn file_pending(&self, item: T) -> Result<bool>;
}

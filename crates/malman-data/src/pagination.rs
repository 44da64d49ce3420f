use serde::Serialize;

use crate::QueryError;

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

impl<T> Page<T> {
    /// Cut page `page` (starting at 1) out of the full listing.
    /// An empty page is only acceptable as the first one.
    pub fn slice(items: Vec<T>, page: usize, per_page: usize) -> Result<Self, QueryError> {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total = items.len();
        let items: Vec<T> = items
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();
        if items.is_empty() && page != 1 {
            return Err(QueryError::NotFound);
        }
        Ok(Self {
            items,
            page,
            per_page,
            total,
        })
    }

    pub fn pages(&self) -> usize {
        self.total.div_ceil(self.per_page).max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages()
    }
}

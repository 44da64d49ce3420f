//! Bar stock: items for sale, their categories and the log of
//! stock movements the stock levels are computed from.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use malman_data::{
    BarLogEntry, BarLogFilter, BarLogKind, Delete, Insert, Member, Page, Query, Retrieve, Role,
    StockCategory, StockCategoryFilter, StockItem, StockItemFilter, Update,
};

use crate::{permissions, AccountingError, FormErrors};

const REQUIRED: &str = "this field is required";
const POSITIVE: &str = "please enter a positive number";

/// A stock item as entered when adding or editing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItemForm {
    pub name: String,
    pub price: Decimal,
    pub stock_max: i64,
    pub category_id: u32,
    pub josto: bool,
}

impl StockItemForm {
    pub fn from_item(item: &StockItem) -> Self {
        Self {
            name: item.name.clone(),
            price: item.price,
            stock_max: item.stock_max.into(),
            category_id: item.category_id,
            josto: item.josto,
        }
    }

    /// Validate against the selected category and the items with
    /// the same name. `own_id` is the item being edited, if any.
    pub fn validate(
        &self,
        category: Option<&StockCategory>,
        same_name: &[StockItem],
        own_id: Option<u32>,
    ) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        if self.name.trim().is_empty() {
            errors.push("name", REQUIRED);
        }
        if same_name.iter().any(|item| Some(item.id) != own_id) {
            errors.push("name", "There is already a stockitem with this name");
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            errors.push("price", POSITIVE);
        }
        if u32::try_from(self.stock_max).is_err() {
            errors.push("stock_max", POSITIVE);
        }
        if category.is_none() {
            errors.push("category_id", "please pick an existing category");
        }
        errors.into_result()
    }

    fn into_item(self, id: u32) -> StockItem {
        StockItem {
            id,
            name: self.name.trim().to_string(),
            stock_max: u32::try_from(self.stock_max).unwrap_or_default(),
            price: self.price.round_dp(2),
            category_id: self.category_id,
            josto: self.josto,
        }
    }

    async fn check<DB>(&self, db: &DB, own_id: Option<u32>) -> Result<(), AccountingError>
    where
        DB: Query<StockItem, Filter = StockItemFilter>
            + Query<StockCategory, Filter = StockCategoryFilter>
            + Send
            + Sync,
    {
        let same_name: Vec<StockItem> = db
            .query(&StockItemFilter {
                name: Some(self.name.trim().to_string()),
                ..Default::default()
            })
            .await?;
        let categories: Vec<StockCategory> = db
            .query(&StockCategoryFilter {
                id: Some(self.category_id),
                ..Default::default()
            })
            .await?;
        self.validate(categories.first(), &same_name, own_id)?;
        Ok(())
    }
}

pub async fn add_stock_category<DB>(
    db: &DB,
    treasurer: &Member,
    name: &str,
) -> Result<StockCategory, AccountingError>
where
    DB: Query<StockCategory, Filter = StockCategoryFilter> + Insert<StockCategory> + Send + Sync,
{
    permissions::require(treasurer, Role::Finances)?;
    let name = name.trim();
    let mut errors = FormErrors::default();
    if name.is_empty() {
        errors.push("name", REQUIRED);
    }
    let existing: Vec<StockCategory> = db
        .query(&StockCategoryFilter {
            name: Some(name.to_string()),
            ..Default::default()
        })
        .await?;
    if !existing.is_empty() {
        errors.push("name", "a category with this name already exists");
    }
    errors.into_result()?;

    let category = db
        .insert(StockCategory {
            name: name.to_string(),
            ..Default::default()
        })
        .await?;
    tracing::info!(category = category.id, name = %category.name, "stock category added");
    Ok(category)
}

pub async fn add_stock_item<DB>(
    db: &DB,
    treasurer: &Member,
    form: StockItemForm,
) -> Result<StockItem, AccountingError>
where
    DB: Query<StockItem, Filter = StockItemFilter>
        + Query<StockCategory, Filter = StockCategoryFilter>
        + Insert<StockItem>
        + Send
        + Sync,
{
    permissions::require(treasurer, Role::Finances)?;
    form.check(db, None).await?;

    let item = db.insert(form.into_item(0)).await?;
    tracing::info!(item = item.id, name = %item.name, price = %item.price, "stock item added");
    Ok(item)
}

pub async fn edit_stock_item<DB>(
    db: &DB,
    treasurer: &Member,
    item_id: u32,
    form: StockItemForm,
) -> Result<StockItem, AccountingError>
where
    DB: Query<StockItem, Filter = StockItemFilter>
        + Query<StockCategory, Filter = StockCategoryFilter>
        + Retrieve<StockItem, Key = u32>
        + Update<StockItem>
        + Send
        + Sync,
{
    permissions::require(treasurer, Role::Finances)?;
    let item: StockItem = db.retrieve(item_id).await?;
    form.check(db, Some(item.id)).await?;

    let item = db.update(form.into_item(item.id)).await?;
    tracing::info!(item = item.id, name = %item.name, "stock item edited");
    Ok(item)
}

/// Stock of an item as logged
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockLevel {
    pub item: StockItem,
    pub stock: i64,
}

impl StockLevel {
    /// How many to buy to get back to the maximum
    pub fn stockup(&self) -> i64 {
        i64::from(self.item.stock_max) - self.stock
    }
}

/// Sum the logged movements per item
pub fn stock_levels(items: Vec<StockItem>, log: &[BarLogEntry]) -> Vec<StockLevel> {
    let mut stock: HashMap<u32, i64> = HashMap::new();
    for entry in log {
        *stock.entry(entry.item_id).or_insert(0) += i64::from(entry.amount);
    }
    items
        .into_iter()
        .map(|item| StockLevel {
            stock: stock.get(&item.id).copied().unwrap_or(0),
            item,
        })
        .collect()
}

pub async fn load_stock_levels<DB>(db: &DB) -> Result<Vec<StockLevel>, AccountingError>
where
    DB: Query<StockItem, Filter = StockItemFilter>
        + Query<BarLogEntry, Filter = BarLogFilter>
        + Send
        + Sync,
{
    let items: Vec<StockItem> = db.query(&StockItemFilter::default()).await?;
    let log: Vec<BarLogEntry> = db.query(&BarLogFilter::default()).await?;
    Ok(stock_levels(items, &log))
}

async fn log_movement<DB>(
    db: &DB,
    member: &Member,
    item_id: u32,
    amount: u32,
    kind: BarLogKind,
    at: NaiveDateTime,
) -> Result<BarLogEntry, AccountingError>
where
    DB: Retrieve<StockItem, Key = u32> + Insert<BarLogEntry> + Send + Sync,
{
    let count = i32::try_from(amount)
        .ok()
        .filter(|count| *count > 0)
        .ok_or_else(|| {
            let mut errors = FormErrors::default();
            errors.push("amount", POSITIVE);
            errors
        })?;
    let item: StockItem = db.retrieve(item_id).await?;

    let entry = db
        .insert(BarLogEntry {
            item_id: item.id,
            amount: match kind {
                BarLogKind::Stockup => count,
                BarLogKind::Consumption => -count,
            },
            total_price: item.price * Decimal::from(count),
            datetime: at,
            member_id: member.id,
            kind,
            ..Default::default()
        })
        .await?;
    tracing::info!(item = %item.name, amount = entry.amount, kind = %kind, member = %member.name,
        "bar log entry added");
    Ok(entry)
}

/// Log bought stock
pub async fn log_stockup<DB>(
    db: &DB,
    treasurer: &Member,
    item_id: u32,
    amount: u32,
    at: NaiveDateTime,
) -> Result<BarLogEntry, AccountingError>
where
    DB: Retrieve<StockItem, Key = u32> + Insert<BarLogEntry> + Send + Sync,
{
    permissions::require(treasurer, Role::Finances)?;
    log_movement(db, treasurer, item_id, amount, BarLogKind::Stockup, at).await
}

/// Log what a member took from the bar
pub async fn log_consumption<DB>(
    db: &DB,
    member: &Member,
    item_id: u32,
    amount: u32,
    at: NaiveDateTime,
) -> Result<BarLogEntry, AccountingError>
where
    DB: Retrieve<StockItem, Key = u32> + Insert<BarLogEntry> + Send + Sync,
{
    permissions::require(member, Role::Member)?;
    log_movement(db, member, item_id, amount, BarLogKind::Consumption, at).await
}

/// One page of the bar log, most recent first
pub async fn bar_log<DB>(
    db: &DB,
    filter: &BarLogFilter,
    page: usize,
    per_page: usize,
) -> Result<Page<BarLogEntry>, AccountingError>
where
    DB: Query<BarLogEntry, Filter = BarLogFilter> + Send + Sync,
{
    let entries: Vec<BarLogEntry> = db.query(filter).await?;
    Ok(Page::slice(entries, page, per_page)?)
}

pub async fn remove_bar_log_entry<DB>(
    db: &DB,
    treasurer: &Member,
    entry_id: u32,
) -> Result<BarLogEntry, AccountingError>
where
    DB: Retrieve<BarLogEntry, Key = u32> + Delete<BarLogEntry> + Send + Sync,
{
    permissions::require(treasurer, Role::Finances)?;
    let entry: BarLogEntry = db.retrieve(entry_id).await?;
    db.delete(entry.clone()).await?;
    tracing::info!(entry = entry.id, item = entry.item_id, "bar log entry removed");
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use malman_db::Connection;
    use rust_decimal_macros::dec;

    use super::*;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    struct Fixture {
        db: Connection,
        treasurer: Member,
        member: Member,
        drinks: StockCategory,
    }

    async fn fixture() -> Fixture {
        let db = Connection::open_test().await;
        let treasurer = db
            .insert(Member {
                name: "Treasurer".to_string(),
                email: "finances@mal.be".to_string(),
                roles: vec![Role::Finances],
                ..Default::default()
            })
            .await
            .unwrap();
        let member = db
            .insert(Member {
                name: "Test Member".to_string(),
                email: "member@mal.be".to_string(),
                active_member: true,
                roles: vec![Role::Member],
                ..Default::default()
            })
            .await
            .unwrap();
        let drinks = add_stock_category(&db, &treasurer, "drinks").await.unwrap();
        Fixture {
            db,
            treasurer,
            member,
            drinks,
        }
    }

    fn club_mate(f: &Fixture) -> StockItemForm {
        StockItemForm {
            name: "Club-Mate".to_string(),
            price: dec!(1.50),
            stock_max: 48,
            category_id: f.drinks.id,
            josto: true,
        }
    }

    #[tokio::test]
    async fn test_duplicate_stock_name_rejected() {
        let f = fixture().await;
        add_stock_item(&f.db, &f.treasurer, club_mate(&f)).await.unwrap();

        let result = add_stock_item(&f.db, &f.treasurer, club_mate(&f)).await;
        match result {
            Err(AccountingError::Invalid(errors)) => {
                assert_eq!(errors.0[0].message, "There is already a stockitem with this name")
            }
            other => panic!("unexpected result: {:?}", other),
        }
        let items: Vec<StockItem> = f.db.query(&StockItemFilter::default()).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_edit_keeps_own_name() {
        let f = fixture().await;
        let item = add_stock_item(&f.db, &f.treasurer, club_mate(&f)).await.unwrap();
        let mut form = StockItemForm::from_item(&item);
        form.price = dec!(1.80);
        let item = edit_stock_item(&f.db, &f.treasurer, item.id, form).await.unwrap();
        assert_eq!(item.price, dec!(1.8));

        let mut cola = club_mate(&f);
        cola.name = "Cola".to_string();
        let cola = add_stock_item(&f.db, &f.treasurer, cola).await.unwrap();
        let mut form = StockItemForm::from_item(&cola);
        form.name = "Club-Mate".to_string();
        let result = edit_stock_item(&f.db, &f.treasurer, cola.id, form).await;
        assert!(matches!(result, Err(AccountingError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_stock_item_validation() {
        let f = fixture().await;
        let form = StockItemForm {
            name: " ".to_string(),
            price: dec!(-1),
            stock_max: -3,
            category_id: f.drinks.id + 1,
            josto: false,
        };
        match add_stock_item(&f.db, &f.treasurer, form).await {
            Err(AccountingError::Invalid(errors)) => {
                assert!(errors.has("name"));
                assert!(errors.has("price"));
                assert!(errors.has("stock_max"));
                assert!(errors.has("category_id"));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let result = add_stock_item(&f.db, &f.member, club_mate(&f)).await;
        assert!(matches!(result, Err(AccountingError::Forbidden(_, Role::Finances))));
    }

    #[tokio::test]
    async fn test_duplicate_stock_category_rejected() {
        let f = fixture().await;
        let result = add_stock_category(&f.db, &f.treasurer, "drinks").await;
        assert!(matches!(result, Err(AccountingError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_stock_levels_follow_log() {
        let f = fixture().await;
        let item = add_stock_item(&f.db, &f.treasurer, club_mate(&f)).await.unwrap();

        let stockup = log_stockup(&f.db, &f.treasurer, item.id, 24, at(1, 10)).await.unwrap();
        assert_eq!(stockup.total_price, dec!(36));
        let consumed = log_consumption(&f.db, &f.member, item.id, 3, at(2, 21)).await.unwrap();
        assert_eq!(consumed.amount, -3);
        assert_eq!(consumed.total_price, dec!(4.5));
        assert_eq!(consumed.member_id, f.member.id);

        let levels = load_stock_levels(&f.db).await.unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].stock, 21);
        assert_eq!(levels[0].stockup(), 27);

        let page = bar_log(&f.db, &BarLogFilter::default(), 1, 10).await.unwrap();
        assert_eq!(page.items, vec![consumed.clone(), stockup]);

        remove_bar_log_entry(&f.db, &f.treasurer, consumed.id).await.unwrap();
        let levels = load_stock_levels(&f.db).await.unwrap();
        assert_eq!(levels[0].stock, 24);
    }

    #[tokio::test]
    async fn test_log_movement_rules() {
        let f = fixture().await;
        let item = add_stock_item(&f.db, &f.treasurer, club_mate(&f)).await.unwrap();

        let result = log_consumption(&f.db, &f.member, item.id, 0, at(2, 21)).await;
        assert!(matches!(result, Err(AccountingError::Invalid(_))));

        let result = log_stockup(&f.db, &f.member, item.id, 10, at(2, 21)).await;
        assert!(matches!(result, Err(AccountingError::Forbidden(_, Role::Finances))));

        let result = log_consumption(&f.db, &f.member, item.id + 1, 1, at(2, 21)).await;
        assert!(matches!(result, Err(AccountingError::NotFound(_))));
    }

    #[test]
    fn test_stock_levels_without_log() {
        let items = vec![StockItem {
            id: 1,
            name: "Cola".to_string(),
            stock_max: 12,
            ..Default::default()
        }];
        let levels = stock_levels(items, &[]);
        assert_eq!(levels[0].stock, 0);
        assert_eq!(levels[0].stockup(), 12);
    }
}

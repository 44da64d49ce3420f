use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use malman_data::{Bank, Category, Member, Retrieve, Role, Transaction, Update};

use crate::{forms::TransactionFields, permissions, AccountingError};

/// Render a field value for the change log.
pub trait Shown {
    fn shown(&self) -> String;
}

macro_rules! shown_display {
    ($($t:ty),*) => {
        $(impl Shown for $t {
            fn shown(&self) -> String {
                self.to_string()
            }
        })*
    };
}

shown_display!(NaiveDate, Decimal, String, u32, i32, bool);

impl<T: Shown> Shown for Option<T> {
    fn shown(&self) -> String {
        match self {
            Some(value) => value.shown(),
            None => "None".to_string(),
        }
    }
}

/// A single updated field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub field: &'static str,
    pub new: String,
    pub old: String,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} (was {})", self.field, self.new, self.old)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeLog {
    pub changes: Vec<Change>,
}

impl ChangeLog {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// The confirmation shown after an edit, starting with `prefix`.
    pub fn confirmation(&self, prefix: &str) -> String {
        let changes: Vec<String> = self.changes.iter().map(|c| c.to_string()).collect();
        format!("{}{}", prefix, changes.join(", "))
    }
}

/// Compare a field with its new value, record and assign it if
/// they differ.
macro_rules! track {
    ($log:ident, $tx:ident . $field:ident, $new:expr) => {{
        let new = $new;
        if $tx.$field != new {
            $log.changes.push(Change {
                field: stringify!($field),
                new: new.shown(),
                old: $tx.$field.shown(),
            });
            $tx.$field = new;
        }
    }};
}

/// Apply edited fields to a transaction and log every field that
/// actually changed. Values compare typed, so `12.50` and `12.5`
/// are the same amount.
pub fn apply_edit(tx: &mut Transaction, fields: &TransactionFields) -> ChangeLog {
    let mut log = ChangeLog::default();
    track!(log, tx.date, Some(fields.date));
    track!(log, tx.facturation_date, Some(fields.resolved_facturation_date()));
    track!(log, tx.is_revenue, fields.is_revenue);
    track!(log, tx.amount, fields.amount);
    track!(log, tx.to_from, fields.to_from.clone());
    track!(log, tx.description, fields.description.clone());
    track!(log, tx.category_id, Some(fields.category_id));
    track!(log, tx.bank_id, Some(fields.bank_id));
    track!(log, tx.bank_statement_number, fields.bank_statement_number);
    log
}

/// Edit a transaction. Nothing is written when no field changed.
pub async fn edit_transaction<DB>(
    db: &DB,
    editor: &Member,
    transaction_id: u32,
    fields: TransactionFields,
) -> Result<ChangeLog, AccountingError>
where
    DB: Retrieve<Transaction, Key = u32>
        + Retrieve<Category, Key = u32>
        + Retrieve<Bank, Key = u32>
        + Update<Transaction>
        + Send
        + Sync,
{
    permissions::require(editor, Role::Finances)?;
    let mut tx: Transaction = db.retrieve(transaction_id).await?;
    if !tx.is_filed() {
        return Err(AccountingError::NotFiled(transaction_id));
    }
    fields.check(db).await?;

    let log = apply_edit(&mut tx, &fields);
    if log.is_empty() {
        return Ok(log);
    }
    db.update(tx).await?;
    tracing::info!(
        transaction = transaction_id,
        editor = %editor.name,
        changes = log.changes.len(),
        "edited transaction"
    );
    Ok(log)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filed() -> Transaction {
        Transaction {
            id: 7,
            date: Some(date(2024, 3, 1)),
            facturation_date: Some(date(2024, 2, 28)),
            is_revenue: true,
            amount: dec!(12.50),
            description: "Lidgeld".to_string(),
            to_from: "Test Member".to_string(),
            category_id: Some(1),
            bank_id: Some(1),
            bank_statement_number: Some(4),
            date_filed: Some(date(2024, 3, 2)),
            ..Default::default()
        }
    }

    #[test]
    fn test_identical_values_no_changes() {
        let mut tx = filed();
        let mut fields = TransactionFields::from_transaction(&tx).unwrap();
        // Same amount, different scale
        fields.amount = dec!(12.5);
        let log = apply_edit(&mut tx, &fields);
        assert!(log.is_empty());
        assert_eq!(tx, filed());
    }

    #[test]
    fn test_changes_logged() {
        let mut tx = filed();
        let mut fields = TransactionFields::from_transaction(&tx).unwrap();
        fields.amount = dec!(15);
        fields.description = "Lidgeld maart".to_string();
        fields.bank_statement_number = None;

        let log = apply_edit(&mut tx, &fields);
        let lines: Vec<String> = log.changes.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "amount = 15 (was 12.50)",
                "description = Lidgeld maart (was Lidgeld)",
                "bank_statement_number = None (was 4)",
            ]
        );
        assert_eq!(tx.amount, dec!(15));
        assert_eq!(tx.bank_statement_number, None);
        assert_eq!(
            log.confirmation("These values were updated: "),
            "These values were updated: amount = 15 (was 12.50), \
             description = Lidgeld maart (was Lidgeld), \
             bank_statement_number = None (was 4)"
        );
    }

    #[test]
    fn test_blank_facturation_date_falls_back_to_date() {
        let mut tx = filed();
        let mut fields = TransactionFields::from_transaction(&tx).unwrap();
        fields.facturation_date = None;
        let log = apply_edit(&mut tx, &fields);
        assert_eq!(log.changes.len(), 1);
        assert_eq!(log.changes[0].to_string(), "facturation_date = 2024-03-01 (was 2024-02-28)");
        assert_eq!(tx.facturation_date, Some(date(2024, 3, 1)));
    }

    #[test]
    fn test_type_change_logged() {
        let mut tx = filed();
        let mut fields = TransactionFields::from_transaction(&tx).unwrap();
        fields.is_revenue = false;
        fields.category_id = 2;
        let log = apply_edit(&mut tx, &fields);
        let lines: Vec<String> = log.changes.iter().map(|c| c.to_string()).collect();
        assert_eq!(lines, vec!["is_revenue = false (was true)", "category_id = 2 (was 1)"]);
    }

    #[tokio::test]
    async fn test_edit_transaction() {
        use malman_data::Insert;
        use malman_db::Connection;

        let db = Connection::open_test().await;
        let treasurer = Member {
            name: "Treasurer".to_string(),
            roles: vec![Role::Finances],
            ..Default::default()
        };
        let bank = db
            .insert(Bank {
                name: "Triodos".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let category = db
            .insert(Category {
                name: "fees".to_string(),
                legal_category: "Lidgelden".to_string(),
                is_revenue: true,
                ..Default::default()
            })
            .await
            .unwrap();
        let tx = db
            .insert(Transaction {
                category_id: Some(category.id),
                bank_id: Some(bank.id),
                ..filed()
            })
            .await
            .unwrap();

        let mut fields = TransactionFields::from_transaction(&tx).unwrap();
        let log = edit_transaction(&db, &treasurer, tx.id, fields.clone()).await.unwrap();
        assert!(log.is_empty());

        fields.amount = dec!(20);
        let log = edit_transaction(&db, &treasurer, tx.id, fields).await.unwrap();
        assert_eq!(log.changes.len(), 1);
        let stored: Transaction = db.retrieve(tx.id).await.unwrap();
        assert_eq!(stored.amount, dec!(20));

        let pending = db.insert(Transaction::default()).await.unwrap();
        let fields = TransactionFields::from_transaction(&stored).unwrap();
        let result = edit_transaction(&db, &treasurer, pending.id, fields).await;
        assert!(matches!(result, Err(AccountingError::NotFiled(_))));
    }
}

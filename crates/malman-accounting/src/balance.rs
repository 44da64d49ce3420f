use rust_decimal::Decimal;
use serde::Serialize;

use malman_data::{
    Bank, BankFilter, CashTransaction, CashTransactionFilter, Query, Transaction,
    TransactionFilter,
};

use crate::AccountingError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankBalance {
    pub bank: Bank,
    pub balance: Decimal,
}

/// The money the organization holds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balances {
    pub banks: Vec<BankBalance>,
    pub cash: Decimal,
}

impl Balances {
    pub fn total(&self) -> Decimal {
        self.banks.iter().map(|b| b.balance).sum::<Decimal>() + self.cash
    }
}

/// Balance of every bank: the sum of its transaction amounts
pub async fn bank_balances<DB>(db: &DB) -> Result<Vec<BankBalance>, AccountingError>
where
    DB: Query<Bank, Filter = BankFilter> + Query<Transaction, Filter = TransactionFilter> + Send + Sync,
{
    let banks: Vec<Bank> = db.query(&BankFilter::default()).await?;
    let mut balances = Vec::with_capacity(banks.len());
    for bank in banks {
        let transactions: Vec<Transaction> = db
            .query(&TransactionFilter {
                bank_id: Some(bank.id),
                ..Default::default()
            })
            .await?;
        let balance = transactions.iter().map(|tx| tx.amount).sum();
        balances.push(BankBalance { bank, balance });
    }
    Ok(balances)
}

/// What is in the cash register
pub async fn cash_balance<DB>(db: &DB) -> Result<Decimal, AccountingError>
where
    DB: Query<CashTransaction, Filter = CashTransactionFilter> + Send + Sync,
{
    let entries: Vec<CashTransaction> = db.query(&CashTransactionFilter::default()).await?;
    Ok(entries.iter().map(|e| e.amount).sum())
}

pub async fn load_balances<DB>(db: &DB) -> Result<Balances, AccountingError>
where
    DB: Query<Bank, Filter = BankFilter>
        + Query<Transaction, Filter = TransactionFilter>
        + Query<CashTransaction, Filter = CashTransactionFilter>
        + Send
        + Sync,
{
    Ok(Balances {
        banks: bank_balances(db).await?,
        cash: cash_balance(db).await?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use malman_data::Insert;
    use malman_db::Connection;
    use rust_decimal_macros::dec;

    use super::*;

    #[tokio::test]
    async fn test_load_balances() {
        let db = Connection::open_test().await;
        let triodos = db
            .insert(Bank {
                name: "Triodos".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let paypal = db
            .insert(Bank {
                name: "Paypal".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        for amount in [dec!(120.50), dec!(-20.25)] {
            db.insert(Transaction {
                is_revenue: amount > Decimal::ZERO,
                amount,
                bank_id: Some(triodos.id),
                ..Default::default()
            })
            .await
            .unwrap();
        }
        db.insert(CashTransaction {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            amount: dec!(14),
            description: "bar takings".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        let balances = load_balances(&db).await.unwrap();
        assert_eq!(
            balances.banks,
            vec![
                BankBalance {
                    bank: triodos,
                    balance: dec!(100.25)
                },
                BankBalance {
                    bank: paypal,
                    balance: Decimal::ZERO
                },
            ]
        );
        assert_eq!(balances.cash, dec!(14));
        assert_eq!(balances.total(), dec!(114.25));
    }
}

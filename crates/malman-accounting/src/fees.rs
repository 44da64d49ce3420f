use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use malman_data::{
    BarAccountLog, BarAccountLogFilter, Insert, Member, MembershipFee, Query, Retrieve, Role,
    Transaction,
};

use crate::{
    datetime::{AlignEnd, AlignStart},
    permissions, AccountingError, FormErrors,
};

/// The date membership dues are settled up to when `until` is
/// entered: the last day of the month after the entered month.
/// Entering any day of March settles the dues up to April 30.
pub fn paid_until(until: NaiveDate) -> Option<NaiveDate> {
    until
        .align_start()
        .checked_add_months(Months::new(1))
        .and_then(|next| next.align_end())
}

/// Filed transaction a fee or top-up is booked on
async fn filed_transaction<DB>(db: &DB, transaction_id: u32) -> Result<Transaction, AccountingError>
where
    DB: Retrieve<Transaction, Key = u32> + Send + Sync,
{
    let tx: Transaction = db.retrieve(transaction_id).await?;
    if !tx.is_filed() {
        return Err(AccountingError::NotFiled(transaction_id));
    }
    Ok(tx)
}

/// Book a filed transaction as payment of a member's dues.
pub async fn file_membership_fee<DB>(
    db: &DB,
    treasurer: &Member,
    transaction_id: u32,
    member_id: u32,
    until: NaiveDate,
) -> Result<(Member, MembershipFee), AccountingError>
where
    DB: Retrieve<Transaction, Key = u32>
        + Retrieve<Member, Key = u32>
        + Insert<MembershipFee>
        + Send
        + Sync,
{
    permissions::require(treasurer, Role::Finances)?;
    let until = paid_until(until).ok_or_else(|| {
        let mut errors = FormErrors::default();
        errors.push("until", "please enter a date using the specified formatting");
        errors
    })?;
    let tx = filed_transaction(db, transaction_id).await?;
    let member: Member = db.retrieve(member_id).await?;

    let fee = db
        .insert(MembershipFee {
            member_id: member.id,
            transaction_id: tx.id,
            until,
            ..Default::default()
        })
        .await?;
    tracing::info!(member = %member.name, until = %fee.until, transaction = tx.id,
        "membership fee filed");
    Ok((member, fee))
}

/// A credited bar account
#[derive(Debug, Clone)]
pub struct TopUp {
    pub member: Member,
    pub entry: BarAccountLog,
    pub amount: Decimal,
}

impl TopUp {
    pub fn describe(&self) -> String {
        format!("€{} was added to {}'s bar account", self.amount, self.member.name)
    }
}

/// Credit the amount of a filed transaction to a member's bar account.
pub async fn topup_bar_account<DB>(
    db: &DB,
    treasurer: &Member,
    transaction_id: u32,
    member_id: u32,
) -> Result<TopUp, AccountingError>
where
    DB: Retrieve<Transaction, Key = u32>
        + Retrieve<Member, Key = u32>
        + Insert<BarAccountLog>
        + Send
        + Sync,
{
    permissions::require(treasurer, Role::Finances)?;
    let tx = filed_transaction(db, transaction_id).await?;
    let member: Member = db.retrieve(member_id).await?;

    let entry = db
        .insert(BarAccountLog {
            member_id: member.id,
            transaction_id: tx.id,
            ..Default::default()
        })
        .await?;
    tracing::info!(member = %member.name, amount = %tx.amount, "bar account topped up");
    Ok(TopUp {
        member,
        entry,
        amount: tx.amount,
    })
}

/// Total of all top-ups credited to a member's bar account
pub async fn bar_account_credit<DB>(db: &DB, member: &Member) -> Result<Decimal, AccountingError>
where
    DB: Query<BarAccountLog, Filter = BarAccountLogFilter>
        + Retrieve<Transaction, Key = u32>
        + Send
        + Sync,
{
    let mut total = Decimal::ZERO;
    for entry in member.get_bar_topups(db).await? {
        let tx: Transaction = db.retrieve(entry.transaction_id).await?;
        total += tx.amount;
    }
    Ok(total)
}

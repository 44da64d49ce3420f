use malman_data::{
    Bank, BankFilter, Category, CategoryPurpose, Insert, Member, MemberFilter, Query, Role,
    Update,
};

use crate::{permissions, AccountingError, FormErrors};

/// Register a member. The first member of an empty directory may
/// be added without an acting member, everyone after that needs a
/// treasurer.
pub async fn add_member<DB>(
    db: &DB,
    actor: Option<&Member>,
    member: Member,
) -> Result<Member, AccountingError>
where
    DB: Query<Member, Filter = MemberFilter> + Insert<Member> + Send + Sync,
{
    let members: Vec<Member> = db.query(&MemberFilter::default()).await?;
    match actor {
        Some(actor) => permissions::require(actor, Role::Finances)?,
        None if members.is_empty() => {}
        None => {
            return Err(AccountingError::Forbidden(
                "anonymous".to_string(),
                Role::Finances,
            ))
        }
    }

    let mut errors = FormErrors::default();
    if member.name.trim().is_empty() {
        errors.push("name", "this field is required");
    }
    if !member.email.contains('@') {
        errors.push("email", "please enter a valid email address");
    }
    if members.iter().any(|m| m.email == member.email) {
        errors.push("email", "this email address is already registered");
    }
    errors.into_result()?;

    let member = db.insert(member).await?;
    tracing::info!(member = member.id, name = %member.name, "member added");
    Ok(member)
}

/// Give a member an additional privilege.
pub async fn grant_role<DB>(
    db: &DB,
    treasurer: &Member,
    mut member: Member,
    role: Role,
) -> Result<Member, AccountingError>
where
    DB: Update<Member> + Send + Sync,
{
    permissions::require(treasurer, Role::Finances)?;
    if member.has_role(role) {
        return Ok(member);
    }
    member.roles.push(role);
    let member = db.update(member).await?;
    tracing::info!(member = member.id, role = %role, "role granted");
    Ok(member)
}

pub async fn add_bank<DB>(db: &DB, treasurer: &Member, name: &str) -> Result<Bank, AccountingError>
where
    DB: Query<Bank, Filter = BankFilter> + Insert<Bank> + Send + Sync,
{
    permissions::require(treasurer, Role::Finances)?;
    let name = name.trim();
    let mut errors = FormErrors::default();
    if name.is_empty() {
        errors.push("name", "this field is required");
    }
    let existing: Vec<Bank> = db
        .query(&BankFilter {
            name: Some(name.to_string()),
            ..Default::default()
        })
        .await?;
    if !existing.is_empty() {
        errors.push("name", "a bank with this name already exists");
    }
    errors.into_result()?;

    let bank = db
        .insert(Bank {
            name: name.to_string(),
            ..Default::default()
        })
        .await?;
    tracing::info!(bank = bank.id, name = %bank.name, "bank added");
    Ok(bank)
}

pub async fn add_category<DB>(
    db: &DB,
    treasurer: &Member,
    category: Category,
) -> Result<Category, AccountingError>
where
    DB: Insert<Category> + Send + Sync,
{
    permissions::require(treasurer, Role::Finances)?;
    let mut errors = FormErrors::default();
    if category.name.trim().is_empty() {
        errors.push("name", "this field is required");
    }
    if category.legal_category.trim().is_empty() {
        errors.push("legal_category", "this field is required");
    }
    match category.purpose {
        CategoryPurpose::BarTopup | CategoryPurpose::MembershipFee if !category.is_revenue => {
            errors.push("purpose", "top-ups and membership fees are revenues");
        }
        _ => {}
    }
    errors.into_result()?;

    let category = db.insert(category).await?;
    tracing::info!(category = category.id, name = %category.name, "category added");
    Ok(category)
}

#[cfg(test)]
mod tests {
    use malman_db::Connection;

    use super::*;

    fn member(name: &str, email: &str) -> Member {
        Member {
            name: name.to_string(),
            email: email.to_string(),
            active_member: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_bootstrap_first_member() {
        let db = Connection::open_test().await;
        let first = add_member(
            &db,
            None,
            Member {
                roles: vec![Role::Finances],
                ..member("Treasurer", "finances@mal.be")
            },
        )
        .await
        .unwrap();

        let result = add_member(&db, None, member("Guest", "guest@mal.be")).await;
        assert!(matches!(result, Err(AccountingError::Forbidden(_, _))));

        let second = add_member(&db, Some(&first), member("Member", "member@mal.be"))
            .await
            .unwrap();
        assert!(second.roles.is_empty());
        let second = grant_role(&db, &first, second, Role::Member).await.unwrap();
        assert_eq!(second.roles, vec![Role::Member]);

        let result = add_member(&db, Some(&first), member("Twin", "member@mal.be")).await;
        match result {
            Err(AccountingError::Invalid(errors)) => assert!(errors.has("email")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bank_names_unique() {
        let db = Connection::open_test().await;
        let treasurer = Member {
            roles: vec![Role::Finances],
            ..Default::default()
        };
        add_bank(&db, &treasurer, "Triodos").await.unwrap();
        let result = add_bank(&db, &treasurer, "Triodos").await;
        match result {
            Err(AccountingError::Invalid(errors)) => assert!(errors.has("name")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_category_purpose_needs_revenue() {
        let db = Connection::open_test().await;
        let treasurer = Member {
            roles: vec![Role::Finances],
            ..Default::default()
        };
        let category = Category {
            name: "bar".to_string(),
            legal_category: "Bar".to_string(),
            is_revenue: false,
            purpose: CategoryPurpose::BarTopup,
            ..Default::default()
        };
        let result = add_category(&db, &treasurer, category.clone()).await;
        assert!(matches!(result, Err(AccountingError::Invalid(_))));

        let category = add_category(
            &db,
            &treasurer,
            Category {
                is_revenue: true,
                ..category
            },
        )
        .await
        .unwrap();
        assert_eq!(category.purpose, CategoryPurpose::BarTopup);
    }
}

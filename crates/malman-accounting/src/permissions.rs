use malman_data::{Member, Role};

use crate::AccountingError;

/// Check that the acting member holds a privilege.
///
/// The member privilege needs the `member` role on an active
/// member. Holding `finances` grants it regardless of membership
/// status.
pub fn require(actor: &Member, role: Role) -> Result<(), AccountingError> {
    let allowed = match role {
        Role::Member => {
            actor.has_role(Role::Finances) || (actor.active_member && actor.has_role(Role::Member))
        }
        Role::Finances => actor.has_role(Role::Finances),
    };
    if allowed {
        Ok(())
    } else {
        Err(AccountingError::Forbidden(actor.name.clone(), role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        let treasurer = Member {
            name: "Treasurer".to_string(),
            roles: vec![Role::Finances],
            ..Default::default()
        };
        let member = Member {
            name: "Member".to_string(),
            active_member: true,
            roles: vec![Role::Member],
            ..Default::default()
        };
        let guest = Member::default();

        assert!(require(&treasurer, Role::Finances).is_ok());
        assert!(require(&treasurer, Role::Member).is_ok());
        assert!(require(&member, Role::Member).is_ok());
        assert!(matches!(
            require(&member, Role::Finances),
            Err(AccountingError::Forbidden(_, Role::Finances))
        ));
        assert!(require(&guest, Role::Member).is_err());
    }

    #[test]
    fn test_require_former_member() {
        let former = Member {
            name: "Former".to_string(),
            active_member: false,
            roles: vec![Role::Member],
            ..Default::default()
        };
        assert!(matches!(
            require(&former, Role::Member),
            Err(AccountingError::Forbidden(_, Role::Member))
        ));

        // An active flag alone grants nothing
        let unprivileged = Member {
            active_member: true,
            ..Default::default()
        };
        assert!(require(&unprivileged, Role::Member).is_err());
    }
}

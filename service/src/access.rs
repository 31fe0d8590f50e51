//! Role-based data access scoping.

use uuid::Uuid;

use crate::{
    domain::user::{self, Role},
    filter::Predicate,
};

/// Authenticated originator of a query or command.
#[derive(Clone, Copy, Debug)]
pub struct Caller {
    /// ID of the [`User`] performing the operation.
    ///
    /// [`User`]: crate::domain::User
    pub id: user::Id,

    /// [`Role`] of the [`User`] performing the operation.
    ///
    /// [`User`]: crate::domain::User
    pub role: Role,
}

impl Caller {
    /// Returns the data visibility [`Scope`] of this [`Caller`].
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope::of(self)
    }
}

/// Visibility boundary applied to every data-returning operation.
///
/// A [`Scope`] is resolved from a [`Caller`] exactly once per operation and
/// then composed into all filtering conditions the operation issues, so
/// records outside of it are indistinguishable from non-existent ones.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// Full visibility of all records.
    Unrestricted,

    /// Visibility limited to records owned by the specified [`User`].
    ///
    /// [`User`]: crate::domain::User
    OwnedBy(user::Id),
}

impl Scope {
    /// Resolves the [`Scope`] of the provided [`Caller`] from their [`Role`].
    #[must_use]
    pub fn of(caller: &Caller) -> Self {
        match caller.role {
            Role::Agent => Self::OwnedBy(caller.id),
            Role::Manager | Role::Admin => Self::Unrestricted,
        }
    }

    /// Renders this [`Scope`] as a [`Predicate`] over the provided ownership
    /// `field`.
    #[must_use]
    pub fn predicate(self, field: &'static str) -> Predicate {
        match self {
            Self::Unrestricted => Predicate::new(),
            Self::OwnedBy(id) => {
                Predicate::new().equals_id(field, Uuid::from(id))
            }
        }
    }

    /// Indicates whether the record owned by the `owner` [`User`] is visible
    /// within this [`Scope`].
    ///
    /// [`User`]: crate::domain::User
    #[must_use]
    pub fn permits(self, owner: user::Id) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::OwnedBy(id) => id == owner,
        }
    }
}

#[cfg(test)]
mod spec {
    use uuid::Uuid;

    use crate::domain::user::{self, Role};

    use super::{Caller, Scope};

    fn caller(role: Role) -> Caller {
        Caller {
            id: user::Id::from(Uuid::new_v4()),
            role,
        }
    }

    #[test]
    fn agent_is_scoped_to_own_records() {
        let c = caller(Role::Agent);

        assert_eq!(c.scope(), Scope::OwnedBy(c.id));
        assert!(c.scope().permits(c.id));
        assert!(!c.scope().permits(user::Id::from(Uuid::new_v4())));
    }

    #[test]
    fn manager_and_admin_are_unrestricted() {
        for role in [Role::Manager, Role::Admin] {
            let c = caller(role);

            assert_eq!(c.scope(), Scope::Unrestricted);
            assert!(c.scope().permits(user::Id::from(Uuid::new_v4())));
        }
    }

    #[test]
    fn unrestricted_scope_renders_no_conditions() {
        assert!(Scope::Unrestricted.predicate("agent_id").is_empty());
    }

    #[test]
    fn owned_scope_renders_ownership_condition() {
        let id = user::Id::from(Uuid::new_v4());
        let p = Scope::OwnedBy(id).predicate("agent_id");

        assert_eq!(p.atoms().len(), 1);
        assert_eq!(p.atoms()[0].field, "agent_id");
    }
}

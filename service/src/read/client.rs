//! [`Client`] read model definitions.
//!
//! [`Client`]: crate::domain::Client

#[cfg(doc)]
use common::DateTime;
use derive_more::{From, Into};

use crate::domain::{client, user};
#[cfg(doc)]
use crate::domain::{Client, User};

/// [`Client`] row enriched with display data for listings.
#[derive(Clone, Debug)]
pub struct Record {
    /// ID of the [`Client`].
    pub id: client::Id,

    /// Full name of the [`Client`].
    pub name: client::Name,

    /// [`client::Passport`] of the [`Client`], if provided.
    pub passport: Option<client::Passport>,

    /// [`client::Phone`] of the [`Client`].
    pub phone: client::Phone,

    /// [`client::Email`] of the [`Client`], if provided.
    pub email: Option<client::Email>,

    /// [`DateTime`] when the [`Client`] was registered.
    pub registered_at: client::RegistrationDateTime,

    /// ID of the agent [`User`] owning the [`Client`].
    pub agent_id: user::Id,

    /// Full name of the agent [`User`] owning the [`Client`].
    pub agent_name: user::Name,
}

/// Indicator of a [`Client`] being referenced by at least one [`Contract`].
///
/// [`Contract`]: crate::domain::Contract
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct HasContracts(bool);

pub mod list {
    //! [`Client`]s list definitions.
    //!
    //! [`Client`]: crate::domain::Client

    use common::define_pagination;

    use crate::filter::Predicate;
    #[cfg(doc)]
    use crate::domain::Client;

    define_pagination!(super::Record, Filter, SortKey);

    /// Filter for [`Selector`].
    ///
    /// All members are raw search terms: absent and empty ones are ignored.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// Full name (or its part, matched case-insensitively) to search for.
        pub name: Option<String>,

        /// Exact passport number to search for.
        pub passport_number: Option<String>,

        /// Phone (or its part, matched case-sensitively) to search for.
        pub phone: Option<String>,
    }

    impl Filter {
        /// Renders this [`Filter`] as a [`Predicate`].
        #[must_use]
        pub fn predicate(&self) -> Predicate {
            Predicate::new()
                .contains_ignoring_case("name", self.name.as_deref())
                .equals("passport_number", self.passport_number.as_deref())
                .contains("phone", self.phone.as_deref())
        }
    }

    /// Sorting key of a [`Client`]s list.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub enum SortKey {
        /// Sorting by the full name.
        #[default]
        Name,

        /// Sorting by the registration time.
        RegistrationDate,

        /// Sorting by the phone.
        Phone,
    }
}

#[cfg(test)]
mod spec {
    use super::list::Filter;

    #[test]
    fn filter_skips_absent_and_empty_members() {
        assert!(Filter::default().predicate().is_empty());
        assert!(Filter {
            name: Some(String::new()),
            passport_number: Some(String::new()),
            phone: None,
        }
        .predicate()
        .is_empty());
    }

    #[test]
    fn filter_members_compose_independently() {
        let p = Filter {
            name: Some("Ivanov".into()),
            passport_number: None,
            phone: Some("921".into()),
        }
        .predicate();

        assert_eq!(p.atoms().len(), 2);
        assert_eq!(p.atoms()[0].field, "name");
        assert_eq!(p.atoms()[1].field, "phone");
    }
}

//! [`Contract`] read model definitions.
//!
//! [`Contract`]: crate::domain::Contract

use common::{Date, Money};
#[cfg(doc)]
use common::DateTime;

use crate::domain::{client, contract, contract_status, insurance_type, user};
#[cfg(doc)]
use crate::domain::{Client, Contract, User};

/// [`Contract`] row enriched with display data for listings.
#[derive(Clone, Debug)]
pub struct Record {
    /// ID of the [`Contract`].
    pub id: contract::Id,

    /// [`contract::Number`] of the [`Contract`].
    pub number: contract::Number,

    /// ID of the insured [`Client`].
    pub client_id: client::Id,

    /// Full name of the insured [`Client`].
    pub client_name: client::Name,

    /// [`insurance_type::Code`] of the [`Contract`].
    pub insurance_type: insurance_type::Code,

    /// Display name of the [`Contract`]'s insurance type.
    pub insurance_type_name: insurance_type::Name,

    /// ID of the agent [`User`] owning the [`Contract`].
    pub agent_id: user::Id,

    /// Full name of the agent [`User`] owning the [`Contract`].
    pub agent_name: user::Name,

    /// [`contract_status::Code`] of the [`Contract`].
    pub status: contract_status::Code,

    /// Display name of the [`Contract`]'s status.
    pub status_name: contract_status::Name,

    /// First day of the coverage period.
    pub start_date: Date,

    /// Last day of the coverage period.
    pub end_date: Date,

    /// Premium paid under the [`Contract`].
    pub premium: Money,

    /// Sum insured under the [`Contract`].
    pub insured: Money,

    /// [`DateTime`] when the [`Contract`] was created.
    pub created_at: contract::CreationDateTime,
}

pub mod list {
    //! [`Contract`]s list definitions.
    //!
    //! [`Contract`]: crate::domain::Contract

    use common::{define_pagination, Date};

    use crate::{
        domain::{contract_status, insurance_type},
        filter::Predicate,
    };
    #[cfg(doc)]
    use crate::domain::Contract;

    define_pagination!(super::Record, Filter, SortKey);

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`contract::Number`] (or its part, matched case-insensitively) to
        /// search for.
        ///
        /// [`contract::Number`]: crate::domain::contract::Number
        pub number: Option<String>,

        /// Exact [`insurance_type::Code`] to search for.
        pub insurance_type: Option<insurance_type::Code>,

        /// Exact [`contract_status::Code`] to search for.
        pub status: Option<contract_status::Code>,

        /// Lower bound of the coverage period containment window.
        pub since: Option<Date>,

        /// Upper bound of the coverage period containment window.
        pub until: Option<Date>,
    }

    impl Filter {
        /// Renders this [`Filter`] as a [`Predicate`].
        ///
        /// The period window requires the whole coverage period to lie
        /// within it.
        #[must_use]
        pub fn predicate(&self) -> Predicate {
            Predicate::new()
                .contains_ignoring_case("number", self.number.as_deref())
                .equals("insurance_type", self.insurance_type.as_ref())
                .equals("status", self.status.as_ref())
                .within_period("start_date", "end_date", self.since, self.until)
        }
    }

    /// Sorting key of a [`Contract`]s list.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub enum SortKey {
        /// Sorting by the creation time.
        #[default]
        CreatedAt,

        /// Sorting by the coverage period start.
        StartDate,

        /// Sorting by the coverage period end.
        EndDate,

        /// Sorting by the number.
        Number,
    }
}

#[cfg(test)]
mod spec {
    use common::datetime::{Date, Month};

    use super::list::Filter;
    use crate::filter::Op;

    #[test]
    fn filter_skips_absent_members() {
        assert!(Filter::default().predicate().is_empty());
    }

    #[test]
    fn period_bounds_render_independently() {
        let since =
            Date::from_calendar_date(2024, Month::January, 1).unwrap();
        let p = Filter {
            since: Some(since),
            ..Filter::default()
        }
        .predicate();

        assert_eq!(p.atoms().len(), 1);
        assert_eq!(p.atoms()[0].field, "start_date");
        assert_eq!(p.atoms()[0].op, Op::AtLeast);
    }
}

//! Statistics read model definitions.

use std::str::FromStr;

use common::Date;
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

use crate::{domain::insurance_type, filter::Predicate};
#[cfg(doc)]
use crate::domain::{Client, Contract};

/// Optional date window a statistics aggregation is limited to.
///
/// Both bounds are inclusive and apply to the registration/creation timestamp
/// of the aggregated records: `until` covers the whole named day.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Window {
    /// First day of the [`Window`].
    pub since: Option<Date>,

    /// Last day of the [`Window`].
    pub until: Option<Date>,
}

impl Window {
    /// Renders this [`Window`] as a [`Predicate`] over the provided timestamp
    /// `field`.
    ///
    /// The inclusive `until` day bound becomes a strict `field < until + 1`
    /// condition, so any time of the last day is covered.
    #[must_use]
    pub fn predicate(&self, field: &'static str) -> Predicate {
        Predicate::new()
            .at_least(field, self.since)
            .before(field, self.until.and_then(Date::next_day))
    }
}

/// Total count of [`Client`]s visible in a [`Scope`].
///
/// [`Scope`]: crate::access::Scope
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct TotalClients(i64);

/// Total count of [`Contract`]s visible in a [`Scope`].
///
/// [`Scope`]: crate::access::Scope
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct TotalContracts(i64);

/// Count of [`Contract`]s of a single insurance type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeCount {
    /// Display name of the insurance type.
    pub name: insurance_type::Name,

    /// Count of [`Contract`]s of this type.
    pub count: i64,
}

/// Mean premium of [`Contract`]s of a single insurance type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeAverage {
    /// Display name of the insurance type.
    pub name: insurance_type::Name,

    /// Mean premium amount of [`Contract`]s of this type.
    ///
    /// Exact: aggregation never leaves decimal arithmetic.
    pub average: Decimal,
}

/// Count of [`Contract`]s created within a single [`Month`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MonthCount {
    /// [`Month`] the [`Contract`]s were created in.
    pub month: Month,

    /// Count of [`Contract`]s created in this [`Month`].
    pub count: i64,
}

/// Calendar month in the `YYYY-MM` form.
///
/// The lexicographical ordering of [`Month`]s is chronological.
#[derive(
    AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Month(String);

impl Month {
    /// Creates a new [`Month`] if the given `month` is in the `YYYY-MM` form.
    #[must_use]
    pub fn new(month: impl Into<String>) -> Option<Self> {
        let month = month.into();
        Self::check(&month).then_some(Self(month))
    }

    /// Checks whether the given `month` is a valid [`Month`].
    fn check(month: impl AsRef<str>) -> bool {
        let month = month.as_ref();
        let Some((year, num)) = month.split_once('-') else {
            return false;
        };
        year.len() == 4
            && year.bytes().all(|b| b.is_ascii_digit())
            && matches!(num.as_bytes(), [b'0', b'1'..=b'9'] | [b'1', b'0'..=b'2'])
    }
}

impl FromStr for Month {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Month`")
    }
}

#[cfg(test)]
mod spec {
    use common::datetime::{Date, Month as CalendarMonth};

    use crate::filter::{Op, Value};

    use super::{Month, Window};

    #[test]
    fn window_until_covers_whole_day() {
        let until =
            Date::from_calendar_date(2024, CalendarMonth::June, 30).unwrap();
        let p = Window {
            since: None,
            until: Some(until),
        }
        .predicate("created_at");

        assert_eq!(p.atoms().len(), 1);
        assert_eq!(p.atoms()[0].op, Op::Before);
        assert_eq!(
            p.atoms()[0].value,
            Value::Date(
                Date::from_calendar_date(2024, CalendarMonth::July, 1)
                    .unwrap(),
            ),
        );
    }

    #[test]
    fn empty_window_renders_no_conditions() {
        assert!(Window::default().predicate("created_at").is_empty());
    }

    #[test]
    fn month_form() {
        assert!(Month::new("2024-01").is_some());
        assert!(Month::new("2024-12").is_some());

        assert!(Month::new("2024-13").is_none());
        assert!(Month::new("2024-00").is_none());
        assert!(Month::new("24-01").is_none());
        assert!(Month::new("2024-1").is_none());
    }

    #[test]
    fn month_ordering_is_chronological() {
        let mut months: Vec<Month> = ["2024-11", "2023-12", "2024-02"]
            .into_iter()
            .map(|m| m.parse().unwrap())
            .collect();
        months.sort();

        assert_eq!(
            months,
            ["2023-12", "2024-02", "2024-11"]
                .into_iter()
                .map(|m| m.parse().unwrap())
                .collect::<Vec<Month>>(),
        );
    }
}

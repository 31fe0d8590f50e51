//! Composable filtering predicates.
//!
//! A [`Predicate`] is a pure, store-agnostic description of a composite
//! filter condition: an ordered set of [`Atom`]s combined with logical AND.
//! Optional criteria plug in through builder methods accepting [`Option`]s,
//! so any subset of them (including the empty one) composes into a valid
//! condition: absent and empty values contribute nothing, and an empty
//! [`Predicate`] is equivalent to `TRUE`.
//!
//! Translation into the native syntax of a concrete store happens in the
//! corresponding adapter (see [`infra::database::postgres`]), keeping
//! construction independently testable.
//!
//! [`infra::database::postgres`]: crate::infra::database::postgres

use common::Date;
use uuid::Uuid;

/// Composite filter condition over a single result set.
///
/// Combining is AND-only, associative and order-independent: merging in a
/// predicate built of absent criteria is the identity.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Predicate(Vec<Atom>);

/// Atomic condition over a single field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Atom {
    /// Field the condition applies to.
    pub field: &'static str,

    /// Operator of the condition.
    pub op: Op,

    /// Value the [`field`] is matched against.
    ///
    /// [`field`]: Atom::field
    pub value: Value,
}

/// Operator of an [`Atom`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Op {
    /// Case-insensitive substring match.
    ContainsIgnoringCase,

    /// Case-sensitive substring match.
    Contains,

    /// Exact equality.
    Equals,

    /// `>=` comparison.
    AtLeast,

    /// `<=` comparison.
    AtMost,

    /// `<` comparison.
    Before,
}

/// Value of an [`Atom`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    /// Textual value.
    Text(String),

    /// Calendar [`Date`] value.
    Date(Date),

    /// ID value.
    Id(Uuid),
}

impl Predicate {
    /// Creates a new empty [`Predicate`], matching everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges the provided [`Predicate`] into this one, combining their
    /// conditions with logical AND.
    #[must_use]
    pub fn and(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Indicates whether this [`Predicate`] contains no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the [`Atom`]s of this [`Predicate`] in composition order.
    #[must_use]
    pub fn atoms(&self) -> &[Atom] {
        &self.0
    }

    /// Adds a case-insensitive substring match over the `field`, if the
    /// `value` is present and non-empty.
    #[must_use]
    pub fn contains_ignoring_case(
        self,
        field: &'static str,
        value: Option<impl AsRef<str>>,
    ) -> Self {
        self.text(field, Op::ContainsIgnoringCase, value)
    }

    /// Adds a case-sensitive substring match over the `field`, if the `value`
    /// is present and non-empty.
    #[must_use]
    pub fn contains(
        self,
        field: &'static str,
        value: Option<impl AsRef<str>>,
    ) -> Self {
        self.text(field, Op::Contains, value)
    }

    /// Adds an exact equality match over the `field`, if the `value` is
    /// present and non-empty.
    #[must_use]
    pub fn equals(
        self,
        field: &'static str,
        value: Option<impl AsRef<str>>,
    ) -> Self {
        self.text(field, Op::Equals, value)
    }

    /// Adds an exact ID equality match over the `field`.
    #[must_use]
    pub fn equals_id(mut self, field: &'static str, value: Uuid) -> Self {
        self.0.push(Atom {
            field,
            op: Op::Equals,
            value: Value::Id(value),
        });
        self
    }

    /// Adds a `field >= value` condition, if the `value` is present.
    #[must_use]
    pub fn at_least(self, field: &'static str, value: Option<Date>) -> Self {
        self.date(field, Op::AtLeast, value)
    }

    /// Adds a `field <= value` condition, if the `value` is present.
    #[must_use]
    pub fn at_most(self, field: &'static str, value: Option<Date>) -> Self {
        self.date(field, Op::AtMost, value)
    }

    /// Adds a `field < value` condition, if the `value` is present.
    #[must_use]
    pub fn before(self, field: &'static str, value: Option<Date>) -> Self {
        self.date(field, Op::Before, value)
    }

    /// Adds a containment condition over a `[start_field, end_field]` span:
    /// the record's entire span must lie within the provided bounds.
    ///
    /// Three-way policy:
    /// - both bounds present: `start_field >= since AND end_field <= until`;
    /// - only `since`: `start_field >= since`;
    /// - only `until`: `end_field <= until`;
    /// - neither: no condition.
    ///
    /// This is a containment test, not an overlap test.
    #[must_use]
    pub fn within_period(
        self,
        start_field: &'static str,
        end_field: &'static str,
        since: Option<Date>,
        until: Option<Date>,
    ) -> Self {
        self.at_least(start_field, since).at_most(end_field, until)
    }

    /// Adds a textual [`Atom`], treating absent and empty values identically
    /// as "no condition".
    fn text(
        mut self,
        field: &'static str,
        op: Op,
        value: Option<impl AsRef<str>>,
    ) -> Self {
        if let Some(v) = value {
            let v = v.as_ref();
            if !v.is_empty() {
                self.0.push(Atom {
                    field,
                    op,
                    value: Value::Text(v.into()),
                });
            }
        }
        self
    }

    /// Adds a [`Date`] [`Atom`], if the `value` is present.
    fn date(
        mut self,
        field: &'static str,
        op: Op,
        value: Option<Date>,
    ) -> Self {
        if let Some(v) = value {
            self.0.push(Atom {
                field,
                op,
                value: Value::Date(v),
            });
        }
        self
    }
}

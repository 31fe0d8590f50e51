//! [`Client`] definitions.

use std::{str::FromStr, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user;
#[cfg(doc)]
use super::User;

/// Insured client of the agency.
///
/// Every [`Client`] is owned by exactly one agent [`User`], assigned at the
/// moment of registration and immutable afterwards.
#[derive(Clone, Debug)]
pub struct Client {
    /// ID of this [`Client`].
    pub id: Id,

    /// Full [`Name`] of this [`Client`].
    pub name: Name,

    /// [`Passport`] of this [`Client`], if provided.
    ///
    /// Serves as the natural key for duplicate detection.
    pub passport: Option<Passport>,

    /// [`Phone`] of this [`Client`].
    ///
    /// Globally unique.
    pub phone: Phone,

    /// [`Email`] of this [`Client`], if provided.
    pub email: Option<Email>,

    /// [`DateTime`] when this [`Client`] was registered.
    pub registered_at: RegistrationDateTime,

    /// ID of the agent [`User`] owning this [`Client`].
    pub agent_id: user::Id,
}

/// ID of a [`Client`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    derive_more::FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Full name of a [`Client`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 200
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Passport of a [`Client`].
///
/// [`Series`] and [`Number`] together form the natural key used for duplicate
/// detection of [`Client`]s.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Passport {
    /// [`Series`] of this [`Passport`].
    pub series: Series,

    /// [`Number`] of this [`Passport`].
    pub number: Number,
}

/// Series of a [`Passport`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Series(String);

impl Series {
    /// Creates a new [`Series`] if the given `series` is valid.
    #[must_use]
    pub fn new(series: impl Into<String>) -> Option<Self> {
        let series = series.into();
        (!series.is_empty()
            && series.len() <= 10
            && series.chars().all(|c| c.is_alphanumeric()))
        .then_some(Self(series))
    }
}

impl FromStr for Series {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Series`")
    }
}

/// Number of a [`Passport`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Number(String);

impl Number {
    /// Creates a new [`Number`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        (!number.is_empty()
            && number.len() <= 20
            && number.chars().all(|c| c.is_alphanumeric()))
        .then_some(Self(number))
    }
}

impl FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Number`")
    }
}

/// Phone number of a [`Client`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `phone` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(phone: impl Into<String>) -> Self {
        Self(phone.into())
    }

    /// Creates a new [`Phone`] if the given `phone` is valid.
    #[must_use]
    pub fn new(phone: impl Into<String>) -> Option<Self> {
        let phone = phone.into();
        Self::check(&phone).then_some(Self(phone))
    }

    /// Checks whether the given `phone` is a valid [`Phone`].
    fn check(phone: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] invariants:
        /// - Must consist of digits, `+`, `(`, `)`, `-` or spaces;
        /// - Must contain between 4 and 20 characters.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?[0-9()\- ]{4,19}$").expect("valid regex")
        });

        REGEX.is_match(phone.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Email address of a [`Client`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        let address = address.as_ref();
        address.len() <= 100
            && address
                .split_once('@')
                .is_some_and(|(l, r)| !l.is_empty() && r.contains('.'))
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// [`DateTime`] when a [`Client`] was registered.
pub type RegistrationDateTime = DateTimeOf<(Client, unit::Registration)>;

#[cfg(test)]
mod spec {
    use super::{Passport, Phone};

    #[test]
    fn phone_format() {
        assert!(Phone::new("+7 (921) 123-45-67").is_some());
        assert!(Phone::new("88121234567").is_some());

        assert!(Phone::new("").is_none());
        assert!(Phone::new("123").is_none());
        assert!(Phone::new("not-a-phone").is_none());
        assert!(Phone::new("+7 (921) 123-45-67 ext 1234").is_none());
    }

    #[test]
    fn passport_natural_key() {
        let a = Passport {
            series: "AB".parse().unwrap(),
            number: "123456".parse().unwrap(),
        };
        let b = Passport {
            series: "AB".parse().unwrap(),
            number: "123456".parse().unwrap(),
        };
        let c = Passport {
            series: "AB".parse().unwrap(),
            number: "654321".parse().unwrap(),
        };

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

//! [`InsuranceType`] definitions.

use std::str::FromStr;

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

#[cfg(doc)]
use super::Contract;

/// Insurance type a [`Contract`] can be made for.
///
/// A small fixed reference set (CASCO, OSAGO, life, property, …) maintained
/// outside of this service.
#[derive(Clone, Debug)]
pub struct InsuranceType {
    /// [`Code`] of this [`InsuranceType`].
    pub code: Code,

    /// Display [`Name`] of this [`InsuranceType`].
    pub name: Name,

    /// [`Category`] of this [`InsuranceType`], if any.
    pub category: Option<Category>,

    /// Indicator whether new [`Contract`]s can be made for this
    /// [`InsuranceType`].
    pub active: bool,
}

/// Code of an [`InsuranceType`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Code(String);

impl Code {
    /// Creates a new [`Code`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        (!code.is_empty()
            && code.len() <= 50
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_'))
        .then_some(Self(code))
    }
}

impl FromStr for Code {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Code`")
    }
}

/// Display name of an [`InsuranceType`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (!name.is_empty() && name.len() <= 100).then_some(Self(name))
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Category of an [`InsuranceType`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Category(String);

impl Category {
    /// Creates a new [`Category`] if the given `category` is valid.
    #[must_use]
    pub fn new(category: impl Into<String>) -> Option<Self> {
        let category = category.into();
        (!category.is_empty() && category.len() <= 100)
            .then_some(Self(category))
    }
}

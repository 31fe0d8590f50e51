//! [`Contract`] definitions.

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{unit, Date, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use xxhash_rust::xxh3;

use super::{client, contract_status, insurance_type, user};
#[cfg(doc)]
use super::{Client, User};

/// Insurance contract between a [`Client`] and the agency.
///
/// Owned by exactly one agent [`User`], assigned at the moment of creation
/// and immutable afterwards.
#[derive(Clone, Debug)]
pub struct Contract {
    /// ID of this [`Contract`].
    pub id: Id,

    /// Unique [`Number`] of this [`Contract`].
    ///
    /// Generated by the system once and stable afterwards.
    pub number: Number,

    /// ID of the insured [`Client`].
    pub client_id: client::Id,

    /// Code of the insurance type of this [`Contract`].
    pub insurance_type: insurance_type::Code,

    /// ID of the agent [`User`] owning this [`Contract`].
    pub agent_id: user::Id,

    /// Code of the status of this [`Contract`].
    pub status: contract_status::Code,

    /// [`Date`] when the coverage starts.
    pub start_date: Date,

    /// [`Date`] when the coverage ends.
    ///
    /// Always strictly after the [`start_date`].
    ///
    /// [`start_date`]: Contract::start_date
    pub end_date: Date,

    /// Premium paid by the [`Client`].
    ///
    /// Non-negative.
    pub premium: Money,

    /// Insured amount paid out on a claim.
    ///
    /// Non-negative.
    pub insured: Money,

    /// [`DateTime`] when this [`Contract`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Contract`].
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

/// Unique number of a [`Contract`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Number(String);

impl Number {
    /// Generates a [`Number`] for the [`Contract`] with the provided [`Id`]
    /// created at the provided [`DateTime`].
    ///
    /// The result is unique (creation timestamp plus a hash of the random
    /// [`Id`]) and stable: regenerating for the same [`Contract`] yields the
    /// same [`Number`].
    #[must_use]
    pub fn generate(prefix: &str, id: Id, at: CreationDateTime) -> Self {
        let ts = at.unix_timestamp();
        let tag = xxh3::xxh3_64(Uuid::from(id).as_bytes()) % 1_000_000;
        Self(format!("{prefix}-{ts}-{tag:06}"))
    }
}

impl FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s.len() <= 100
            && s.chars().all(|c| c.is_alphanumeric() || c == '-');
        valid.then(|| Self(s.into())).ok_or("invalid `Number`")
    }
}

/// [`DateTime`] when a [`Contract`] was created.
pub type CreationDateTime = DateTimeOf<(Contract, unit::Creation)>;

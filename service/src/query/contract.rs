//! [`Query`] collection related to a single [`Contract`].
//!
//! [`Contract`]: crate::domain::Contract

use common::operations::By;

use crate::{access::Scope, domain::contract, read};
#[cfg(doc)]
use crate::{domain::Contract, Query};

use super::DatabaseQuery;

/// Queries a [`Contract`] by its [`contract::Id`].
///
/// A [`Contract`] outside the provided [`Scope`] resolves to [`None`],
/// exactly as a missing one.
pub type ById =
    DatabaseQuery<By<Option<read::contract::Record>, (Scope, contract::Id)>>;

//! [`Query`] collection related to a single [`Client`].
//!
//! [`Client`]: crate::domain::Client

use common::operations::By;

use crate::{access::Scope, domain::client, read};
#[cfg(doc)]
use crate::{domain::Client, Query};

use super::DatabaseQuery;

/// Queries a [`Client`] by its [`client::Id`].
///
/// A [`Client`] outside the provided [`Scope`] resolves to [`None`], exactly
/// as a missing one.
pub type ById =
    DatabaseQuery<By<Option<read::client::Record>, (Scope, client::Id)>>;

//! [`Query`] collection related to the multiple [`Contract`]s.
//!
//! [`Contract`]: crate::domain::Contract

use common::operations::By;

use crate::{access::Scope, read};
#[cfg(doc)]
use crate::{domain::Contract, Query};

use super::DatabaseQuery;

/// Queries a list of [`Contract`]s visible in a [`Scope`].
pub type List = DatabaseQuery<
    By<read::contract::list::Page, (Scope, read::contract::list::Selector)>,
>;

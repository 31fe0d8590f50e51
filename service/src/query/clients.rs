//! [`Query`] collection related to the multiple [`Client`]s.
//!
//! [`Client`]: crate::domain::Client

use common::operations::By;

use crate::{access::Scope, read};
#[cfg(doc)]
use crate::{domain::Client, Query};

use super::DatabaseQuery;

/// Queries a list of [`Client`]s visible in a [`Scope`].
pub type List = DatabaseQuery<
    By<read::client::list::Page, (Scope, read::client::list::Selector)>,
>;

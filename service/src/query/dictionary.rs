//! [`Query`] collection related to the lookup dictionaries.

use common::operations::By;

use crate::domain::{ContractStatus, InsuranceType};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the known [`InsuranceType`]s.
pub type InsuranceTypes = DatabaseQuery<By<Vec<InsuranceType>, ()>>;

/// Queries all the known [`ContractStatus`]es.
pub type ContractStatuses = DatabaseQuery<By<Vec<ContractStatus>, ()>>;

//! [`Command`] definition.

pub mod create_client;
pub mod create_contract;
pub mod delete_client;
pub mod delete_contract;
pub mod update_client;
pub mod update_contract;

#[cfg(test)]
pub(crate) mod mock;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_client::CreateClient, create_contract::CreateContract,
    delete_client::DeleteClient, delete_contract::DeleteContract,
    update_client::UpdateClient, update_contract::UpdateContract,
};

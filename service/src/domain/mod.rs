//! Domain definitions.

pub mod client;
pub mod contract;
pub mod contract_status;
pub mod insurance_type;
pub mod user;

pub use self::{
    client::Client, contract::Contract, contract_status::ContractStatus,
    insurance_type::InsuranceType, user::User,
};

//! Read entities definitions.

pub mod client;
pub mod contract;
pub mod statistics;

//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler of some operation described by its `Args`.
///
/// Queries, commands and database operations are all expressed as [`Handler`]
/// implementations, distinguished by the type of their arguments.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}

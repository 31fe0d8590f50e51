//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection},
        Database, Postgres,
    },
};

/// Restores a [`User`] from the provided [`Row`].
///
/// An unknown `role` value fails the decode, so never widens visibility.
fn user_from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        login: row.get("login"),
        name: row.get("name"),
        role: row.get("role"),
        active: row.get("active"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, login, name, role, active, created_at \
            FROM users \
            WHERE id = $1::UUID \
            LIMIT 1";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(user_from_row))
    }
}

impl<C> Database<Select<By<Option<User>, user::Login>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();

        const SQL: &str = "\
            SELECT id, login, name, role, active, created_at \
            FROM users \
            WHERE login = $1::VARCHAR \
            LIMIT 1";
        self.query_opt(SQL, &[&login])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(user_from_row))
    }
}

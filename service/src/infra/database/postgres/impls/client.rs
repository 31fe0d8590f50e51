//! [`Client`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;
use uuid::Uuid;

use crate::{
    access::Scope,
    domain::{client, Client},
    infra::{
        database::{
            self,
            postgres::{Connection, SqlPredicate},
        },
        Database, Postgres,
    },
    read,
};

/// Restores a [`Client`] from the provided [`Row`].
fn client_from_row(row: &Row) -> Client {
    Client {
        id: row.get("id"),
        name: row.get("name"),
        passport: row
            .get::<_, Option<client::Series>>("passport_series")
            .zip(row.get::<_, Option<client::Number>>("passport_number"))
            .map(|(series, number)| client::Passport { series, number }),
        phone: row.get("phone"),
        email: row.get("email"),
        registered_at: row.get("registered_at"),
        agent_id: row.get("agent_id"),
    }
}

/// Restores a [`read::client::Record`] from the provided [`Row`].
fn record_from_row(row: &Row) -> read::client::Record {
    read::client::Record {
        id: row.get("id"),
        name: row.get("name"),
        passport: row
            .get::<_, Option<client::Series>>("passport_series")
            .zip(row.get::<_, Option<client::Number>>("passport_number"))
            .map(|(series, number)| client::Passport { series, number }),
        phone: row.get("phone"),
        email: row.get("email"),
        registered_at: row.get("registered_at"),
        agent_id: row.get("agent_id"),
        agent_name: row.get("agent_name"),
    }
}

impl<C> Database<Select<By<Option<Client>, (Scope, client::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Client>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Client>, (Scope, client::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (scope, id) = by.into_inner();

        let conditions = SqlPredicate::render(
            &scope.predicate("agent_id").equals_id("id", Uuid::from(id)),
            "c",
        );
        let sql = format!(
            "SELECT c.id, c.name, \
                    c.passport_series, c.passport_number, \
                    c.phone, c.email, \
                    c.registered_at, c.agent_id \
             FROM clients c \
             WHERE TRUE{conditions} \
             LIMIT 1",
            conditions = conditions.sql(),
        );
        self.query_opt(&sql, &conditions.params())
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(client_from_row))
    }
}

impl<'l, C> Database<Select<By<Option<Client>, &'l client::Passport>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Client>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Client>, &'l client::Passport>>,
    ) -> Result<Self::Ok, Self::Err> {
        let passport = by.into_inner();

        const SQL: &str = "\
            SELECT c.id, c.name, \
                   c.passport_series, c.passport_number, \
                   c.phone, c.email, \
                   c.registered_at, c.agent_id \
            FROM clients c \
            WHERE c.passport_series = $1::VARCHAR \
              AND c.passport_number = $2::VARCHAR \
            LIMIT 1";
        self.query_opt(SQL, &[&passport.series, &passport.number])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(client_from_row))
    }
}

impl<'l, C> Database<Select<By<Option<Client>, &'l client::Phone>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Client>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Client>, &'l client::Phone>>,
    ) -> Result<Self::Ok, Self::Err> {
        let phone = by.into_inner();

        const SQL: &str = "\
            SELECT c.id, c.name, \
                   c.passport_series, c.passport_number, \
                   c.phone, c.email, \
                   c.registered_at, c.agent_id \
            FROM clients c \
            WHERE c.phone = $1::VARCHAR \
            LIMIT 1";
        self.query_opt(SQL, &[&phone])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(client_from_row))
    }
}

impl<C> Database<Select<By<read::client::HasContracts, client::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::client::HasContracts;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::client::HasContracts, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT EXISTS(\
                SELECT 1 \
                FROM contracts \
                WHERE client_id = $1::UUID\
            )";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, bool>(0).into())
    }
}

impl<C> Database<Insert<Client>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Client>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(client): Insert<Client>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(client)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Client>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(client): Update<Client>,
    ) -> Result<Self::Ok, Self::Err> {
        let Client {
            id,
            name,
            passport,
            phone,
            email,
            registered_at,
            agent_id,
        } = client;
        let (passport_series, passport_number) =
            passport.map(|p| (p.series, p.number)).unzip();

        const SQL: &str = "\
            INSERT INTO clients (\
                id, name, \
                passport_series, passport_number, \
                phone, email, \
                registered_at, agent_id\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, \
                $3::VARCHAR, $4::VARCHAR, \
                $5::VARCHAR, $6::VARCHAR, \
                $7::TIMESTAMPTZ, $8::UUID\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                passport_series = EXCLUDED.passport_series, \
                passport_number = EXCLUDED.passport_number, \
                phone = EXCLUDED.phone, \
                email = EXCLUDED.email, \
                registered_at = EXCLUDED.registered_at, \
                agent_id = EXCLUDED.agent_id";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &passport_series,
                &passport_number,
                &phone,
                &email,
                &registered_at,
                &agent_id,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<client::Id>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(id): Delete<client::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            DELETE FROM clients \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<
            By<
                read::client::list::Page,
                (Scope, read::client::list::Selector),
            >,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::client::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                read::client::list::Page,
                (Scope, read::client::list::Selector),
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (scope, selector) = by.into_inner();
        let read::client::list::Selector {
            arguments,
            filter,
            sorting,
        } = selector;

        let conditions = SqlPredicate::render(
            &scope.predicate("agent_id").and(filter.predicate()),
            "c",
        );

        let count_sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM clients c \
             WHERE TRUE{conditions}",
            conditions = conditions.sql(),
        );
        let total = self
            .query_opt(&count_sql, &conditions.params())
            .await
            .map_err(tracerr::wrap!())?
            .expect("always exists")
            .get::<_, i64>(0);

        let limit = i64::try_from(arguments.limit()).expect("fits `INT8`");
        let offset = i64::try_from(arguments.offset()).expect("fits `INT8`");

        let sql = format!(
            "SELECT c.id, c.name, \
                    c.passport_series, c.passport_number, \
                    c.phone, c.email, \
                    c.registered_at, c.agent_id, \
                    u.name AS agent_name \
             FROM clients c \
             JOIN users u ON u.id = c.agent_id \
             WHERE TRUE{conditions} \
             ORDER BY {sort_by} {direction}, c.id ASC \
             LIMIT ${limit_idx}::INT8 OFFSET ${offset_idx}::INT8",
            conditions = conditions.sql(),
            sort_by = match sorting.key {
                read::client::list::SortKey::Name => "c.name",
                read::client::list::SortKey::RegistrationDate => {
                    "c.registered_at"
                }
                read::client::list::SortKey::Phone => "c.phone",
            },
            direction = sorting.direction.sql(),
            limit_idx = conditions.next_index(),
            offset_idx = conditions.next_index() + 1,
        );
        let mut params = conditions.params();
        params.push(&limit);
        params.push(&offset);

        let nodes = self
            .query(&sql, params.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(record_from_row)
            .collect::<Vec<_>>();

        Ok(read::client::list::Page::new(
            arguments,
            nodes,
            u64::try_from(total).expect("non-negative"),
        ))
    }
}

impl<C> Database<Select<By<Option<read::client::Record>, (Scope, client::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<read::client::Record>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<read::client::Record>, (Scope, client::Id)>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (scope, id) = by.into_inner();

        let conditions = SqlPredicate::render(
            &scope.predicate("agent_id").equals_id("id", Uuid::from(id)),
            "c",
        );
        let sql = format!(
            "SELECT c.id, c.name, \
                    c.passport_series, c.passport_number, \
                    c.phone, c.email, \
                    c.registered_at, c.agent_id, \
                    u.name AS agent_name \
             FROM clients c \
             JOIN users u ON u.id = c.agent_id \
             WHERE TRUE{conditions} \
             LIMIT 1",
            conditions = conditions.sql(),
        );
        self.query_opt(&sql, &conditions.params())
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(record_from_row))
    }
}

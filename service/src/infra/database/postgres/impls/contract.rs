//! [`Contract`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;
use uuid::Uuid;

use crate::{
    access::Scope,
    domain::{contract, Contract},
    infra::{
        database::{
            self,
            postgres::{Connection, SqlPredicate},
        },
        Database, Postgres,
    },
    read,
};

/// Restores a [`Contract`] from the provided [`Row`].
fn contract_from_row(row: &Row) -> Contract {
    Contract {
        id: row.get("id"),
        number: row.get("number"),
        client_id: row.get("client_id"),
        insurance_type: row.get("insurance_type"),
        agent_id: row.get("agent_id"),
        status: row.get("status"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        premium: Money {
            amount: row.get("premium_amount"),
            currency: row.get("premium_currency"),
        },
        insured: Money {
            amount: row.get("insured_amount"),
            currency: row.get("insured_currency"),
        },
        created_at: row.get("created_at"),
    }
}

/// Restores a [`read::contract::Record`] from the provided [`Row`].
fn record_from_row(row: &Row) -> read::contract::Record {
    read::contract::Record {
        id: row.get("id"),
        number: row.get("number"),
        client_id: row.get("client_id"),
        client_name: row.get("client_name"),
        insurance_type: row.get("insurance_type"),
        insurance_type_name: row.get("insurance_type_name"),
        agent_id: row.get("agent_id"),
        agent_name: row.get("agent_name"),
        status: row.get("status"),
        status_name: row.get("status_name"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        premium: Money {
            amount: row.get("premium_amount"),
            currency: row.get("premium_currency"),
        },
        insured: Money {
            amount: row.get("insured_amount"),
            currency: row.get("insured_currency"),
        },
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Contract>, (Scope, contract::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contract>, (Scope, contract::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (scope, id) = by.into_inner();

        let conditions = SqlPredicate::render(
            &scope.predicate("agent_id").equals_id("id", Uuid::from(id)),
            "c",
        );
        let sql = format!(
            "SELECT c.id, c.number, c.client_id, \
                    c.insurance_type, c.agent_id, c.status, \
                    c.start_date, c.end_date, \
                    c.premium_amount, c.premium_currency, \
                    c.insured_amount, c.insured_currency, \
                    c.created_at \
             FROM contracts c \
             WHERE TRUE{conditions} \
             LIMIT 1",
            conditions = conditions.sql(),
        );
        self.query_opt(&sql, &conditions.params())
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(contract_from_row))
    }
}

impl<C> Database<Insert<Contract>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Contract>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(contract): Insert<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(contract))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Contract>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(contract): Update<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        let Contract {
            id,
            number,
            client_id,
            insurance_type,
            agent_id,
            status,
            start_date,
            end_date,
            premium,
            insured,
            created_at,
        } = contract;

        const SQL: &str = "\
            INSERT INTO contracts (\
                id, number, client_id, \
                insurance_type, agent_id, status, \
                start_date, end_date, \
                premium_amount, premium_currency, \
                insured_amount, insured_currency, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::UUID, \
                $4::VARCHAR, $5::UUID, $6::VARCHAR, \
                $7::DATE, $8::DATE, \
                $9::NUMERIC, $10::INT2, \
                $11::NUMERIC, $12::INT2, \
                $13::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET number = EXCLUDED.number, \
                client_id = EXCLUDED.client_id, \
                insurance_type = EXCLUDED.insurance_type, \
                agent_id = EXCLUDED.agent_id, \
                status = EXCLUDED.status, \
                start_date = EXCLUDED.start_date, \
                end_date = EXCLUDED.end_date, \
                premium_amount = EXCLUDED.premium_amount, \
                premium_currency = EXCLUDED.premium_currency, \
                insured_amount = EXCLUDED.insured_amount, \
                insured_currency = EXCLUDED.insured_currency, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &number,
                &client_id,
                &insurance_type,
                &agent_id,
                &status,
                &start_date,
                &end_date,
                &premium.amount,
                &premium.currency,
                &insured.amount,
                &insured.currency,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<contract::Id>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(id): Delete<contract::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            DELETE FROM contracts \
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
                read::contract::list::Page,
                (Scope, read::contract::list::Selector),
            >,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::contract::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                read::contract::list::Page,
                (Scope, read::contract::list::Selector),
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (scope, selector) = by.into_inner();
        let read::contract::list::Selector {
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
             FROM contracts c \
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
            "SELECT c.id, c.number, c.client_id, \
                    c.insurance_type, c.agent_id, c.status, \
                    c.start_date, c.end_date, \
                    c.premium_amount, c.premium_currency, \
                    c.insured_amount, c.insured_currency, \
                    c.created_at, \
                    cl.name AS client_name, \
                    u.name AS agent_name, \
                    t.name AS insurance_type_name, \
                    s.name AS status_name \
             FROM contracts c \
             JOIN clients cl ON cl.id = c.client_id \
             JOIN users u ON u.id = c.agent_id \
             JOIN insurance_types t ON t.code = c.insurance_type \
             JOIN contract_statuses s ON s.code = c.status \
             WHERE TRUE{conditions} \
             ORDER BY {sort_by} {direction}, c.id ASC \
             LIMIT ${limit_idx}::INT8 OFFSET ${offset_idx}::INT8",
            conditions = conditions.sql(),
            sort_by = match sorting.key {
                read::contract::list::SortKey::CreatedAt => "c.created_at",
                read::contract::list::SortKey::StartDate => "c.start_date",
                read::contract::list::SortKey::EndDate => "c.end_date",
                read::contract::list::SortKey::Number => "c.number",
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

        Ok(read::contract::list::Page::new(
            arguments,
            nodes,
            u64::try_from(total).expect("non-negative"),
        ))
    }
}

impl<C>
    Database<Select<By<Option<read::contract::Record>, (Scope, contract::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<read::contract::Record>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<read::contract::Record>, (Scope, contract::Id)>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (scope, id) = by.into_inner();

        let conditions = SqlPredicate::render(
            &scope.predicate("agent_id").equals_id("id", Uuid::from(id)),
            "c",
        );
        let sql = format!(
            "SELECT c.id, c.number, c.client_id, \
                    c.insurance_type, c.agent_id, c.status, \
                    c.start_date, c.end_date, \
                    c.premium_amount, c.premium_currency, \
                    c.insured_amount, c.insured_currency, \
                    c.created_at, \
                    cl.name AS client_name, \
                    u.name AS agent_name, \
                    t.name AS insurance_type_name, \
                    s.name AS status_name \
             FROM contracts c \
             JOIN clients cl ON cl.id = c.client_id \
             JOIN users u ON u.id = c.agent_id \
             JOIN insurance_types t ON t.code = c.insurance_type \
             JOIN contract_statuses s ON s.code = c.status \
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

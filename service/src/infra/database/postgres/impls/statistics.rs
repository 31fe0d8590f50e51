//! Statistics [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    access::Scope,
    infra::{
        database::{
            self,
            postgres::{Connection, SqlPredicate},
        },
        Database, Postgres,
    },
    read::statistics::{
        MonthCount, TotalClients, TotalContracts, TypeAverage, TypeCount,
        Window,
    },
};

impl<C> Database<Select<By<TotalClients, (Scope, Window)>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = TotalClients;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<TotalClients, (Scope, Window)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (scope, window) = by.into_inner();

        let conditions = SqlPredicate::render(
            &scope
                .predicate("agent_id")
                .and(window.predicate("registered_at")),
            "c",
        );
        let sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM clients c \
             WHERE TRUE{conditions}",
            conditions = conditions.sql(),
        );
        self.query_opt(&sql, &conditions.params())
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i64>(0).into())
    }
}

impl<C> Database<Select<By<TotalContracts, (Scope, Window)>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = TotalContracts;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<TotalContracts, (Scope, Window)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (scope, window) = by.into_inner();

        let conditions = SqlPredicate::render(
            &scope
                .predicate("agent_id")
                .and(window.predicate("created_at")),
            "c",
        );
        let sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM contracts c \
             WHERE TRUE{conditions}",
            conditions = conditions.sql(),
        );
        self.query_opt(&sql, &conditions.params())
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i64>(0).into())
    }
}

impl<C> Database<Select<By<Vec<TypeCount>, (Scope, Window)>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<TypeCount>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<TypeCount>, (Scope, Window)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (scope, window) = by.into_inner();

        let conditions = SqlPredicate::render(
            &scope
                .predicate("agent_id")
                .and(window.predicate("created_at")),
            "c",
        );
        let sql = format!(
            "SELECT t.name, COUNT(*)::INT8 AS count \
             FROM contracts c \
             JOIN insurance_types t ON t.code = c.insurance_type \
             WHERE TRUE{conditions} \
             GROUP BY t.name \
             ORDER BY t.name",
            conditions = conditions.sql(),
        );
        Ok(self
            .query(&sql, &conditions.params())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| TypeCount {
                name: row.get("name"),
                count: row.get("count"),
            })
            .collect())
    }
}

impl<C> Database<Select<By<Vec<TypeAverage>, (Scope, Window)>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<TypeAverage>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<TypeAverage>, (Scope, Window)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (scope, window) = by.into_inner();

        let conditions = SqlPredicate::render(
            &scope
                .predicate("agent_id")
                .and(window.predicate("created_at")),
            "c",
        );
        // `AVG` over `NUMERIC` yields `NUMERIC`, so the mean stays exact.
        let sql = format!(
            "SELECT t.name, AVG(c.premium_amount) AS average \
             FROM contracts c \
             JOIN insurance_types t ON t.code = c.insurance_type \
             WHERE TRUE{conditions} \
             GROUP BY t.name \
             ORDER BY t.name",
            conditions = conditions.sql(),
        );
        Ok(self
            .query(&sql, &conditions.params())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| TypeAverage {
                name: row.get("name"),
                average: row.get("average"),
            })
            .collect())
    }
}

impl<C> Database<Select<By<Vec<MonthCount>, (Scope, Window)>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<MonthCount>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<MonthCount>, (Scope, Window)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (scope, window) = by.into_inner();

        let conditions = SqlPredicate::render(
            &scope
                .predicate("agent_id")
                .and(window.predicate("created_at")),
            "c",
        );
        let sql = format!(
            "SELECT TO_CHAR(c.created_at, 'YYYY-MM') AS month, \
                    COUNT(*)::INT8 AS count \
             FROM contracts c \
             WHERE TRUE{conditions} \
             GROUP BY 1 \
             ORDER BY 1",
            conditions = conditions.sql(),
        );
        Ok(self
            .query(&sql, &conditions.params())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| MonthCount {
                month: row.get("month"),
                count: row.get("count"),
            })
            .collect())
    }
}

//! Lookup table [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{contract_status, insurance_type, ContractStatus, InsuranceType},
    infra::{
        database::{self, postgres::Connection},
        Database, Postgres,
    },
};

impl<C> Database<Select<By<Vec<InsuranceType>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<InsuranceType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<InsuranceType>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT code, name, category, active \
            FROM insurance_types \
            ORDER BY code";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| InsuranceType {
                code: row.get("code"),
                name: row.get("name"),
                category: row.get("category"),
                active: row.get("active"),
            })
            .collect())
    }
}

impl<'l, C> Database<Select<By<Option<InsuranceType>, &'l insurance_type::Code>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<InsuranceType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<InsuranceType>, &'l insurance_type::Code>>,
    ) -> Result<Self::Ok, Self::Err> {
        let code = by.into_inner();

        const SQL: &str = "\
            SELECT code, name, category, active \
            FROM insurance_types \
            WHERE code = $1::VARCHAR \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&code])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| InsuranceType {
                code: row.get("code"),
                name: row.get("name"),
                category: row.get("category"),
                active: row.get("active"),
            }))
    }
}

impl<C> Database<Select<By<Vec<ContractStatus>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<ContractStatus>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<ContractStatus>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT code, name \
            FROM contract_statuses \
            ORDER BY code";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| ContractStatus {
                code: row.get("code"),
                name: row.get("name"),
            })
            .collect())
    }
}

impl<'l, C>
    Database<Select<By<Option<ContractStatus>, &'l contract_status::Code>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<ContractStatus>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<ContractStatus>, &'l contract_status::Code>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let code = by.into_inner();

        const SQL: &str = "\
            SELECT code, name \
            FROM contract_statuses \
            WHERE code = $1::VARCHAR \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&code])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| ContractStatus {
                code: row.get("code"),
                name: row.get("name"),
            }))
    }
}

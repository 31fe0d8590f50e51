//! [`Command`] for updating an existing [`Contract`].

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    Date, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    access::{Caller, Scope},
    domain::{
        client, contract, contract_status, insurance_type, Client, Contract,
        ContractStatus, InsuranceType,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Contract`].
///
/// The [`contract::Number`], the owning agent and the creation time are
/// immutable and preserved as-is.
#[derive(Clone, Debug)]
pub struct UpdateContract {
    /// [`Caller`] performing this [`Command`].
    pub caller: Caller,

    /// ID of the [`Contract`] to update.
    pub id: contract::Id,

    /// New ID of the insured [`Client`].
    pub client_id: client::Id,

    /// New [`insurance_type::Code`] of the [`Contract`].
    pub insurance_type: insurance_type::Code,

    /// New [`contract_status::Code`] of the [`Contract`].
    pub status: contract_status::Code,

    /// New first day of the coverage period.
    pub start_date: Date,

    /// New last day of the coverage period.
    pub end_date: Date,

    /// New premium paid under the [`Contract`].
    pub premium: Money,

    /// New sum insured under the [`Contract`].
    pub insured: Money,
}

impl<Db> Command<UpdateContract> for Service<Db>
where
    Db: Database<
            Select<By<Option<Contract>, (Scope, contract::Id)>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Client>, (Scope, client::Id)>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<InsuranceType>, &'l insurance_type::Code>>,
            Ok = Option<InsuranceType>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<ContractStatus>, &'l contract_status::Code>>,
            Ok = Option<ContractStatus>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Update<Contract>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateContract {
            caller,
            id,
            client_id,
            insurance_type,
            status,
            start_date,
            end_date,
            premium,
            insured,
        } = cmd;

        if end_date <= start_date {
            return Err(tracerr::new!(E::InvalidPeriod {
                start: start_date,
                end: end_date,
            }));
        }
        if premium.is_negative() || insured.is_negative() {
            return Err(tracerr::new!(E::NegativeAmount));
        }

        let existing = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new((
                caller.scope(),
                id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotFound(id))
            .map_err(tracerr::wrap!())?;

        let client = self
            .database()
            .execute(Select(By::<Option<Client>, _>::new((
                caller.scope(),
                client_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if client.is_none() {
            return Err(tracerr::new!(E::ClientNotExists(client_id)));
        }

        let typ = self
            .database()
            .execute(Select(By::new(&insurance_type)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::UnknownInsuranceType(insurance_type.clone()))
            .map_err(tracerr::wrap!())?;
        if !typ.active {
            return Err(tracerr::new!(E::InsuranceTypeInactive(
                insurance_type,
            )));
        }

        let st = self
            .database()
            .execute(Select(By::new(&status)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if st.is_none() {
            return Err(tracerr::new!(E::UnknownStatus(status)));
        }

        let contract = Contract {
            id,
            number: existing.number,
            client_id,
            insurance_type,
            agent_id: existing.agent_id,
            status,
            start_date,
            end_date,
            premium,
            insured,
            created_at: existing.created_at,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Update(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::debug!("`Contract` {} updated", contract.number);

        Ok(contract)
    }
}

/// Error of [`UpdateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// No visible [`Client`] exists with the provided ID.
    ///
    /// Covers both a missing [`Client`] and one outside the [`Caller`]'s
    /// [`Scope`].
    #[display("`Client` `{_0}` doesn't exist")]
    ClientNotExists(#[error(not(source))] client::Id),

    /// No visible [`Contract`] exists with the provided ID.
    ///
    /// Covers both a missing [`Contract`] and one outside the [`Caller`]'s
    /// [`Scope`].
    #[display("`Contract` `{_0}` doesn't exist")]
    ContractNotFound(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`InsuranceType`] is not available for [`Contract`]s.
    #[display("`{_0}` insurance type is inactive")]
    InsuranceTypeInactive(#[error(not(source))] insurance_type::Code),

    /// Coverage period doesn't end strictly after its start.
    #[display("Period `{start}..={end}` is invalid")]
    InvalidPeriod {
        /// First day of the rejected period.
        start: Date,

        /// Last day of the rejected period.
        end: Date,
    },

    /// Premium or sum insured is negative.
    #[display("Negative amount of money")]
    NegativeAmount,

    /// No [`InsuranceType`] exists with the provided code.
    #[display("`{_0}` insurance type is unknown")]
    UnknownInsuranceType(#[error(not(source))] insurance_type::Code),

    /// No [`ContractStatus`] exists with the provided code.
    #[display("`{_0}` status is unknown")]
    UnknownStatus(#[error(not(source))] contract_status::Code),
}

#[cfg(test)]
mod spec {
    use common::Date;
    use uuid::Uuid;

    use crate::{
        access::Caller,
        command::mock::{service, MockDb},
        domain::{client, contract, user, Client, Contract},
        Command as _,
    };

    use super::{ExecutionError, UpdateContract};

    fn agent() -> Caller {
        Caller {
            id: user::Id::from(Uuid::new_v4()),
            role: user::Role::Agent,
        }
    }

    fn client_of(agent_id: user::Id) -> Client {
        Client {
            id: client::Id::new(),
            name: "Ivanov Ivan".parse().unwrap(),
            passport: None,
            phone: "+7 (921) 123-45-67".parse().unwrap(),
            email: None,
            registered_at: client::RegistrationDateTime::now(),
            agent_id,
        }
    }

    fn contract_of(client_id: client::Id, agent_id: user::Id) -> Contract {
        let id = contract::Id::new();
        let created_at = contract::CreationDateTime::now();
        Contract {
            id,
            number: contract::Number::generate("INS", id, created_at),
            client_id,
            insurance_type: "KASKO".parse().unwrap(),
            agent_id,
            status: "DRAFT".parse().unwrap(),
            start_date: Date::from_ordinal_date(2024, 1).unwrap(),
            end_date: Date::from_ordinal_date(2024, 200).unwrap(),
            premium: "100RUB".parse().unwrap(),
            insured: "10000RUB".parse().unwrap(),
            created_at,
        }
    }

    fn cmd(
        caller: Caller,
        id: contract::Id,
        client_id: client::Id,
    ) -> UpdateContract {
        UpdateContract {
            caller,
            id,
            client_id,
            insurance_type: "KASKO".parse().unwrap(),
            status: "ACTIVE".parse().unwrap(),
            start_date: Date::from_ordinal_date(2024, 10).unwrap(),
            end_date: Date::from_ordinal_date(2024, 300).unwrap(),
            premium: "200RUB".parse().unwrap(),
            insured: "20000RUB".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn preserves_number_owner_and_creation_time() {
        let agent = agent();
        let db = MockDb::with_dictionaries();
        let c = client_of(agent.id);
        let before = contract_of(c.id, agent.id);
        db.seed_client(c.clone());
        db.seed_contract(before.clone());

        let after = service(db)
            .execute(cmd(agent, before.id, c.id))
            .await
            .unwrap();

        assert_eq!(after.number, before.number);
        assert_eq!(after.agent_id, before.agent_id);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.status, "ACTIVE".parse().unwrap());
    }

    #[tokio::test]
    async fn out_of_scope_contract_is_reported_as_missing() {
        let foreign_agent = user::Id::from(Uuid::new_v4());
        let db = MockDb::with_dictionaries();
        let c = client_of(foreign_agent);
        let foreign = contract_of(c.id, foreign_agent);
        db.seed_client(c.clone());
        db.seed_contract(foreign.clone());

        let err = service(db)
            .execute(cmd(agent(), foreign.id, c.id))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ContractNotFound(id) if *id == foreign.id,
        ));
    }

    #[tokio::test]
    async fn revalidates_period() {
        let agent = agent();
        let db = MockDb::with_dictionaries();
        let c = client_of(agent.id);
        let before = contract_of(c.id, agent.id);
        db.seed_client(c.clone());
        db.seed_contract(before.clone());

        let mut backward = cmd(agent, before.id, c.id);
        backward.end_date = backward.start_date;
        let err = service(db).execute(backward).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidPeriod { .. },
        ));
    }
}

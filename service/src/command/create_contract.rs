//! [`Command`] for creating a new [`Contract`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
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

/// [`Command`] for creating a new [`Contract`].
///
/// The new [`Contract`] is owned by the [`Caller`], and its
/// [`contract::Number`] is generated, not accepted from the outside.
#[derive(Clone, Debug)]
pub struct CreateContract {
    /// [`Caller`] performing this [`Command`].
    pub caller: Caller,

    /// ID of the insured [`Client`].
    pub client_id: client::Id,

    /// [`insurance_type::Code`] of a new [`Contract`].
    pub insurance_type: insurance_type::Code,

    /// [`contract_status::Code`] of a new [`Contract`].
    pub status: contract_status::Code,

    /// First day of the coverage period.
    pub start_date: Date,

    /// Last day of the coverage period.
    pub end_date: Date,

    /// Premium paid under a new [`Contract`].
    pub premium: Money,

    /// Sum insured under a new [`Contract`].
    pub insured: Money,
}

impl<Db> Command<CreateContract> for Service<Db>
where
    Db: Database<
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
    Transacted<Db>: Database<Insert<Contract>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateContract {
            caller,
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

        let client = self
            .database()
            .execute(Select(By::new((caller.scope(), client_id))))
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

        let id = contract::Id::new();
        let created_at = contract::CreationDateTime::now();
        let contract = Contract {
            id,
            number: contract::Number::generate(
                &self.config().contract_number_prefix,
                id,
                created_at,
            ),
            client_id,
            insurance_type,
            agent_id: caller.id,
            status,
            start_date,
            end_date,
            premium,
            insured,
            created_at,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::debug!("`Contract` {} created", contract.number);

        Ok(contract)
    }
}

/// Error of [`CreateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// No visible [`Client`] exists with the provided ID.
    ///
    /// Covers both a missing [`Client`] and one outside the [`Caller`]'s
    /// [`Scope`].
    #[display("`Client` `{_0}` doesn't exist")]
    ClientNotExists(#[error(not(source))] client::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`InsuranceType`] is not available for new [`Contract`]s.
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
        domain::{client, user, Client},
        Command as _,
    };

    use super::{CreateContract, ExecutionError};

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

    fn cmd(caller: Caller, client_id: client::Id) -> CreateContract {
        CreateContract {
            caller,
            client_id,
            insurance_type: "KASKO".parse().unwrap(),
            status: "ACTIVE".parse().unwrap(),
            start_date: Date::from_ordinal_date(2024, 1).unwrap(),
            end_date: Date::from_ordinal_date(2024, 200).unwrap(),
            premium: "100.50RUB".parse().unwrap(),
            insured: "10000RUB".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn creates_contract_with_generated_number() {
        let agent = agent();
        let db = MockDb::with_dictionaries();
        let c = client_of(agent.id);
        db.seed_client(c.clone());

        let service = service(db);
        let contract = service.execute(cmd(agent, c.id)).await.unwrap();

        assert_eq!(contract.agent_id, agent.id);
        assert_eq!(contract.client_id, c.id);
        assert!(AsRef::<str>::as_ref(&contract.number).starts_with("INS-"));
        assert_eq!(service.database().contracts().len(), 1);
    }

    #[tokio::test]
    async fn rejects_backward_period() {
        let agent = agent();
        let db = MockDb::with_dictionaries();
        let c = client_of(agent.id);
        db.seed_client(c.clone());

        let mut backward = cmd(agent, c.id);
        backward.end_date = backward.start_date;
        let err = service(db).execute(backward).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidPeriod { .. },
        ));
    }

    #[tokio::test]
    async fn rejects_negative_amounts() {
        let agent = agent();
        let db = MockDb::with_dictionaries();
        let c = client_of(agent.id);
        db.seed_client(c.clone());

        let mut negative = cmd(agent, c.id);
        negative.premium = "-1RUB".parse().unwrap();
        let err = service(db).execute(negative).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NegativeAmount));
    }

    #[tokio::test]
    async fn rejects_foreign_client() {
        let db = MockDb::with_dictionaries();
        let foreign = client_of(user::Id::from(Uuid::new_v4()));
        db.seed_client(foreign.clone());

        let err = service(db)
            .execute(cmd(agent(), foreign.id))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ClientNotExists(id) if *id == foreign.id,
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_and_inactive_insurance_types() {
        let agent = agent();
        let db = MockDb::with_dictionaries();
        let c = client_of(agent.id);
        db.seed_client(c.clone());
        let service = service(db);

        let mut unknown = cmd(agent, c.id);
        unknown.insurance_type = "TRAVEL".parse().unwrap();
        let err = service.execute(unknown).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::UnknownInsuranceType(_),
        ));

        // `OSAGO` is seeded inactive.
        let mut inactive = cmd(agent, c.id);
        inactive.insurance_type = "OSAGO".parse().unwrap();
        let err = service.execute(inactive).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::InsuranceTypeInactive(_),
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_status() {
        let agent = agent();
        let db = MockDb::with_dictionaries();
        let c = client_of(agent.id);
        db.seed_client(c.clone());

        let mut unknown = cmd(agent, c.id);
        unknown.status = "ARCHIVED".parse().unwrap();
        let err = service(db).execute(unknown).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UnknownStatus(_)));
    }
}

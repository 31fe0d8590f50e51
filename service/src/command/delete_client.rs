//! [`Command`] for deleting an existing [`Client`].

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    access::{Caller, Scope},
    domain::{client, Client},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for deleting an existing [`Client`].
///
/// A [`Client`] still referenced by any [`Contract`] cannot be deleted.
///
/// [`Contract`]: crate::domain::Contract
#[derive(Clone, Copy, Debug)]
pub struct DeleteClient {
    /// [`Caller`] performing this [`Command`].
    pub caller: Caller,

    /// ID of the [`Client`] to delete.
    pub id: client::Id,
}

impl<Db> Command<DeleteClient> for Service<Db>
where
    Db: Database<
            Select<By<Option<Client>, (Scope, client::Id)>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::client::HasContracts, client::Id>>,
            Ok = read::client::HasContracts,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Delete<client::Id>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Client;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteClient) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteClient { caller, id } = cmd;

        let client = self
            .database()
            .execute(Select(By::new((caller.scope(), id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClientNotFound(id))
            .map_err(tracerr::wrap!())?;

        let has_contracts = self
            .database()
            .execute(Select(By::<read::client::HasContracts, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if bool::from(has_contracts) {
            return Err(tracerr::new!(E::ClientHasContracts(id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Delete(id))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::debug!("`Client` {id} deleted");

        Ok(client)
    }
}

/// Error of [`DeleteClient`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Client`] is still referenced by some [`Contract`]s.
    ///
    /// [`Contract`]: crate::domain::Contract
    #[display("`Client` `{_0}` still has `Contract`s")]
    ClientHasContracts(#[error(not(source))] client::Id),

    /// No visible [`Client`] exists with the provided ID.
    ///
    /// Covers both a missing [`Client`] and one outside the [`Caller`]'s
    /// [`Scope`].
    #[display("`Client` `{_0}` doesn't exist")]
    ClientNotFound(#[error(not(source))] client::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
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

    use super::{DeleteClient, ExecutionError};

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
            status: "ACTIVE".parse().unwrap(),
            start_date: Date::from_ordinal_date(2024, 1).unwrap(),
            end_date: Date::from_ordinal_date(2024, 200).unwrap(),
            premium: "100.00RUB".parse().unwrap(),
            insured: "10000.00RUB".parse().unwrap(),
            created_at,
        }
    }

    #[tokio::test]
    async fn deletes_own_client() {
        let agent = agent();
        let db = MockDb::default();
        let c = client_of(agent.id);
        db.seed_client(c.clone());

        let service = service(db);
        let deleted = service
            .execute(DeleteClient {
                caller: agent,
                id: c.id,
            })
            .await
            .unwrap();

        assert_eq!(deleted.id, c.id);
        assert!(service.database().clients().is_empty());
    }

    #[tokio::test]
    async fn rejects_client_with_contracts() {
        let agent = agent();
        let db = MockDb::default();
        let c = client_of(agent.id);
        db.seed_client(c.clone());
        db.seed_contract(contract_of(c.id, agent.id));

        let service = service(db);
        let err = service
            .execute(DeleteClient {
                caller: agent,
                id: c.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ClientHasContracts(id) if *id == c.id,
        ));
        assert_eq!(service.database().clients().len(), 1);
    }

    #[tokio::test]
    async fn out_of_scope_client_is_reported_as_missing() {
        let db = MockDb::default();
        let foreign = client_of(user::Id::from(Uuid::new_v4()));
        db.seed_client(foreign.clone());

        let err = service(db)
            .execute(DeleteClient {
                caller: agent(),
                id: foreign.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ClientNotFound(id) if *id == foreign.id,
        ));
    }
}

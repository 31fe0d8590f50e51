//! [`Command`] for registering a new [`Client`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    access::Caller,
    domain::{client, Client},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`Client`].
///
/// The new [`Client`] is owned by the [`Caller`], whoever their role is.
#[derive(Clone, Debug)]
pub struct CreateClient {
    /// [`Caller`] performing this [`Command`].
    pub caller: Caller,

    /// Full name of a new [`Client`].
    pub name: client::Name,

    /// [`client::Passport`] of a new [`Client`].
    pub passport: Option<client::Passport>,

    /// [`client::Phone`] of a new [`Client`].
    pub phone: client::Phone,

    /// [`client::Email`] of a new [`Client`].
    pub email: Option<client::Email>,
}

impl<Db> Command<CreateClient> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<Client>, &'l client::Passport>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<Client>, &'l client::Phone>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Client>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Client;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateClient) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateClient {
            caller,
            name,
            passport,
            phone,
            email,
        } = cmd;

        if let Some(passport) = &passport {
            let existing = self
                .database()
                .execute(Select(By::new(passport)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if existing.is_some() {
                return Err(tracerr::new!(E::PassportOccupied(
                    passport.clone(),
                )));
            }
        }

        let existing = self
            .database()
            .execute(Select(By::new(&phone)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::PhoneOccupied(phone)));
        }

        let client = Client {
            id: client::Id::new(),
            name,
            passport,
            phone,
            email,
            registered_at: client::RegistrationDateTime::now(),
            agent_id: caller.id,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(client.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::debug!("`Client` {} registered", client.id);

        Ok(client)
    }
}

/// Error of [`CreateClient`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`client::Passport`] is already occupied by another [`Client`].
    #[display("`{} {}` passport is occupied", _0.series, _0.number)]
    PassportOccupied(#[error(not(source))] client::Passport),

    /// [`client::Phone`] is already occupied by another [`Client`].
    #[display("`{_0}` phone is occupied")]
    PhoneOccupied(#[error(not(source))] client::Phone),
}

#[cfg(test)]
mod spec {
    use uuid::Uuid;

    use crate::{
        access::Caller,
        command::mock::{service, MockDb},
        domain::{client, user, Client},
        Command as _,
    };

    use super::{CreateClient, ExecutionError};

    fn caller(role: user::Role) -> Caller {
        Caller {
            id: user::Id::from(Uuid::new_v4()),
            role,
        }
    }

    fn cmd(caller: Caller) -> CreateClient {
        CreateClient {
            caller,
            name: "Ivanov Ivan".parse().unwrap(),
            passport: Some(client::Passport {
                series: "4010".parse().unwrap(),
                number: "123456".parse().unwrap(),
            }),
            phone: "+7 (921) 123-45-67".parse().unwrap(),
            email: Some("ivanov@example.com".parse().unwrap()),
        }
    }

    #[tokio::test]
    async fn registers_client_owned_by_caller() {
        let agent = caller(user::Role::Agent);
        let service = service(MockDb::default());

        let client = service.execute(cmd(agent)).await.unwrap();

        assert_eq!(client.agent_id, agent.id);
        let stored = service.database().clients();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, client.id);
        assert_eq!(stored[0].agent_id, agent.id);
    }

    #[tokio::test]
    async fn rejects_duplicate_passport() {
        let service = service(MockDb::default());
        let first = service
            .execute(cmd(caller(user::Role::Agent)))
            .await
            .unwrap();

        let mut second = cmd(caller(user::Role::Manager));
        second.phone = "+7 (921) 765-43-21".parse().unwrap();
        let err = service.execute(second).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PassportOccupied(p)
                if Some(p) == first.passport.as_ref()
        ));
        assert_eq!(service.database().clients().len(), 1);
    }

    #[tokio::test]
    async fn rejects_duplicate_phone() {
        let service = service(MockDb::default());
        let first: Client = service
            .execute(cmd(caller(user::Role::Agent)))
            .await
            .unwrap();

        let mut second = cmd(caller(user::Role::Agent));
        second.passport = None;
        let err = service.execute(second).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PhoneOccupied(p) if *p == first.phone,
        ));
    }
}

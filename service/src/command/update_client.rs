//! [`Command`] for updating an existing [`Client`].

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    access::{Caller, Scope},
    domain::{client, Client},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Client`].
///
/// The owning agent and the registration time are immutable and preserved
/// as-is.
#[derive(Clone, Debug)]
pub struct UpdateClient {
    /// [`Caller`] performing this [`Command`].
    pub caller: Caller,

    /// ID of the [`Client`] to update.
    pub id: client::Id,

    /// New full name of the [`Client`].
    pub name: client::Name,

    /// New [`client::Passport`] of the [`Client`].
    pub passport: Option<client::Passport>,

    /// New [`client::Phone`] of the [`Client`].
    pub phone: client::Phone,

    /// New [`client::Email`] of the [`Client`].
    pub email: Option<client::Email>,
}

impl<Db> Command<UpdateClient> for Service<Db>
where
    Db: Database<
            Select<By<Option<Client>, (Scope, client::Id)>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<Client>, &'l client::Passport>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<Client>, &'l client::Phone>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Update<Client>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Client;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateClient) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateClient {
            caller,
            id,
            name,
            passport,
            phone,
            email,
        } = cmd;

        let existing = self
            .database()
            .execute(Select(By::new((caller.scope(), id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClientNotFound(id))
            .map_err(tracerr::wrap!())?;

        if let Some(passport) = &passport {
            let occupant = self
                .database()
                .execute(Select(By::new(passport)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if occupant.is_some_and(|c| c.id != id) {
                return Err(tracerr::new!(E::PassportOccupied(
                    passport.clone(),
                )));
            }
        }

        let occupant = self
            .database()
            .execute(Select(By::new(&phone)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupant.is_some_and(|c| c.id != id) {
            return Err(tracerr::new!(E::PhoneOccupied(phone)));
        }

        let client = Client {
            id,
            name,
            passport,
            phone,
            email,
            registered_at: existing.registered_at,
            agent_id: existing.agent_id,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Update(client.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::debug!("`Client` {id} updated");

        Ok(client)
    }
}

/// Error of [`UpdateClient`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
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

    use super::{ExecutionError, UpdateClient};

    fn caller(role: user::Role) -> Caller {
        Caller {
            id: user::Id::from(Uuid::new_v4()),
            role,
        }
    }

    fn existing(agent_id: user::Id, phone: &str) -> Client {
        Client {
            id: client::Id::new(),
            name: "Ivanov Ivan".parse().unwrap(),
            passport: None,
            phone: phone.parse().unwrap(),
            email: None,
            registered_at: client::RegistrationDateTime::now(),
            agent_id,
        }
    }

    fn cmd(caller: Caller, id: client::Id) -> UpdateClient {
        UpdateClient {
            caller,
            id,
            name: "Ivanov Petr".parse().unwrap(),
            passport: None,
            phone: "+7 (921) 111-22-33".parse().unwrap(),
            email: None,
        }
    }

    #[tokio::test]
    async fn preserves_owner_and_registration_time() {
        let agent = caller(user::Role::Agent);
        let db = MockDb::default();
        let before = existing(agent.id, "+7 (921) 123-45-67");
        db.seed_client(before.clone());

        let after = service(db)
            .execute(cmd(agent, before.id))
            .await
            .unwrap();

        assert_eq!(after.agent_id, before.agent_id);
        assert_eq!(after.registered_at, before.registered_at);
        assert_eq!(after.name, "Ivanov Petr".parse().unwrap());
    }

    #[tokio::test]
    async fn out_of_scope_client_is_reported_as_missing() {
        let agent = caller(user::Role::Agent);
        let db = MockDb::default();
        let foreign = existing(user::Id::from(Uuid::new_v4()), "88121234567");
        db.seed_client(foreign.clone());

        let err = service(db)
            .execute(cmd(agent, foreign.id))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ClientNotFound(id) if *id == foreign.id,
        ));
    }

    #[tokio::test]
    async fn uniqueness_check_excludes_self() {
        let manager = caller(user::Role::Manager);
        let db = MockDb::default();
        let own = existing(manager.id, "+7 (921) 111-22-33");
        db.seed_client(own.clone());

        // Keeping the same phone must not collide with itself.
        let updated = service(db)
            .execute(cmd(manager, own.id))
            .await
            .unwrap();

        assert_eq!(updated.phone, own.phone);
    }

    #[tokio::test]
    async fn rejects_phone_of_another_client() {
        let manager = caller(user::Role::Manager);
        let db = MockDb::default();
        let target = existing(manager.id, "+7 (921) 123-45-67");
        let other = existing(manager.id, "+7 (921) 111-22-33");
        db.seed_client(target.clone());
        db.seed_client(other.clone());

        let err = service(db)
            .execute(cmd(manager, target.id))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PhoneOccupied(p) if *p == other.phone,
        ));
    }
}

//! In-memory [`Database`] for [`Command`] tests.
//!
//! [`Database`]: crate::infra::Database

use std::sync::{Arc, Mutex};

use common::{
    operations::{By, Commit, Delete, Insert, Select, Transact, Update},
    Handler,
};
use tracerr::Traced;

use crate::{
    access::Scope,
    domain::{
        client, contract, contract_status, insurance_type, Client, Contract,
        ContractStatus, InsuranceType,
    },
    infra::database,
    read, Config, Service,
};

#[cfg(doc)]
use super::Command;

/// In-memory [`Database`] backed by plain [`Vec`]s.
///
/// [`Transact`] hands out a clone sharing the same state, and [`Commit`] is a
/// no-op, so command logic is exercised without a real transaction.
///
/// [`Database`]: crate::infra::Database
#[derive(Clone, Debug, Default)]
pub(crate) struct MockDb(Arc<State>);

#[derive(Debug, Default)]
struct State {
    clients: Mutex<Vec<Client>>,
    contracts: Mutex<Vec<Contract>>,
    insurance_types: Mutex<Vec<InsuranceType>>,
    statuses: Mutex<Vec<ContractStatus>>,
}

impl MockDb {
    /// Creates a new [`MockDb`] seeded with `KASKO`/`OSAGO` insurance types
    /// (the latter inactive) and `DRAFT`/`ACTIVE` statuses.
    pub(crate) fn with_dictionaries() -> Self {
        let this = Self::default();
        {
            let mut types = this.0.insurance_types.lock().unwrap();
            types.push(InsuranceType {
                code: "KASKO".parse().unwrap(),
                name: "KASKO".parse().unwrap(),
                category: None,
                active: true,
            });
            types.push(InsuranceType {
                code: "OSAGO".parse().unwrap(),
                name: "OSAGO".parse().unwrap(),
                category: None,
                active: false,
            });
        }
        {
            let mut statuses = this.0.statuses.lock().unwrap();
            statuses.push(ContractStatus {
                code: "DRAFT".parse().unwrap(),
                name: "Draft".parse().unwrap(),
            });
            statuses.push(ContractStatus {
                code: "ACTIVE".parse().unwrap(),
                name: "Active".parse().unwrap(),
            });
        }
        this
    }

    pub(crate) fn seed_client(&self, client: Client) {
        self.0.clients.lock().unwrap().push(client);
    }

    pub(crate) fn seed_contract(&self, contract: Contract) {
        self.0.contracts.lock().unwrap().push(contract);
    }

    pub(crate) fn clients(&self) -> Vec<Client> {
        self.0.clients.lock().unwrap().clone()
    }

    pub(crate) fn contracts(&self) -> Vec<Contract> {
        self.0.contracts.lock().unwrap().clone()
    }
}

/// Shortcut for building a [`Service`] over a [`MockDb`].
pub(crate) fn service(db: MockDb) -> Service<MockDb> {
    Service::new(Config::default(), db)
}

type Err = Traced<database::Error>;

impl Handler<Transact> for MockDb {
    type Ok = Self;
    type Err = Err;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Handler<Commit> for MockDb {
    type Ok = ();
    type Err = Err;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<'l> Handler<Select<By<Option<Client>, &'l client::Passport>>> for MockDb {
    type Ok = Option<Client>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Client>, &'l client::Passport>>,
    ) -> Result<Self::Ok, Self::Err> {
        let passport = by.into_inner();
        Ok(self
            .0
            .clients
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.passport.as_ref() == Some(passport))
            .cloned())
    }
}

impl<'l> Handler<Select<By<Option<Client>, &'l client::Phone>>> for MockDb {
    type Ok = Option<Client>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Client>, &'l client::Phone>>,
    ) -> Result<Self::Ok, Self::Err> {
        let phone = by.into_inner();
        Ok(self
            .0
            .clients
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.phone == phone)
            .cloned())
    }
}

impl Handler<Select<By<Option<Client>, (Scope, client::Id)>>> for MockDb {
    type Ok = Option<Client>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Client>, (Scope, client::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (scope, id) = by.into_inner();
        Ok(self
            .0
            .clients
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id && scope.permits(c.agent_id))
            .cloned())
    }
}

impl Handler<Select<By<read::client::HasContracts, client::Id>>> for MockDb {
    type Ok = read::client::HasContracts;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<read::client::HasContracts, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .0
            .contracts
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.client_id == id)
            .into())
    }
}

impl<'l> Handler<Select<By<Option<InsuranceType>, &'l insurance_type::Code>>>
    for MockDb
{
    type Ok = Option<InsuranceType>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Option<InsuranceType>, &'l insurance_type::Code>>,
    ) -> Result<Self::Ok, Self::Err> {
        let code = by.into_inner();
        Ok(self
            .0
            .insurance_types
            .lock()
            .unwrap()
            .iter()
            .find(|t| &t.code == code)
            .cloned())
    }
}

impl<'l> Handler<Select<By<Option<ContractStatus>, &'l contract_status::Code>>>
    for MockDb
{
    type Ok = Option<ContractStatus>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<ContractStatus>, &'l contract_status::Code>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let code = by.into_inner();
        Ok(self
            .0
            .statuses
            .lock()
            .unwrap()
            .iter()
            .find(|s| &s.code == code)
            .cloned())
    }
}

impl Handler<Select<By<Option<Contract>, (Scope, contract::Id)>>> for MockDb {
    type Ok = Option<Contract>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contract>, (Scope, contract::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (scope, id) = by.into_inner();
        Ok(self
            .0
            .contracts
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id && scope.permits(c.agent_id))
            .cloned())
    }
}

impl Handler<Insert<Client>> for MockDb {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Insert(client): Insert<Client>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.clients.lock().unwrap().push(client);
        Ok(())
    }
}

impl Handler<Update<Client>> for MockDb {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Update(client): Update<Client>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut clients = self.0.clients.lock().unwrap();
        if let Some(c) = clients.iter_mut().find(|c| c.id == client.id) {
            *c = client;
        }
        Ok(())
    }
}

impl Handler<Delete<client::Id>> for MockDb {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Delete(id): Delete<client::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.clients.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }
}

impl Handler<Insert<Contract>> for MockDb {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Insert(contract): Insert<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.contracts.lock().unwrap().push(contract);
        Ok(())
    }
}

impl Handler<Update<Contract>> for MockDb {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Update(contract): Update<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut contracts = self.0.contracts.lock().unwrap();
        if let Some(c) = contracts.iter_mut().find(|c| c.id == contract.id) {
            *c = contract;
        }
        Ok(())
    }
}

impl Handler<Delete<contract::Id>> for MockDb {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Delete(id): Delete<contract::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.contracts.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }
}

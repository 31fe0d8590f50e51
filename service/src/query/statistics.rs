//! [`Statistics`] definition.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    access::Scope,
    infra::{database, Database},
    read::statistics::{
        MonthCount, TotalClients, TotalContracts, TypeAverage, TypeCount,
        Window,
    },
    Query, Service,
};
#[cfg(doc)]
use crate::domain::{Client, Contract};

/// [`Query`] to aggregate portfolio statistics.
///
/// All the aggregates are computed over the identical [`Scope`] and
/// [`Window`], so they describe the same slice of data. The selects are
/// issued sequentially without snapshot isolation, so concurrent writes may
/// skew the aggregates against each other slightly.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Statistics {
    /// [`Scope`] the aggregation is limited to.
    pub scope: Scope,

    /// Date [`Window`] the aggregation is limited to.
    pub window: Window,
}

/// Output of the [`Statistics`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// Total count of visible [`Client`]s.
    pub total_clients: TotalClients,

    /// Total count of visible [`Contract`]s.
    pub total_contracts: TotalContracts,

    /// Counts of visible [`Contract`]s per insurance type.
    ///
    /// Types without any matching [`Contract`]s are absent.
    pub contracts_by_type: Vec<TypeCount>,

    /// Mean premiums of visible [`Contract`]s per insurance type.
    ///
    /// Types without any matching [`Contract`]s are absent.
    pub average_premium_by_type: Vec<TypeAverage>,

    /// Counts of visible [`Contract`]s per creation month, in chronological
    /// order.
    ///
    /// Months without any matching [`Contract`]s are absent.
    pub dynamic_by_month: Vec<MonthCount>,
}

impl<Db> Query<Statistics> for Service<Db>
where
    Db: Database<
            Select<By<TotalClients, (Scope, Window)>>,
            Ok = TotalClients,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<TotalContracts, (Scope, Window)>>,
            Ok = TotalContracts,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<TypeCount>, (Scope, Window)>>,
            Ok = Vec<TypeCount>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<TypeAverage>, (Scope, Window)>>,
            Ok = Vec<TypeAverage>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<MonthCount>, (Scope, Window)>>,
            Ok = Vec<MonthCount>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Statistics { scope, window }: Statistics,
    ) -> Result<Self::Ok, Self::Err> {
        let total_clients = self
            .database()
            .execute(Select(By::<TotalClients, _>::new((scope, window))))
            .await
            .map_err(tracerr::wrap!())?;
        let total_contracts = self
            .database()
            .execute(Select(By::<TotalContracts, _>::new((scope, window))))
            .await
            .map_err(tracerr::wrap!())?;
        let contracts_by_type = self
            .database()
            .execute(Select(By::<Vec<TypeCount>, _>::new((scope, window))))
            .await
            .map_err(tracerr::wrap!())?;
        let average_premium_by_type = self
            .database()
            .execute(Select(By::<Vec<TypeAverage>, _>::new((scope, window))))
            .await
            .map_err(tracerr::wrap!())?;
        let dynamic_by_month = self
            .database()
            .execute(Select(By::<Vec<MonthCount>, _>::new((scope, window))))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Output {
            total_clients,
            total_contracts,
            contracts_by_type,
            average_premium_by_type,
            dynamic_by_month,
        })
    }
}

#[cfg(test)]
mod spec {
    use std::sync::Mutex;

    use common::{
        datetime::{Date, Month as CalendarMonth},
        operations::{By, Select},
        Handler,
    };
    use rust_decimal::Decimal;
    use tracerr::Traced;
    use uuid::Uuid;

    use crate::{
        access::Scope,
        domain::user,
        infra::database,
        read::statistics::{
            MonthCount, TotalClients, TotalContracts, TypeAverage, TypeCount,
            Window,
        },
        Config, Query as _, Service,
    };

    use super::Statistics;

    /// In-memory [`Database`] canning every aggregate and recording the
    /// selectors it was asked with.
    ///
    /// [`Database`]: crate::infra::Database
    #[derive(Default)]
    struct MockDb {
        selected: Mutex<Vec<(Scope, Window)>>,
        by_type: Vec<TypeCount>,
        by_premium: Vec<TypeAverage>,
        by_month: Vec<MonthCount>,
    }

    impl MockDb {
        fn record(&self, by: (Scope, Window)) {
            self.selected.lock().unwrap().push(by);
        }
    }

    impl Handler<Select<By<TotalClients, (Scope, Window)>>> for MockDb {
        type Ok = TotalClients;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<TotalClients, (Scope, Window)>>,
        ) -> Result<Self::Ok, Self::Err> {
            self.record(by.into_inner());
            Ok(2.into())
        }
    }

    impl Handler<Select<By<TotalContracts, (Scope, Window)>>> for MockDb {
        type Ok = TotalContracts;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<TotalContracts, (Scope, Window)>>,
        ) -> Result<Self::Ok, Self::Err> {
            self.record(by.into_inner());
            Ok(3.into())
        }
    }

    impl Handler<Select<By<Vec<TypeCount>, (Scope, Window)>>> for MockDb {
        type Ok = Vec<TypeCount>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Vec<TypeCount>, (Scope, Window)>>,
        ) -> Result<Self::Ok, Self::Err> {
            self.record(by.into_inner());
            Ok(self.by_type.clone())
        }
    }

    impl Handler<Select<By<Vec<TypeAverage>, (Scope, Window)>>> for MockDb {
        type Ok = Vec<TypeAverage>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Vec<TypeAverage>, (Scope, Window)>>,
        ) -> Result<Self::Ok, Self::Err> {
            self.record(by.into_inner());
            Ok(self.by_premium.clone())
        }
    }

    impl Handler<Select<By<Vec<MonthCount>, (Scope, Window)>>> for MockDb {
        type Ok = Vec<MonthCount>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Vec<MonthCount>, (Scope, Window)>>,
        ) -> Result<Self::Ok, Self::Err> {
            self.record(by.into_inner());
            Ok(self.by_month.clone())
        }
    }

    fn service(db: MockDb) -> Service<MockDb> {
        Service::new(Config::default(), db)
    }

    #[tokio::test]
    async fn issues_all_aggregates_with_identical_selector() {
        let scope = Scope::OwnedBy(user::Id::from(Uuid::new_v4()));
        let window = Window {
            since: Date::from_calendar_date(2024, CalendarMonth::January, 1)
                .ok(),
            until: None,
        };

        let service = service(MockDb::default());
        let out = service
            .execute(Statistics { scope, window })
            .await
            .unwrap();

        assert_eq!(i64::from(out.total_clients), 2);
        assert_eq!(i64::from(out.total_contracts), 3);

        let selected = service.database().selected.lock().unwrap();
        assert_eq!(selected.len(), 5);
        assert!(selected.iter().all(|s| *s == (scope, window)));
    }

    #[tokio::test]
    async fn assembles_aggregates_verbatim() {
        let by_type = vec![TypeCount {
            name: "KASKO".parse().unwrap(),
            count: 3,
        }];
        let by_premium = vec![TypeAverage {
            name: "KASKO".parse().unwrap(),
            average: Decimal::new(10_050, 2),
        }];
        let by_month = vec![
            MonthCount {
                month: "2024-01".parse().unwrap(),
                count: 1,
            },
            MonthCount {
                month: "2024-02".parse().unwrap(),
                count: 2,
            },
        ];

        let out = service(MockDb {
            by_type: by_type.clone(),
            by_premium: by_premium.clone(),
            by_month: by_month.clone(),
            ..MockDb::default()
        })
        .execute(Statistics {
            scope: Scope::Unrestricted,
            window: Window::default(),
        })
        .await
        .unwrap();

        assert_eq!(out.contracts_by_type, by_type);
        assert_eq!(out.average_premium_by_type, by_premium);
        assert_eq!(out.dynamic_by_month, by_month);
        assert!(out
            .dynamic_by_month
            .windows(2)
            .all(|w| w[0].month < w[1].month));
    }
}


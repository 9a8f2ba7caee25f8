// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Utilities to help testing the business logic of the fleet service.

use crate::db;
use crate::driver::{FleetDriver, FleetOptions};
use crate::model::{AccessToken, Freight, FreightStatus, Password, Price, Role, User};
use fleet_core::clocks::Clock;
use fleet_core::clocks::testutils::{SettableClock, utc_datetime};
use fleet_core::db::Db;
#[cfg(test)]
use fleet_core::db::Executor;
use fleet_core::model::EmailAddress;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// State of a running test.
pub struct TestContext {
    /// The fake clock the driver operates on.
    pub clock: Arc<SettableClock>,

    /// The driver to handle fleet operations.
    driver: FleetDriver,
}

impl TestContext {
    /// Initializes the driver using an in-memory database and a settable clock.
    pub async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::from(fleet_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();

        let clock = Arc::from(SettableClock::new(utc_datetime(2023, 6, 12, 7, 15, 0)));
        let driver = FleetDriver::new(db, clock.clone(), "fleet", FleetOptions::default());

        TestContext { clock, driver }
    }

    /// Gets access to the database used by this test context.
    pub(crate) fn db(&self) -> &dyn Db {
        self.driver.db.as_ref()
    }

    /// Gets a direct executor against the database.
    #[cfg(test)]
    pub(crate) async fn ex(&self) -> Executor {
        self.driver.db.ex().await.unwrap()
    }

    /// Gets a copy of the driver in this test context.
    pub fn driver(&self) -> FleetDriver {
        self.driver.clone()
    }

    /// Returns the current fake time shifted by `delta_secs` seconds.
    pub(crate) fn now_delta(&self, delta_secs: i64) -> OffsetDateTime {
        self.clock.now_utc() + time::Duration::seconds(delta_secs)
    }

    /// Syntactic sugar to insert a user with the driver role directly into the database.
    pub async fn create_test_user(&self, email: &'static str, password: &'static str) -> User {
        self.create_test_user_with_role(email, password, Role::Driver).await
    }

    /// Syntactic sugar to insert an administrator directly into the database.
    pub async fn create_test_admin(&self, email: &'static str, password: &'static str) -> User {
        self.create_test_user_with_role(email, password, Role::Admin).await
    }

    /// Inserts a user with the given credentials and `role` directly into the database.
    pub async fn create_test_user_with_role(
        &self,
        email: &'static str,
        password: &'static str,
        role: Role,
    ) -> User {
        let hash = Password::from(password).validate_and_hash().unwrap();
        let user = User::new(EmailAddress::from(email), hash, role, self.clock.now_utc());
        db::create_user(&mut self.driver.db.ex().await.unwrap(), &user).await.unwrap();
        user
    }

    /// Inserts a freight between `driver_id` and `truck_id` directly into the database.
    pub async fn create_test_freight(&self, driver_id: Uuid, truck_id: Uuid) -> Freight {
        let now = self.clock.now_utc();
        let freight = Freight::from_parts(
            Uuid::new_v4(),
            driver_id,
            truck_id,
            "Porto".to_owned(),
            "Lisboa".to_owned(),
            FreightStatus::Created,
            Price::new(150000).unwrap(),
            now,
            now,
        );
        db::create_freight(&mut self.driver.db.ex().await.unwrap(), &freight).await.unwrap();
        freight
    }

    /// Syntactic sugar to log a previously-created user in.
    pub async fn do_test_login(
        &self,
        email: &'static str,
        password: &'static str,
    ) -> AccessToken {
        let session = self
            .driver
            .clone()
            .login(EmailAddress::from(email), Password::from(password))
            .await
            .unwrap();
        session.take_access_token()
    }
}

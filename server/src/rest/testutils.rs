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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::testutils::TestContext as DriverTestContext;
use crate::model::{AccessToken, Driver, DriverStatus, License, Plate, Truck, User};
use crate::rest::app;
use axum::Router;
use fleet_core::clocks::Clock;
use fleet_core::db::Executor;
use uuid::Uuid;

/// State of a running test, wrapping the driver-level context with a router.
pub(crate) struct TestContext {
    /// The driver-level context this REST context is built on.
    inner: DriverTestContext,

    /// The router under test.
    app: Router,
}

impl TestContext {
    /// Initializes the app using an in-memory database and a settable clock.
    pub(crate) async fn setup() -> Self {
        let inner = DriverTestContext::setup().await;
        let app = app(inner.driver());
        Self { inner, app }
    }

    /// Gets a copy of the router under test.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and returns the router under test.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Gets a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.inner.ex().await
    }

    /// Moves the fake clock `hours` hours into the future.
    pub(crate) fn advance_clock_hours(&self, hours: u64) {
        self.inner.clock.advance(std::time::Duration::from_secs(hours * 60 * 60));
    }

    /// Syntactic sugar to insert a user with the driver role directly into the database.
    pub(crate) async fn create_test_user(&self, email: &'static str, password: &'static str) -> User {
        self.inner.create_test_user(email, password).await
    }

    /// Syntactic sugar to insert an administrator directly into the database.
    pub(crate) async fn create_test_admin(
        &self,
        email: &'static str,
        password: &'static str,
    ) -> User {
        self.inner.create_test_admin(email, password).await
    }

    /// Inserts a driver profile for `user` directly into the database.
    pub(crate) async fn create_test_driver(
        &self,
        user: &User,
        name: &str,
        license: &str,
    ) -> Driver {
        let driver = Driver::new(
            *user.id(),
            name.to_owned(),
            License::new(license).unwrap(),
            DriverStatus::Active,
            self.inner.clock.now_utc(),
        )
        .unwrap();
        db::create_driver(&mut self.ex().await, &driver).await.unwrap();
        driver
    }

    /// Inserts a truck directly into the database, optionally assigned to a driver.
    pub(crate) async fn create_test_truck(
        &self,
        plate: &str,
        model: &str,
        year: Option<i16>,
        driver_id: Option<Uuid>,
    ) -> Truck {
        let truck = Truck::new(
            Plate::new(plate).unwrap(),
            model.to_owned(),
            year,
            driver_id,
            self.inner.clock.now_utc(),
        )
        .unwrap();
        db::create_truck(&mut self.ex().await, &truck).await.unwrap();
        truck
    }

    /// Inserts a freight between `driver_id` and `truck_id` directly into the database.
    pub(crate) async fn create_test_freight(&self, driver_id: Uuid, truck_id: Uuid) {
        let _freight = self.inner.create_test_freight(driver_id, truck_id).await;
    }

    /// Syntactic sugar to log a previously-created user in.
    pub(crate) async fn do_test_login(
        &self,
        email: &'static str,
        password: &'static str,
    ) -> AccessToken {
        self.inner.do_test_login(email, password).await
    }
}

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

//! REST service for the fleet back office.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use fleet_core::clocks::SystemClock;
use fleet_core::db::{Db, DbError};
use log::info;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use time::OffsetDateTime;

pub mod db;
pub mod driver;
use driver::{FleetDriver, FleetOptions};
pub(crate) mod model;
use model::{Password, Role, User};
mod rest;
use fleet_core::model::EmailAddress;
use rest::app;

/// Authentication realm presented to clients in authorization challenges.
const REALM: &str = "fleet";

/// Makes sure an administrator account exists for `email`, creating it with `password` the
/// first time the service starts against an empty database.
pub async fn ensure_admin(
    db: &Arc<dyn Db + Send + Sync>,
    email: String,
    password: String,
) -> Result<(), Box<dyn Error>> {
    let email = EmailAddress::new(email)?;
    let password = Password::new(password)?;

    let mut ex = db.ex().await?;
    match db::get_user_by_email(&mut ex, &email).await {
        Ok(_) => Ok(()),
        Err(DbError::NotFound) => {
            let password = password.validate_and_hash()?;
            let user = User::new(email, password, Role::Admin, OffsetDateTime::now_utc());
            db::create_user(&mut ex, &user).await?;
            info!("Created administrator account {}", user.email().as_str());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Instantiates all resources to serve the application on `bind_addr`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Arc<dyn Db + Send + Sync>,
    opts: FleetOptions,
) -> Result<(), Box<dyn Error>> {
    let clock = Arc::from(SystemClock::default());
    let driver = FleetDriver::new(db, clock, REALM, opts);
    let app = app(driver);

    let bind_addr = bind_addr.into();
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

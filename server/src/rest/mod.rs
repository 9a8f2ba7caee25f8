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

//! REST interface for the fleet service.

use crate::driver::FleetDriver;
use crate::model::{Driver, Page, Role, Truck, User};
use axum::Router;
use fleet_core::rest::attach_request_context;
#[cfg(test)]
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

mod driver_delete;
mod driver_get;
mod driver_patch;
mod driver_post;
mod drivers_get;
mod httputils;
mod login_post;
mod me_get;
#[cfg(test)]
mod testutils;
mod truck_delete;
mod truck_get;
mod truck_patch;
mod truck_post;
mod trucks_get;
mod user_delete;
mod user_get;
mod user_patch;
mod user_post;
mod users_get;

pub(crate) use httputils::get_bearer_auth;

/// Creates the router for the application.
pub(crate) fn app(driver: FleetDriver) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/v1/auth/login", post(login_post::handler))
        .route("/api/v1/auth/me", get(me_get::handler))
        .route("/api/v1/users", get(users_get::handler).post(user_post::handler))
        .route(
            "/api/v1/users/:id",
            get(user_get::handler).patch(user_patch::handler).delete(user_delete::handler),
        )
        .route("/api/v1/drivers", get(drivers_get::handler).post(driver_post::handler))
        .route(
            "/api/v1/drivers/:id",
            get(driver_get::handler).patch(driver_patch::handler).delete(driver_delete::handler),
        )
        .route("/api/v1/trucks", get(trucks_get::handler).post(truck_post::handler))
        .route(
            "/api/v1/trucks/:id",
            get(truck_get::handler).patch(truck_patch::handler).delete(truck_delete::handler),
        )
        .layer(axum::middleware::from_fn(attach_request_context))
        .layer(CorsLayer::permissive())
        .with_state(driver)
}

/// Formats a persisted timestamp for inclusion in a response body.
fn format_timestamp(ts: &OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_default()
}

/// Envelope for all successful responses that carry a payload.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct ApiResponse<T> {
    /// Always true; failed requests are reported through `ErrorResponse` instead.
    pub(crate) success: bool,

    /// The payload of the response.
    pub(crate) data: T,

    /// Time at which the response was generated, in RFC 3339 format.
    pub(crate) timestamp: String,
}

impl<T> ApiResponse<T> {
    /// Wraps `data` in the envelope, stamping the current time.
    pub(crate) fn new(data: T) -> Self {
        Self { success: true, data, timestamp: format_timestamp(&OffsetDateTime::now_utc()) }
    }
}

/// Wire representation of a user.  Never carries the password hash.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserBody {
    /// Identifier of the user.
    pub(crate) id: Uuid,

    /// Email of the user.
    pub(crate) email: String,

    /// Role of the user.
    pub(crate) role: Role,

    /// Creation time in RFC 3339 format.
    pub(crate) created_at: String,

    /// Last modification time in RFC 3339 format.
    pub(crate) updated_at: String,
}

impl From<User> for UserBody {
    fn from(user: User) -> Self {
        Self {
            id: *user.id(),
            email: user.email().as_str().to_owned(),
            role: *user.role(),
            created_at: format_timestamp(user.created_at()),
            updated_at: format_timestamp(user.updated_at()),
        }
    }
}

/// Wire representation of a driver profile.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriverBody {
    /// Identifier of the driver.
    pub(crate) id: Uuid,

    /// Identifier of the user account the driver belongs to.
    pub(crate) user_id: Uuid,

    /// Full name of the driver.
    pub(crate) name: String,

    /// License number of the driver.
    pub(crate) license: String,

    /// Status of the driver.
    pub(crate) status: crate::model::DriverStatus,

    /// Creation time in RFC 3339 format.
    pub(crate) created_at: String,

    /// Last modification time in RFC 3339 format.
    pub(crate) updated_at: String,
}

impl From<Driver> for DriverBody {
    fn from(driver: Driver) -> Self {
        Self {
            id: *driver.id(),
            user_id: *driver.user_id(),
            name: driver.name().clone(),
            license: driver.license().as_str().to_owned(),
            status: *driver.status(),
            created_at: format_timestamp(driver.created_at()),
            updated_at: format_timestamp(driver.updated_at()),
        }
    }
}

/// Wire representation of a truck.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
#[serde(rename_all = "camelCase")]
pub(crate) struct TruckBody {
    /// Identifier of the truck.
    pub(crate) id: Uuid,

    /// Plate of the truck in canonical form.
    pub(crate) plate: String,

    /// Model name of the truck.
    pub(crate) model: String,

    /// Manufacturing year of the truck, if known.
    pub(crate) year: Option<i16>,

    /// Identifier of the driver assigned to the truck, if any.
    pub(crate) driver_id: Option<Uuid>,

    /// Creation time in RFC 3339 format.
    pub(crate) created_at: String,

    /// Last modification time in RFC 3339 format.
    pub(crate) updated_at: String,
}

impl From<Truck> for TruckBody {
    fn from(truck: Truck) -> Self {
        Self {
            id: *truck.id(),
            plate: truck.plate().as_str().to_owned(),
            model: truck.model().clone(),
            year: *truck.year(),
            driver_id: *truck.driver_id(),
            created_at: format_timestamp(truck.created_at()),
            updated_at: format_timestamp(truck.updated_at()),
        }
    }
}

/// Wire representation of the pagination descriptor of a listing.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaginationBody {
    /// The page size the listing was computed with.
    pub(crate) limit: u32,

    /// The offset the listing was computed with.
    pub(crate) offset: u32,

    /// Total number of entries matching the listing's filters.
    pub(crate) total: u64,

    /// Whether more entries exist past this page.
    pub(crate) has_more: bool,
}

/// Wire representation of one page of a listing.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct PageBody<T> {
    /// The entries in this page, already ordered.
    pub(crate) data: Vec<T>,

    /// Where this page falls within the full listing.
    pub(crate) pagination: PaginationBody,
}

impl<T, M> From<Page<M>> for PageBody<T>
where
    T: From<M>,
{
    fn from(page: Page<M>) -> Self {
        Self {
            data: page.items.into_iter().map(T::from).collect(),
            pagination: PaginationBody {
                limit: page.pagination.limit,
                offset: page.pagination.offset,
                total: page.pagination.total,
                has_more: page.pagination.has_more,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testutils::*;
    use super::*;
    use fleet_core::rest::testutils::OneShotBuilder;
    use http::{Method, StatusCode};

    #[tokio::test]
    async fn test_e2e_login_and_manage_fleet() {
        let context = TestContext::setup().await;

        context.create_test_admin("root@example.com", "the-password").await;

        // Bad credentials are rejected with the generic message.
        OneShotBuilder::new(context.app(), (Method::POST, "/api/v1/auth/login"))
            .send_json(serde_json::json!({
                "email": "root@example.com", "password": "not-the-password",
            }))
            .await
            .expect_status(StatusCode::UNAUTHORIZED)
            .expect_error("Invalid credentials")
            .await;

        let token = context.do_test_login("root@example.com", "the-password").await;

        // Create a user, promote it to a driver profile, and register a truck for it.
        let user = OneShotBuilder::new(context.app(), (Method::POST, "/api/v1/users"))
            .with_bearer_auth(token.as_str())
            .send_json(serde_json::json!({
                "email": "ana@example.com", "password": "secret1",
            }))
            .await
            .expect_status(StatusCode::CREATED)
            .expect_json::<ApiResponse<UserBody>>()
            .await
            .data;
        assert_eq!(Role::Driver, user.role);

        let driver = OneShotBuilder::new(context.app(), (Method::POST, "/api/v1/drivers"))
            .with_bearer_auth(token.as_str())
            .send_json(serde_json::json!({
                "userId": user.id, "name": "Ana Souza", "license": "11122233344",
            }))
            .await
            .expect_status(StatusCode::CREATED)
            .expect_json::<ApiResponse<DriverBody>>()
            .await
            .data;

        let truck = OneShotBuilder::new(context.app(), (Method::POST, "/api/v1/trucks"))
            .with_bearer_auth(token.as_str())
            .send_json(serde_json::json!({
                "plate": "ABC1234", "model": "FH 540", "year": 2020, "driverId": driver.id,
            }))
            .await
            .expect_status(StatusCode::CREATED)
            .expect_json::<ApiResponse<TruckBody>>()
            .await
            .data;
        assert_eq!("ABC-1234", truck.plate);
        assert_eq!(Some(driver.id), truck.driver_id);

        // The driver is now occupied, so a second truck cannot take it.
        OneShotBuilder::new(context.app(), (Method::POST, "/api/v1/trucks"))
            .with_bearer_auth(token.as_str())
            .send_json(serde_json::json!({
                "plate": "DEF5678", "model": "Actros 2651", "driverId": driver.id,
            }))
            .await
            .expect_status(StatusCode::CONFLICT)
            .expect_error("assigned")
            .await;
    }

    #[tokio::test]
    async fn test_missing_token_yields_401_with_challenge() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.app(), (Method::GET, "/api/v1/users"))
            .send_empty()
            .await
            .expect_status(StatusCode::UNAUTHORIZED)
            .take_response()
            .await;
        assert_eq!(
            "Bearer realm=\"fleet\"",
            response.headers().get("WWW-Authenticate").unwrap().to_str().unwrap()
        );
    }

    #[tokio::test]
    async fn test_errors_carry_path_and_method() {
        let context = TestContext::setup().await;

        context.create_test_user("ana@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        let response = OneShotBuilder::new(
            context.app(),
            (Method::GET, format!("/api/v1/trucks/{}", Uuid::new_v4())),
        )
        .with_bearer_auth(token.as_str())
        .send_empty()
        .await
        .expect_status(StatusCode::NOT_FOUND)
        .expect_json::<fleet_core::rest::ErrorResponse>()
        .await;
        assert_eq!(404, response.status_code);
        assert_eq!(Some("GET"), response.method.as_deref());
        assert!(response.path.unwrap().starts_with("/api/v1/trucks/"));
    }
}

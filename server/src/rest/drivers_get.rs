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

//! API to list driver profiles.

use crate::db::DriverFilters;
use crate::driver::{DRIVER_ORDER_FIELDS, FleetDriver};
use crate::model::{DriverStatus, OrderBy, PageParams};
use crate::rest::{ApiResponse, DriverBody, PageBody, get_bearer_auth};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use fleet_core::rest::{EmptyBody, RestError};
use serde::Deserialize;
use uuid::Uuid;

/// Query parameters accepted by this API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriversQuery {
    /// Restricts the listing to drivers with this status.
    pub(crate) status: Option<String>,

    /// Restricts the listing to the driver bound to this user.
    pub(crate) user_id: Option<Uuid>,

    /// Restricts the listing to drivers whose name or license contains this term.
    pub(crate) search: Option<String>,

    /// `field:direction` ordering clause for the listing.
    pub(crate) order: Option<String>,

    /// Maximum number of entries to return.
    pub(crate) limit: Option<u32>,

    /// Number of entries to skip from the beginning of the listing.
    pub(crate) offset: Option<u32>,
}

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<FleetDriver>,
    Query(query): Query<DriversQuery>,
    headers: HeaderMap,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let token = get_bearer_auth(&headers, driver.realm())?;

    let filters = DriverFilters {
        status: query.status.as_deref().map(DriverStatus::parse).transpose()?,
        user_id: query.user_id,
        search: query.search,
    };
    let order = OrderBy::parse(query.order.as_deref(), DRIVER_ORDER_FIELDS);
    let params = PageParams::new(query.limit, query.offset)?;

    let page = driver.list_drivers(token, filters, order, params).await?;

    Ok(Json(ApiResponse::new(PageBody::<DriverBody>::from(page))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;
    use fleet_core::rest::testutils::OneShotBuilder;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/v1/drivers".to_owned())
    }

    #[tokio::test]
    async fn test_search_matches_name_and_license() {
        let context = TestContext::setup().await;

        let user1 = context.create_test_user("ana@example.com", "the-password").await;
        let user2 = context.create_test_user("bruno@example.com", "the-password").await;
        context.create_test_driver(&user1, "Ana Souza", "11122233344").await;
        context.create_test_driver(&user2, "Bruno Lima", "55566677788").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        let response = OneShotBuilder::new(context.app(), route())
            .with_query(&[("search", "souza")])
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<ApiResponse<PageBody<DriverBody>>>()
            .await;
        assert_eq!(1, response.data.data.len());
        assert_eq!("Ana Souza", response.data.data[0].name);

        let response = OneShotBuilder::new(context.app(), route())
            .with_query(&[("search", "77788")])
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<ApiResponse<PageBody<DriverBody>>>()
            .await;
        assert_eq!(1, response.data.data.len());
        assert_eq!("Bruno Lima", response.data.data[0].name);
    }

    #[tokio::test]
    async fn test_filter_by_user() {
        let context = TestContext::setup().await;

        let user1 = context.create_test_user("ana@example.com", "the-password").await;
        let user2 = context.create_test_user("bruno@example.com", "the-password").await;
        context.create_test_driver(&user1, "Ana Souza", "11122233344").await;
        let driver2 = context.create_test_driver(&user2, "Bruno Lima", "55566677788").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        let response = OneShotBuilder::new(context.app(), route())
            .with_query(&[("userId", user2.id().to_string())])
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<ApiResponse<PageBody<DriverBody>>>()
            .await;
        assert_eq!(1, response.data.data.len());
        assert_eq!(driver2.id(), &response.data.data[0].id);
    }

    #[tokio::test]
    async fn test_short_search_term() {
        let context = TestContext::setup().await;

        context.create_test_user("ana@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        OneShotBuilder::new(context.app(), route())
            .with_query(&[("search", "a")])
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Search term must be")
            .await;
    }
}

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

//! API to list user accounts.

use crate::db::UserFilters;
use crate::driver::{FleetDriver, USER_ORDER_FIELDS};
use crate::model::{OrderBy, PageParams, Role};
use crate::rest::{ApiResponse, PageBody, UserBody, get_bearer_auth};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use fleet_core::rest::{EmptyBody, RestError};
use serde::Deserialize;

/// Query parameters accepted by this API.
#[derive(Debug, Deserialize)]
pub(crate) struct UsersQuery {
    /// Restricts the listing to users with this role.
    pub(crate) role: Option<String>,

    /// Restricts the listing to users whose email contains this term.
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
    Query(query): Query<UsersQuery>,
    headers: HeaderMap,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let token = get_bearer_auth(&headers, driver.realm())?;

    let filters = UserFilters {
        role: query.role.as_deref().map(Role::parse).transpose()?,
        search: query.search,
    };
    let order = OrderBy::parse(query.order.as_deref(), USER_ORDER_FIELDS);
    let params = PageParams::new(query.limit, query.offset)?;

    let page = driver.list_users(token, filters, order, params).await?;

    Ok(Json(ApiResponse::new(PageBody::<UserBody>::from(page))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;
    use fleet_core::rest::testutils::OneShotBuilder;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/v1/users".to_owned())
    }

    #[tokio::test]
    async fn test_filter_and_paginate() {
        let context = TestContext::setup().await;

        context.create_test_user("ana@example.com", "the-password").await;
        context.create_test_user("bruno@example.com", "the-password").await;
        context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        let response = OneShotBuilder::new(context.app(), route())
            .with_query(&[("role", "driver"), ("order", "email:ASC"), ("limit", "1")])
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<ApiResponse<PageBody<UserBody>>>()
            .await;
        assert_eq!(1, response.data.data.len());
        assert_eq!("ana@example.com", response.data.data[0].email);
        assert_eq!(2, response.data.pagination.total);
        assert!(response.data.pagination.has_more);

        let response = OneShotBuilder::new(context.app(), route())
            .with_query(&[("role", "driver"), ("order", "email:ASC"), ("limit", "1"), ("offset", "1")])
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<ApiResponse<PageBody<UserBody>>>()
            .await;
        assert_eq!("bruno@example.com", response.data.data[0].email);
        assert!(!response.data.pagination.has_more);
    }

    #[tokio::test]
    async fn test_bogus_order_falls_back_to_newest_first() {
        let context = TestContext::setup().await;

        context.create_test_user("ana@example.com", "the-password").await;
        context.advance_clock_hours(1);
        context.create_test_user("bruno@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        let response = OneShotBuilder::new(context.app(), route())
            .with_query(&[("order", "name:SIDEWAYS")])
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<ApiResponse<PageBody<UserBody>>>()
            .await;
        assert_eq!(
            vec!["bruno@example.com", "ana@example.com"],
            response.data.data.iter().map(|u| u.email.as_str()).collect::<Vec<&str>>()
        );
    }

    #[tokio::test]
    async fn test_bad_role_and_bad_limit() {
        let context = TestContext::setup().await;

        context.create_test_user("ana@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        OneShotBuilder::new(context.app(), route())
            .with_query(&[("role", "superuser")])
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Unknown role")
            .await;

        OneShotBuilder::new(context.app(), route())
            .with_query(&[("limit", "101")])
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Limit must be between")
            .await;
    }
}

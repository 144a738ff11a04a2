//! Integration tests for 401 recovery through the token refresh interactor
//!
//! **Coverage:**
//! - Concurrent 401s share one refresh and replay with the new token
//! - An expired refresh token logs the session out (`InvalidGrant`)
//! - A failed refresh replays once and then reports `Unauthorized`
//!
//! **Infrastructure:**
//! - WireMock HTTP server for both the API and the OAuth token endpoint
//! - In-memory session store

#![allow(dead_code)]

mod support;

use std::sync::Arc;
use std::time::Duration;

use canvas_domain::constants::OAUTH_TOKEN_PATH;
use canvas_infra::api::requests::GetUserProfileRequest;
use canvas_infra::{ApiError, HttpClient, NonInteractiveLogin, OAuthTokenRefresher};
use futures::future::join_all;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn refresher() -> Arc<OAuthTokenRefresher> {
    Arc::new(OAuthTokenRefresher::new(HttpClient::new().expect("http client")))
}

async fn mount_profile(server: &MockServer, token: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v1/users/self/profile"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let server = MockServer::start().await;

    mount_profile(&server, "old", ResponseTemplate::new(401), 5).await;
    mount_profile(
        &server,
        "new",
        ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "name": "Test Student" })),
        5,
    )
    .await;
    Mock::given(method("POST"))
        .and(path(OAUTH_TOKEN_PATH))
        .and(body_string_contains(r#""grant_type":"refresh_token""#))
        .and(body_string_contains(r#""refresh_token":"refresh-token""#))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!({
                    "access_token": "new",
                    "token_type": "Bearer",
                    "expires_in": 3600
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = support::session(&server, "old");
    let (api, store) =
        support::refreshing_api(&server, session, refresher(), Arc::new(NonInteractiveLogin)).await;

    let request = GetUserProfileRequest::default();
    let results = join_all((0..5).map(|_| api.make(&request))).await;

    for result in results {
        assert_eq!(result.unwrap().name, "Test Student");
    }

    let current = api.session().unwrap();
    assert_eq!(current.access_token.as_deref(), Some("new"));
    assert_eq!(current.refresh_token.as_deref(), Some("refresh-token"));
    assert!(current.expires_at.is_some());

    let stored = store.all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].access_token.as_deref(), Some("new"));

    let interactor = api.interactor().unwrap();
    assert!(!interactor.is_refresh_in_progress());
    assert_eq!(interactor.waiting_count(), 0);
}

#[tokio::test]
async fn expired_refresh_token_logs_out() {
    let server = MockServer::start().await;

    mount_profile(&server, "old", ResponseTemplate::new(401), 1).await;
    Mock::given(method("POST"))
        .and(path(OAUTH_TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "refresh_token not found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = support::session(&server, "old");
    let (api, store) =
        support::refreshing_api(&server, session, refresher(), Arc::new(NonInteractiveLogin)).await;

    let err = api.make(&GetUserProfileRequest::default()).await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidGrant), "got {err:?}");
    assert!(api.session().is_none());
    assert!(store.all().is_empty());
}

#[tokio::test]
async fn failed_refresh_replays_once_then_reports_unauthorized() {
    let server = MockServer::start().await;

    mount_profile(&server, "old", ResponseTemplate::new(401), 2).await;
    Mock::given(method("POST"))
        .and(path(OAUTH_TOKEN_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let session = support::session(&server, "old");
    let (api, store) =
        support::refreshing_api(&server, session, refresher(), Arc::new(NonInteractiveLogin)).await;

    let err = api.make(&GetUserProfileRequest::default()).await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized), "got {err:?}");
    assert_eq!(api.session().unwrap().access_token.as_deref(), Some("old"));
    assert_eq!(store.all().len(), 1);
}

#[tokio::test]
async fn session_without_refresh_credentials_is_not_refreshed() {
    let server = MockServer::start().await;

    mount_profile(&server, "old", ResponseTemplate::new(401), 1).await;
    Mock::given(method("POST"))
        .and(path(OAUTH_TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = support::session(&server, "old");
    session.refresh_token = None;
    let (api, _store) =
        support::refreshing_api(&server, session, refresher(), Arc::new(NonInteractiveLogin)).await;

    let err = api.make(&GetUserProfileRequest::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized), "got {err:?}");
}

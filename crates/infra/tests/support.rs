#![allow(dead_code)]

use std::sync::Arc;

use canvas_core::{AccessTokenRefresher, LoginAgain};
use canvas_domain::{ApiConfig, LoginSession};
use canvas_infra::{Api, InMemorySessionStore, SharedSession, TokenRefreshInteractor};
use url::Url;
use wiremock::MockServer;

/// Config pointing at the mock server with a short rate-limit delay.
pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        user_agent: "CanvasTests/1.0".to_string(),
        rate_limit_delay_ms: 20,
        ..ApiConfig::default()
    }
}

/// Refreshable session for user `1` on the mock server.
pub fn session(server: &MockServer, token: &str) -> LoginSession {
    LoginSession::new(Url::parse(&server.uri()).expect("mock url"), token, "1")
        .with_user_name("Test Student")
        .with_refresh("refresh-token", "client-id", "client-secret")
}

/// Api without token refresh.
pub fn plain_api(server: &MockServer, session: Option<LoginSession>) -> Api {
    Api::new(&api_config(server), session).expect("api client")
}

/// Api wired to an interactor and an in-memory store that already holds
/// `session`.
pub async fn refreshing_api(
    server: &MockServer,
    session: LoginSession,
    refresher: Arc<dyn AccessTokenRefresher>,
    login: Arc<dyn LoginAgain>,
) -> (Api, Arc<InMemorySessionStore>) {
    use canvas_core::SessionStore;

    let store = Arc::new(InMemorySessionStore::new());
    store.save(&session).await.expect("seed store");

    let interactor = Arc::new(TokenRefreshInteractor::new(
        SharedSession::new(Some(session)),
        store.clone(),
        refresher,
        login,
    ));
    let api = Api::new(&api_config(server), None).expect("api client").with_interactor(interactor);
    (api, store)
}

//! OAuth refresh-token grant against `/login/oauth2/token`

use async_trait::async_trait;
use canvas_core::{
    codec, AccessTokenRefresher, ApiMethod, CodecError, RequestContext, Requestable, TokenError,
};
use canvas_domain::constants::{DEFAULT_USER_AGENT, OAUTH_TOKEN_PATH};
use canvas_domain::LoginSession;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::api::client::send;
use crate::api::errors::error_message;
use crate::http::HttpClient;

/// `POST /login/oauth2/token` body for the refresh grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshTokenBody {
    pub client_id: String,
    pub client_secret: String,
    pub grant_type: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiOAuthUser {
    #[serde(deserialize_with = "canvas_domain::utils::ids::deserialize")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub effective_locale: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Token endpoint response. `refresh_token` is only present when the server
/// rotates it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiOAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<ApiOAuthUser>,
    /// Seconds until `access_token` expires
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct PostLoginOAuthRequest {
    pub body: RefreshTokenBody,
}

impl PostLoginOAuthRequest {
    /// Build the refresh grant for `session`.
    ///
    /// # Errors
    /// [`TokenError::NotRefreshable`] when credentials are missing.
    pub fn refresh(session: &LoginSession) -> Result<Self, TokenError> {
        match (&session.refresh_token, &session.client_id, &session.client_secret) {
            (Some(refresh_token), Some(client_id), Some(client_secret)) => Ok(Self {
                body: RefreshTokenBody {
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                    grant_type: "refresh_token".to_string(),
                    refresh_token: refresh_token.clone(),
                },
            }),
            _ => Err(TokenError::NotRefreshable),
        }
    }
}

impl Requestable for PostLoginOAuthRequest {
    type Response = ApiOAuthToken;

    fn path(&self) -> String {
        OAUTH_TOKEN_PATH.to_string()
    }

    fn method(&self) -> ApiMethod {
        ApiMethod::Post
    }

    fn body(&self) -> Result<Option<Vec<u8>>, CodecError> {
        codec::encode_json(&self.body).map(Some)
    }

    fn should_handle_cookies(&self) -> bool {
        false
    }

    fn should_add_no_verifier_query(&self) -> bool {
        false
    }
}

/// Refreshes access tokens with the session's OAuth client credentials.
///
/// Talks to the token endpoint directly rather than through
/// [`crate::api::Api`], so a 401 here never re-enters token refresh.
pub struct OAuthTokenRefresher {
    http: HttpClient,
    user_agent: String,
}

impl OAuthTokenRefresher {
    pub fn new(http: HttpClient) -> Self {
        Self { http, user_agent: DEFAULT_USER_AGENT.to_string() }
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[async_trait]
impl AccessTokenRefresher for OAuthTokenRefresher {
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    async fn refresh_access_token(
        &self,
        session: &LoginSession,
    ) -> Result<LoginSession, TokenError> {
        let request = PostLoginOAuthRequest::refresh(session)?;
        let ctx = RequestContext::new(&session.base_url, &self.user_agent);
        let prepared = request.prepare(&ctx).map_err(|e| TokenError::Failed(e.to_string()))?;

        let response =
            send(&self.http, prepared).await.map_err(|e| TokenError::Failed(e.to_string()))?;

        match response.status {
            200..=299 => {
                let token = request
                    .decode(&response.body)
                    .map_err(|e| TokenError::Failed(e.to_string()))?;
                let expires_at = token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs));
                debug!(rotated = token.refresh_token.is_some(), "access token refreshed");
                Ok(session.refreshed(token.access_token, token.refresh_token, expires_at))
            }
            400 | 401 if is_invalid_grant(&response.body) => {
                warn!(status = response.status, "refresh token rejected");
                Err(TokenError::ExpiredRefreshToken)
            }
            status => {
                let message = error_message(&response.body)
                    .unwrap_or_else(|| format!("HTTP {status}"));
                Err(TokenError::Failed(message))
            }
        }
    }
}

fn is_invalid_grant(body: &[u8]) -> bool {
    #[derive(Deserialize)]
    struct OAuthError {
        error: Option<String>,
    }
    serde_json::from_slice::<OAuthError>(body)
        .ok()
        .and_then(|e| e.error)
        .is_some_and(|error| error == "invalid_grant")
}

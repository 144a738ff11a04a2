//! Canvas API client
//!
//! Executes [`Requestable`] endpoints against the current login session:
//! - Builds the request relative to the session base URL with the bearer token
//! - On 401, waits for a single shared token refresh and replays once
//! - On a rate limit, sleeps a fixed delay and retries
//! - Decodes the body with the endpoint's decoder and returns `Link` relations

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use canvas_core::{ApiMethod, Links, PreparedRequest, RequestContext, Requestable};
use canvas_domain::constants::RATE_LIMIT_MARKER;
use canvas_domain::{ApiConfig, LoginSession};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use tracing::{debug, instrument, warn};
use url::Url;

use super::errors::{error_message, ApiError};
use crate::auth::{RefreshOutcome, SharedSession, TokenRefreshInteractor};
use crate::http::{multipart, HttpClient};

/// Decoded response plus the bits of the HTTP response callers care about.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub body: T,
    pub status: u16,
    pub links: Links,
}

/// Raw response before decoding.
#[derive(Debug, Clone)]
pub(crate) struct RawResponse {
    pub status: u16,
    pub links: Links,
    pub body: Vec<u8>,
}

impl RawResponse {
    fn is_rate_limited(&self) -> bool {
        self.status == 429
            || (self.status == 403
                && String::from_utf8_lossy(&self.body).contains(RATE_LIMIT_MARKER))
    }
}

/// API client bound to one login session.
pub struct Api {
    base_url: Url,
    user_agent: String,
    session: SharedSession,
    http: HttpClient,
    http_without_cookies: HttpClient,
    interactor: Option<Arc<TokenRefreshInteractor>>,
    rate_limit_delay: Duration,
    rate_limit_max_retries: Option<u32>,
}

impl Api {
    /// Create a client from configuration. `config.base_url` is used until a
    /// session is present; afterwards requests go to the session's instance.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] for an invalid base URL or when the HTTP
    /// client cannot be built.
    pub fn new(config: &ApiConfig, session: Option<LoginSession>) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ApiError::Config(format!("Invalid base URL {:?}: {e}", config.base_url))
        })?;

        let builder = || {
            HttpClient::builder()
                .timeout(Duration::from_secs(config.timeout_seconds))
                .max_attempts(config.transport_max_attempts)
        };

        Ok(Self {
            base_url,
            user_agent: config.user_agent.clone(),
            session: SharedSession::new(session),
            http: builder().cookie_store(true).build()?,
            http_without_cookies: builder().cookie_store(false).build()?,
            interactor: None,
            rate_limit_delay: Duration::from_millis(config.rate_limit_delay_ms),
            rate_limit_max_retries: config.rate_limit_max_retries,
        })
    }

    /// Recover from 401s through this interactor. It must share this
    /// client's session (see [`Api::shared_session`]).
    #[must_use]
    pub fn with_interactor(mut self, interactor: Arc<TokenRefreshInteractor>) -> Self {
        self.session = interactor.session().clone();
        self.interactor = Some(interactor);
        self
    }

    pub fn session(&self) -> Option<LoginSession> {
        self.session.get()
    }

    pub fn shared_session(&self) -> SharedSession {
        self.session.clone()
    }

    pub fn interactor(&self) -> Option<&Arc<TokenRefreshInteractor>> {
        self.interactor.as_ref()
    }

    /// Instance requests are resolved against.
    pub fn base_url(&self) -> Url {
        self.session.get().map_or_else(|| self.base_url.clone(), |s| s.base_url)
    }

    /// Execute a request and return only the decoded body.
    ///
    /// # Errors
    /// See [`Api::make_request`].
    pub async fn make<R: Requestable>(&self, request: &R) -> Result<R::Response, ApiError> {
        self.make_request(request).await.map(|response| response.body)
    }

    /// Execute a request, handling token refresh and rate limits.
    ///
    /// # Errors
    /// - [`ApiError::Unauthorized`] when a 401 could not be recovered
    /// - [`ApiError::InvalidGrant`] when the session was logged out during refresh
    /// - [`ApiError::RateLimit`] when the optional retry cap is reached
    /// - status, transport and decode errors otherwise
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn make_request<R: Requestable>(
        &self,
        request: &R,
    ) -> Result<ApiResponse<R::Response>, ApiError> {
        let mut replayed = false;
        let mut throttled: u32 = 0;

        loop {
            let session = self.session.get();
            let base_url =
                session.as_ref().map_or_else(|| self.base_url.clone(), |s| s.base_url.clone());
            let token = session.as_ref().and_then(|s| s.access_token.clone());

            let ctx = RequestContext::new(&base_url, &self.user_agent)
                .access_token(token.as_deref())
                .act_as_user_id(session.as_ref().and_then(LoginSession::act_as_user_id));
            let prepared = request.prepare(&ctx)?;
            let response = self.send_prepared(prepared).await?;

            if response.status == 401 {
                if !replayed {
                    let outcome =
                        self.recover_unauthorized(session.as_ref(), token.as_deref()).await;
                    if let Some(outcome) = outcome {
                        replayed = true;
                        match outcome {
                            RefreshOutcome::LoggedOut => return Err(ApiError::InvalidGrant),
                            RefreshOutcome::Refreshed(_) | RefreshOutcome::Failed => continue,
                        }
                    }
                }
                return Err(ApiError::Unauthorized);
            }

            if response.is_rate_limited() {
                throttled += 1;
                if self.rate_limit_max_retries.is_some_and(|max| throttled > max) {
                    let message = error_message(&response.body)
                        .unwrap_or_else(|| RATE_LIMIT_MARKER.to_string());
                    return Err(ApiError::RateLimit(message));
                }
                warn!(status = response.status, attempt = throttled, "rate limited, retrying");
                tokio::time::sleep(self.rate_limit_delay).await;
                continue;
            }

            if !(200..300).contains(&response.status) {
                return Err(ApiError::from_status(response.status, &response.body));
            }

            let body = request.decode(&response.body)?;
            return Ok(ApiResponse { body, status: response.status, links: response.links });
        }
    }

    /// Fetch every page of a collection by following `rel="next"` links.
    ///
    /// # Errors
    /// Fails on the first page that fails; nothing partial is returned.
    pub async fn exhaust<R>(&self, request: &R) -> Result<R::Response, ApiError>
    where
        R: Requestable,
        R::Response: IntoIterator + Extend<<R::Response as IntoIterator>::Item>,
    {
        let first = self.make_request(request).await?;
        let mut collected = first.body;
        let mut seen = HashSet::new();
        let mut next = request.get_next(&first.links);

        while let Some(page_request) = next {
            if !seen.insert(page_request.path()) {
                warn!(url = %page_request.path(), "pagination loop detected, stopping");
                break;
            }
            debug!(url = %page_request.path(), "fetching next page");
            let page = self.make_request(&page_request).await?;
            collected.extend(page.body);
            next = request.get_next(&page.links);
        }

        Ok(collected)
    }

    async fn recover_unauthorized(
        &self,
        session: Option<&LoginSession>,
        token: Option<&str>,
    ) -> Option<RefreshOutcome> {
        let interactor = self.interactor.as_ref()?;
        if !session.is_some_and(LoginSession::can_refresh) {
            return None;
        }
        debug!("401 received, waiting for token refresh");
        Some(interactor.await_token_refresh(token).await)
    }

    async fn send_prepared(&self, prepared: PreparedRequest) -> Result<RawResponse, ApiError> {
        let http = if prepared.handle_cookies { &self.http } else { &self.http_without_cookies };
        send(http, prepared).await
    }
}

pub(crate) fn to_reqwest_method(method: ApiMethod) -> Method {
    match method {
        ApiMethod::Delete => Method::DELETE,
        ApiMethod::Get => Method::GET,
        ApiMethod::Post => Method::POST,
        ApiMethod::Put => Method::PUT,
        ApiMethod::Head => Method::HEAD,
        ApiMethod::Patch => Method::PATCH,
    }
}

/// Execute a prepared request and read the whole body. Forms go out as
/// `reqwest` multipart bodies with Canvas' content type.
pub(crate) async fn send(
    http: &HttpClient,
    prepared: PreparedRequest,
) -> Result<RawResponse, ApiError> {
    let mut builder = http.request(to_reqwest_method(prepared.method), prepared.url);
    for (name, value) in &prepared.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(form) = prepared.form {
        let form = multipart::to_multipart(form).await?;
        let content_type = multipart::content_type(&form);
        let (client, request) = builder.multipart(form).build_split();
        let mut request =
            request.map_err(|e| ApiError::Config(format!("invalid multipart request: {e}")))?;
        let value = HeaderValue::from_str(&content_type)
            .map_err(|e| ApiError::Config(format!("invalid multipart content type: {e}")))?;
        request.headers_mut().insert(CONTENT_TYPE, value);
        builder = RequestBuilder::from_parts(client, request);
    } else if let Some(body) = prepared.body {
        builder = builder.body(body);
    }

    let response = http.send(builder).await?;
    let status = response.status().as_u16();
    let links = response
        .headers()
        .get_all(reqwest::header::LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join(",");
    let links = Links::parse(&links);
    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(format!("Failed to read response body: {e}")))?;

    Ok(RawResponse { status, links, body: body.to_vec() })
}

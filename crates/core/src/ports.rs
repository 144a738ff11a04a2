//! Ports used by the request pipeline
//!
//! The infra crate provides the OAuth refresher and session stores. Re-login
//! needs a user in front of a browser, so applications plug in their own
//! [`LoginAgain`].

use async_trait::async_trait;
use canvas_domain::{LoginSession, Result};
use thiserror::Error;

/// Why an access token could not be refreshed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The refresh token was rejected (`invalid_grant`); only a new login helps
    #[error("Refresh token expired or was revoked")]
    ExpiredRefreshToken,

    /// The session has no refresh token or client credentials
    #[error("Session cannot be refreshed")]
    NotRefreshable,

    #[error("Token refresh failed: {0}")]
    Failed(String),
}

/// Outcome of an interactive login that did not produce a usable session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoginAgainError {
    #[error("Login was canceled by the user")]
    CanceledByUser,

    #[error("Logged in as a different user")]
    LoggedInWithDifferentUser,

    #[error("Login failed: {0}")]
    Failed(String),
}

/// Exchanges a refresh token for a new access token.
#[async_trait]
pub trait AccessTokenRefresher: Send + Sync {
    /// Returns the session with new credentials applied.
    ///
    /// # Errors
    /// [`TokenError::ExpiredRefreshToken`] when the server rejects the grant.
    async fn refresh_access_token(
        &self,
        session: &LoginSession,
    ) -> std::result::Result<LoginSession, TokenError>;
}

/// Asks the user to authenticate again after the refresh token expired.
#[async_trait]
pub trait LoginAgain: Send + Sync {
    async fn login_again(
        &self,
        session: &LoginSession,
        cause: &TokenError,
    ) -> std::result::Result<LoginSession, LoginAgainError>;
}

/// Persistence for login sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Most recently used session, if any.
    async fn current(&self) -> Result<Option<LoginSession>>;

    /// Insert or replace the session for the same account and mark it current.
    async fn save(&self, session: &LoginSession) -> Result<()>;

    /// Forget the session for this account.
    async fn remove(&self, session: &LoginSession) -> Result<()>;
}

//! Token refresh interactor
//!
//! Serializes concurrent 401 recoveries behind a single refresh:
//! - The first request to hit a 401 starts a refresh on a spawned task
//! - Requests arriving while it runs wait on a oneshot channel
//! - When it finishes, every waiter receives the same [`RefreshOutcome`]
//!
//! A request that failed with a token which has already been replaced gets
//! the current session back immediately instead of starting a second
//! refresh. The new session is applied before waiters are released, so a
//! replayed request always sees it.

use std::sync::Arc;

use canvas_core::{AccessTokenRefresher, LoginAgain, LoginAgainError, SessionStore, TokenError};
use canvas_domain::LoginSession;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::session::SharedSession;

/// What a waiting request should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new session is in place; replay the request
    Refreshed(LoginSession),
    /// Refresh failed but the session is still there; replay once anyway
    Failed,
    /// The session was discarded; give up with `InvalidGrant`
    LoggedOut,
}

#[derive(Default)]
struct RefreshState {
    in_progress: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Coordinates token refresh for one [`SharedSession`].
pub struct TokenRefreshInteractor {
    session: SharedSession,
    store: Arc<dyn SessionStore>,
    refresher: Arc<dyn AccessTokenRefresher>,
    login: Arc<dyn LoginAgain>,
    state: Mutex<RefreshState>,
}

impl TokenRefreshInteractor {
    #[must_use]
    pub fn new(
        session: SharedSession,
        store: Arc<dyn SessionStore>,
        refresher: Arc<dyn AccessTokenRefresher>,
        login: Arc<dyn LoginAgain>,
    ) -> Self {
        Self { session, store, refresher, login, state: Mutex::new(RefreshState::default()) }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn is_refresh_in_progress(&self) -> bool {
        self.state.lock().in_progress
    }

    /// Number of requests waiting on the refresh in flight.
    pub fn waiting_count(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Wait until the session no longer carries `stale_token`.
    ///
    /// `stale_token` is the access token the failed request was sent with.
    pub async fn await_token_refresh(
        self: &Arc<Self>,
        stale_token: Option<&str>,
    ) -> RefreshOutcome {
        let rx = {
            let mut state = self.state.lock();
            if !state.in_progress {
                let Some(current) = self.session.get() else {
                    return RefreshOutcome::LoggedOut;
                };
                if current.access_token.as_deref() != stale_token {
                    debug!("token already refreshed, replaying without a new refresh");
                    return RefreshOutcome::Refreshed(current);
                }
                state.in_progress = true;
                self.spawn_refresh();
            }
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            rx
        };

        rx.await.unwrap_or(RefreshOutcome::Failed)
    }

    fn spawn_refresh(self: &Arc<Self>) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = this.run_refresh().await;
            this.finish(&outcome);
        });
    }

    async fn run_refresh(&self) -> RefreshOutcome {
        let Some(session) = self.session.get() else {
            return RefreshOutcome::LoggedOut;
        };

        info!(user_id = %session.user_id, "refreshing access token");
        match self.refresher.refresh_access_token(&session).await {
            Ok(refreshed) => {
                self.apply(&refreshed).await;
                RefreshOutcome::Refreshed(refreshed)
            }
            Err(TokenError::ExpiredRefreshToken) => {
                self.login_again(&session, &TokenError::ExpiredRefreshToken).await
            }
            Err(err) => {
                warn!(error = %err, "access token refresh failed");
                RefreshOutcome::Failed
            }
        }
    }

    async fn login_again(&self, session: &LoginSession, cause: &TokenError) -> RefreshOutcome {
        info!(user_id = %session.user_id, "refresh token expired, asking for a new login");
        match self.login.login_again(session, cause).await {
            Ok(new_session) if new_session.is_same_user(session) => {
                self.apply(&new_session).await;
                RefreshOutcome::Refreshed(new_session)
            }
            Ok(_) | Err(LoginAgainError::LoggedInWithDifferentUser) => {
                warn!(user_id = %session.user_id, "re-login landed on a different user");
                self.logout(session).await;
                RefreshOutcome::LoggedOut
            }
            Err(LoginAgainError::CanceledByUser) => {
                info!(user_id = %session.user_id, "re-login canceled");
                self.logout(session).await;
                RefreshOutcome::LoggedOut
            }
            Err(err @ LoginAgainError::Failed(_)) => {
                warn!(error = %err, "re-login failed");
                RefreshOutcome::Failed
            }
        }
    }

    async fn apply(&self, session: &LoginSession) {
        self.session.set(Some(session.clone()));
        if let Err(err) = self.store.save(session).await {
            warn!(error = %err, "failed to persist refreshed session");
        }
    }

    async fn logout(&self, session: &LoginSession) {
        self.session.set(None);
        if let Err(err) = self.store.remove(session).await {
            warn!(error = %err, "failed to remove session");
        }
    }

    fn finish(&self, outcome: &RefreshOutcome) {
        let waiters = {
            let mut state = self.state.lock();
            state.in_progress = false;
            std::mem::take(&mut state.waiters)
        };
        debug!(waiters = waiters.len(), "token refresh finished");
        for waiter in waiters {
            // receiver gone means the caller stopped waiting
            let _ = waiter.send(outcome.clone());
        }
    }
}

use async_trait::async_trait;
use canvas_core::{LoginAgain, LoginAgainError, TokenError};
use canvas_domain::LoginSession;
use tracing::warn;

/// [`LoginAgain`] for contexts without a user to ask, such as the CLI.
/// Every re-login counts as canceled, which logs the session out.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractiveLogin;

#[async_trait]
impl LoginAgain for NonInteractiveLogin {
    async fn login_again(
        &self,
        session: &LoginSession,
        cause: &TokenError,
    ) -> Result<LoginSession, LoginAgainError> {
        warn!(user_id = %session.user_id, cause = %cause, "interactive login unavailable");
        Err(LoginAgainError::CanceledByUser)
    }
}

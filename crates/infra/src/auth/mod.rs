//! Session lifecycle: shared session, token refresh, re-login and storage

pub mod interactor;
pub mod login;
pub mod refresher;
pub mod session;
pub mod store;

pub use interactor::{RefreshOutcome, TokenRefreshInteractor};
pub use login::NonInteractiveLogin;
pub use refresher::{ApiOAuthToken, OAuthTokenRefresher, PostLoginOAuthRequest};
pub use session::SharedSession;
pub use store::{FileSessionStore, InMemorySessionStore};

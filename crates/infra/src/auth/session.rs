use std::sync::Arc;

use canvas_domain::LoginSession;
use parking_lot::RwLock;

/// Live login session shared by [`crate::api::Api`] and the refresh
/// interactor. `None` once the user has been logged out.
#[derive(Debug, Clone, Default)]
pub struct SharedSession(Arc<RwLock<Option<LoginSession>>>);

impl SharedSession {
    pub fn new(session: Option<LoginSession>) -> Self {
        Self(Arc::new(RwLock::new(session)))
    }

    pub fn get(&self) -> Option<LoginSession> {
        self.0.read().clone()
    }

    pub fn set(&self, session: Option<LoginSession>) {
        *self.0.write() = session;
    }

    pub fn access_token(&self) -> Option<String> {
        self.0.read().as_ref().and_then(|s| s.access_token.clone())
    }
}

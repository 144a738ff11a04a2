//! Login session resolution for the CLI

use anyhow::Result;
use canvas_core::SessionStore;
use canvas_domain::LoginSession;
use clap::Args;
use url::Url;

/// Credentials given on the command line or in the environment. When no
/// token is given, the most recent stored session is used.
#[derive(Debug, Clone, Default, Args)]
pub struct SessionArgs {
    /// OAuth access token
    #[arg(long, env = "CANVAS_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    #[arg(long, env = "CANVAS_REFRESH_TOKEN", hide_env_values = true, global = true)]
    pub refresh_token: Option<String>,

    /// Developer key id
    #[arg(long, env = "CANVAS_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    #[arg(long, env = "CANVAS_CLIENT_SECRET", hide_env_values = true, global = true)]
    pub client_secret: Option<String>,

    /// Canvas user id the token belongs to
    #[arg(long, env = "CANVAS_USER_ID", default_value = "self", global = true)]
    pub user_id: String,
}

impl SessionArgs {
    /// Session built from explicit credentials, if a token was given.
    pub fn to_session(&self, base_url: &Url) -> Option<LoginSession> {
        let token = self.token.as_ref()?;
        let session = LoginSession::new(base_url.clone(), token.clone(), self.user_id.clone());
        Some(match (&self.refresh_token, &self.client_id, &self.client_secret) {
            (Some(refresh), Some(id), Some(secret)) => {
                session.with_refresh(refresh.clone(), id.clone(), secret.clone())
            }
            _ => session,
        })
    }
}

/// Explicit credentials win and are saved so refreshed tokens persist;
/// otherwise fall back to the store.
pub async fn resolve(
    args: &SessionArgs,
    base_url: &Url,
    store: &dyn SessionStore,
) -> Result<Option<LoginSession>> {
    if let Some(session) = args.to_session(base_url) {
        store.save(&session).await?;
        return Ok(Some(session));
    }
    Ok(store.current().await?)
}

#[cfg(test)]
mod tests {
    use canvas_infra::InMemorySessionStore;

    use super::*;

    fn base() -> Url {
        Url::parse("https://canvas.test").unwrap()
    }

    #[test]
    fn refresh_needs_all_credentials() {
        let args = SessionArgs {
            token: Some("t".into()),
            refresh_token: Some("r".into()),
            user_id: "self".into(),
            ..SessionArgs::default()
        };
        assert!(!args.to_session(&base()).unwrap().can_refresh());

        let args = SessionArgs {
            client_id: Some("c".into()),
            client_secret: Some("s".into()),
            ..args
        };
        assert!(args.to_session(&base()).unwrap().can_refresh());
    }

    #[tokio::test]
    async fn falls_back_to_stored_session() {
        let store = InMemorySessionStore::new();
        let stored = LoginSession::new(base(), "stored", "9");
        store.save(&stored).await.unwrap();

        let resolved = resolve(&SessionArgs::default(), &base(), &store).await.unwrap();
        assert_eq!(resolved, Some(stored));
    }

    #[tokio::test]
    async fn explicit_token_is_saved() {
        let store = InMemorySessionStore::new();
        let args = SessionArgs {
            token: Some("fresh".into()),
            user_id: "3".into(),
            ..SessionArgs::default()
        };

        let resolved = resolve(&args, &base(), &store).await.unwrap().unwrap();
        assert_eq!(resolved.access_token.as_deref(), Some("fresh"));
        assert_eq!(store.all().len(), 1);
    }
}

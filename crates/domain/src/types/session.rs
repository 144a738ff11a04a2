//! Persisted OAuth credentials for one account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::iso8601;

/// One logged-in Canvas account.
///
/// `client_id`/`client_secret` are the developer key the token was issued
/// for; without them (or without a refresh token) the session cannot be
/// refreshed and a 401 is final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSession {
    pub base_url: Url,
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, with = "iso8601::option", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub user_id: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    /// Base URL of the admin doing the masquerading, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masquerader: Option<Url>,
    #[serde(with = "iso8601")]
    pub last_used_at: DateTime<Utc>,
}

impl LoginSession {
    pub fn new(base_url: Url, access_token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            base_url,
            access_token: Some(access_token.into()),
            refresh_token: None,
            client_id: None,
            client_secret: None,
            expires_at: None,
            user_id: user_id.into(),
            user_name: String::new(),
            user_email: None,
            masquerader: None,
            last_used_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_refresh(
        mut self,
        refresh_token: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    #[must_use]
    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = name.into();
        self
    }

    #[must_use]
    pub fn with_masquerader(mut self, masquerader: Url) -> Self {
        self.masquerader = Some(masquerader);
        self
    }

    /// User id to send as `as_user_id` while masquerading.
    pub fn act_as_user_id(&self) -> Option<&str> {
        self.masquerader.as_ref().map(|_| self.user_id.as_str())
    }

    /// Whether a 401 on this session can be recovered by a token refresh.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }

    /// Same account on the same instance. Used to reject a re-login that
    /// landed on someone else.
    pub fn is_same_user(&self, other: &Self) -> bool {
        self.base_url.host_str() == other.base_url.host_str() && self.user_id == other.user_id
    }

    /// Stable key for session storage.
    pub fn unique_id(&self) -> String {
        let host = self.base_url.host_str().unwrap_or_default();
        match &self.masquerader {
            Some(admin) => format!(
                "{host}-{}-{}",
                self.user_id,
                admin.host_str().unwrap_or_default()
            ),
            None => format!("{host}-{}", self.user_id),
        }
    }

    /// Copy with a new access token; keeps the refresh token unless the
    /// server rotated it.
    #[must_use]
    pub fn refreshed(
        &self,
        access_token: String,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        let mut next = self.clone();
        next.access_token = Some(access_token);
        if refresh_token.is_some() {
            next.refresh_token = refresh_token;
        }
        next.expires_at = expires_at;
        next.last_used_at = Utc::now();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(host: &str, user: &str) -> LoginSession {
        LoginSession::new(Url::parse(host).unwrap(), "token", user)
    }

    #[test]
    fn refresh_requires_token_and_client() {
        let bare = session("https://canvas.test", "1");
        assert!(!bare.can_refresh());

        let full = bare.with_refresh("refresh", "client", "secret");
        assert!(full.can_refresh());
    }

    #[test]
    fn same_user_compares_host_and_id() {
        let a = session("https://canvas.test", "1");
        assert!(a.is_same_user(&session("https://canvas.test/", "1")));
        assert!(!a.is_same_user(&session("https://canvas.test", "2")));
        assert!(!a.is_same_user(&session("https://other.test", "1")));
    }

    #[test]
    fn act_as_user_only_when_masquerading() {
        let plain = session("https://canvas.test", "7");
        assert_eq!(plain.act_as_user_id(), None);

        let masked = plain.with_masquerader(Url::parse("https://admin.test").unwrap());
        assert_eq!(masked.act_as_user_id(), Some("7"));
        assert_eq!(masked.unique_id(), "canvas.test-7-admin.test");
    }

    #[test]
    fn refreshed_keeps_refresh_token_unless_rotated() {
        let original = session("https://canvas.test", "1").with_refresh("r1", "c", "s");

        let kept = original.refreshed("a2".to_string(), None, None);
        assert_eq!(kept.access_token.as_deref(), Some("a2"));
        assert_eq!(kept.refresh_token.as_deref(), Some("r1"));

        let rotated = original.refreshed("a3".to_string(), Some("r2".to_string()), None);
        assert_eq!(rotated.refresh_token.as_deref(), Some("r2"));
    }

    #[test]
    fn survives_json_round_trip_through_storage() {
        let original = session("https://canvas.test", "1").with_refresh("r", "c", "s");
        let json = serde_json::to_string(&original).unwrap();
        let restored: LoginSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.unique_id(), original.unique_id());
        assert_eq!(restored.refresh_token, original.refresh_token);
    }
}

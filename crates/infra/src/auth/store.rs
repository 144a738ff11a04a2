//! Session stores
//!
//! Both stores keep sessions most-recent first and identify an account by
//! [`LoginSession::unique_id`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use canvas_core::SessionStore;
use canvas_domain::{CanvasError, LoginSession, Result};
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Sessions hold bearer and refresh tokens: owner read/write only.
#[cfg(unix)]
const SESSION_FILE_MODE: u32 = 0o600;

fn upsert(sessions: &mut Vec<LoginSession>, session: &LoginSession) {
    let key = session.unique_id();
    sessions.retain(|s| s.unique_id() != key);
    sessions.insert(0, session.clone());
}

/// Process-local store, useful for tests and one-shot tools.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<Vec<LoginSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<LoginSession> {
        self.sessions.lock().clone()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn current(&self) -> Result<Option<LoginSession>> {
        Ok(self.sessions.lock().first().cloned())
    }

    async fn save(&self, session: &LoginSession) -> Result<()> {
        upsert(&mut self.sessions.lock(), session);
        Ok(())
    }

    async fn remove(&self, session: &LoginSession) -> Result<()> {
        let key = session.unique_id();
        self.sessions.lock().retain(|s| s.unique_id() != key);
        Ok(())
    }
}

/// JSON file holding a list of sessions.
///
/// A missing file reads as empty. Writes replace the whole file, which is
/// kept at mode 0600 on unix.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: tokio::sync::Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<LoginSession>> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CanvasError::Storage(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&contents).map_err(|e| {
            CanvasError::Storage(format!("Invalid session file {}: {e}", self.path.display()))
        })
    }

    async fn write_all(&self, sessions: &[LoginSession]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CanvasError::Storage(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
        let json = serde_json::to_vec_pretty(sessions)
            .map_err(|e| CanvasError::Storage(format!("Failed to encode sessions: {e}")))?;
        let write_err =
            |e: std::io::Error| CanvasError::Storage(format!("Failed to write {}: {e}", self.path.display()));

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(SESSION_FILE_MODE);

        let mut file = options.open(&self.path).await.map_err(write_err)?;
        // `mode` only applies on create; tighten files left by older writers.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(SESSION_FILE_MODE))
                .await
                .map_err(write_err)?;
        }
        file.write_all(&json).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;
        debug!(path = %self.path.display(), count = sessions.len(), "session file written");
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn current(&self) -> Result<Option<LoginSession>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.into_iter().next())
    }

    async fn save(&self, session: &LoginSession) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut sessions = self.read_all().await?;
        upsert(&mut sessions, session);
        self.write_all(&sessions).await
    }

    async fn remove(&self, session: &LoginSession) -> Result<()> {
        let _guard = self.lock.lock().await;
        let key = session.unique_id();
        let mut sessions = self.read_all().await?;
        sessions.retain(|s| s.unique_id() != key);
        self.write_all(&sessions).await
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;

    fn session(user: &str, token: &str) -> LoginSession {
        LoginSession::new(Url::parse("https://canvas.test").unwrap(), token, user)
    }

    #[tokio::test]
    async fn memory_store_keeps_most_recent_first() {
        let store = InMemorySessionStore::new();
        store.save(&session("1", "a")).await.unwrap();
        store.save(&session("2", "b")).await.unwrap();
        store.save(&session("1", "c")).await.unwrap();

        let all = store.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].access_token.as_deref(), Some("c"));
        assert_eq!(store.current().await.unwrap().unwrap().user_id, "1");

        store.remove(&session("1", "ignored")).await.unwrap();
        assert_eq!(store.current().await.unwrap().unwrap().user_id, "2");
    }

    #[tokio::test]
    async fn file_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sessions.json");
        let store = FileSessionStore::new(&path);

        assert!(store.current().await.unwrap().is_none());

        store.save(&session("1", "a")).await.unwrap();
        store.save(&session("2", "b")).await.unwrap();

        let reopened = FileSessionStore::new(&path);
        let current = reopened.current().await.unwrap().unwrap();
        assert_eq!(current.user_id, "2");

        reopened.remove(&current).await.unwrap();
        assert_eq!(store.current().await.unwrap().unwrap().user_id, "1");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_store_is_readable_by_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, "[]").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        FileSessionStore::new(&path).save(&session("1", "secret")).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let fresh = dir.path().join("fresh.json");
        FileSessionStore::new(&fresh).save(&session("1", "secret")).await.unwrap();
        assert_eq!(std::fs::metadata(&fresh).unwrap().permissions().mode() & 0o777, 0o600);
    }

    #[tokio::test]
    async fn file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileSessionStore::new(&path).current().await.unwrap_err();
        assert!(matches!(err, CanvasError::Storage(_)));
    }
}

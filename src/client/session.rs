//! Login state on top of a [`Backend`] and a [`TokenStore`].

use std::sync::Arc;

use super::{ApiError, Backend, TokenStore, UserProfile};
use crate::data::report::Report;

#[derive(Debug)]
pub struct Session {
    backend: Arc<dyn Backend>,
    store: TokenStore,
    token: Option<String>,
    user: Option<UserProfile>,
}

impl Session {
    pub fn new(backend: Arc<dyn Backend>, store: TokenStore) -> Self {
        Self {
            backend,
            store,
            token: None,
            user: None,
        }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Resume from a stored token.
    ///
    /// Returns `Ok(false)` when there is no token or the backend rejected it;
    /// a rejected token is removed from the store. Network failures are
    /// returned as errors and leave the stored token alone.
    pub async fn restore(&mut self) -> Result<bool, ApiError> {
        let Some(token) = self.store.load()? else {
            return Ok(false);
        };

        match self.backend.me(&token).await {
            Ok(user) => {
                tracing::info!(username = %user.username, "Restored session");
                self.token = Some(token);
                self.user = Some(user);
                Ok(true)
            }
            Err(e) if e.is_auth() => {
                tracing::warn!(error = %e, "Stored token rejected");
                self.store.clear()?;
                self.token = None;
                self.user = None;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Log in, persist the token, then fetch the profile.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<&UserProfile, ApiError> {
        let token = self.backend.login(username, password).await?;
        self.store.save(&token)?;

        let user = self.backend.me(&token).await?;
        self.token = Some(token);
        Ok(self.user.insert(user))
    }

    /// Run a batch analysis with the session's token.
    ///
    /// A token the backend rejects mid-session is cleared like on restore.
    pub async fn upload_test(&mut self, file_name: &str, contents: Vec<u8>) -> Result<Report, ApiError> {
        let Some(token) = self.token.as_deref() else {
            return Err(ApiError::Auth("Not logged in".to_string()));
        };

        match self.backend.upload_test(token, file_name, contents).await {
            Err(e) if e.is_auth() => {
                tracing::warn!(error = %e, "Token rejected during upload");
                self.logout()?;
                Err(e)
            }
            result => result,
        }
    }

    /// Forget the token, both in memory and on disk.
    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.token = None;
        self.user = None;
        self.store.clear()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// In-memory backend accepting one user and one token.
    #[derive(Debug)]
    pub(crate) struct MockBackend {
        pub reachable: bool,
        /// When false, uploads fail as if the token had expired.
        pub accepts_uploads: bool,
        pub engines: Mutex<Vec<u32>>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self {
                reachable: true,
                accepts_uploads: true,
                engines: Mutex::new(Vec::new()),
            }
        }

        fn check(&self) -> Result<(), ApiError> {
            if self.reachable {
                Ok(())
            } else {
                Err(ApiError::Connection("connection refused".to_string()))
            }
        }
    }

    #[async_trait]
    impl Backend for MockBackend {
        async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
            self.check()?;
            if username == "admin" && password == "admin123" {
                Ok("good-token".to_string())
            } else {
                Err(ApiError::Auth("Incorrect username or password".to_string()))
            }
        }

        async fn me(&self, token: &str) -> Result<UserProfile, ApiError> {
            self.check()?;
            if token != "good-token" {
                return Err(ApiError::Auth("Could not validate credentials".to_string()));
            }
            Ok(UserProfile {
                username: "admin".to_string(),
                email: "admin@aegisflow.io".to_string(),
                role: "admin".to_string(),
                active: true,
            })
        }

        async fn set_engine(&self, token: Option<&str>, unit_id: u32) -> Result<String, ApiError> {
            self.check()?;
            if token != Some("good-token") {
                return Err(ApiError::Auth("Not authenticated".to_string()));
            }
            self.engines.lock().push(unit_id);
            Ok(format!("Switched to Engine {}", unit_id))
        }

        async fn upload_test(
            &self,
            token: &str,
            _file_name: &str,
            _contents: Vec<u8>,
        ) -> Result<Report, ApiError> {
            self.check()?;
            if token != "good-token" || !self.accepts_uploads {
                return Err(ApiError::Auth("Could not validate credentials".to_string()));
            }
            Ok(Report::default())
        }
    }

    fn session_with(backend: MockBackend) -> (Session, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token"));
        (Session::new(Arc::new(backend), store), dir)
    }

    #[tokio::test]
    async fn test_login_persists_token() {
        let (mut session, dir) = session_with(MockBackend::new());

        let user = session.login("admin", "admin123").await.unwrap();
        assert_eq!(user.role, "admin");
        assert!(session.is_logged_in());
        assert_eq!(session.token(), Some("good-token"));

        let stored = std::fs::read_to_string(dir.path().join("token")).unwrap();
        assert_eq!(stored, "good-token");
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let (mut session, dir) = session_with(MockBackend::new());

        let err = session.login("admin", "nope").await.unwrap_err();
        assert!(err.is_auth());
        assert!(!session.is_logged_in());
        assert!(!dir.path().join("token").exists());
    }

    #[tokio::test]
    async fn test_restore_valid_token() {
        let (mut session, dir) = session_with(MockBackend::new());
        std::fs::write(dir.path().join("token"), "good-token").unwrap();

        assert!(session.restore().await.unwrap());
        assert_eq!(session.user().unwrap().username, "admin");
    }

    #[tokio::test]
    async fn test_restore_rejected_token_is_cleared() {
        let (mut session, dir) = session_with(MockBackend::new());
        std::fs::write(dir.path().join("token"), "expired").unwrap();

        assert!(!session.restore().await.unwrap());
        assert!(session.token().is_none());
        assert!(!dir.path().join("token").exists());
    }

    #[tokio::test]
    async fn test_restore_offline_keeps_token() {
        let backend = MockBackend {
            reachable: false,
            ..MockBackend::new()
        };
        let (mut session, dir) = session_with(backend);
        std::fs::write(dir.path().join("token"), "good-token").unwrap();

        assert!(matches!(session.restore().await, Err(ApiError::Connection(_))));
        assert!(dir.path().join("token").exists());
    }

    #[tokio::test]
    async fn test_restore_without_token() {
        let (mut session, _dir) = session_with(MockBackend::new());
        assert!(!session.restore().await.unwrap());
    }

    #[tokio::test]
    async fn test_logout() {
        let (mut session, dir) = session_with(MockBackend::new());
        session.login("admin", "admin123").await.unwrap();

        session.logout().unwrap();
        assert!(!session.is_logged_in());
        assert!(session.token().is_none());
        assert!(!dir.path().join("token").exists());
    }

    #[tokio::test]
    async fn test_upload_with_session() {
        let (mut session, _dir) = session_with(MockBackend::new());

        assert!(session.upload_test("test_FD001.txt", Vec::new()).await.unwrap_err().is_auth());

        session.login("admin", "admin123").await.unwrap();
        let report = session.upload_test("test_FD001.txt", b"1 1".to_vec()).await.unwrap();
        assert!(report.is_empty());
        assert!(session.is_logged_in());
    }

    #[tokio::test]
    async fn test_upload_rejected_token_is_cleared() {
        let backend = MockBackend {
            accepts_uploads: false,
            ..MockBackend::new()
        };
        let (mut session, dir) = session_with(backend);
        session.login("admin", "admin123").await.unwrap();

        let err = session.upload_test("test_FD001.txt", b"1 1".to_vec()).await.unwrap_err();
        assert!(err.is_auth());
        assert!(!session.is_logged_in());
        assert!(session.token().is_none());
        assert!(!dir.path().join("token").exists());
    }
}

//! Current-user lookup for default lead assignment
//!
//! The executor never reaches for a global session; it is handed a
//! `SessionProvider` when the run starts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::types::{CurrentUser, StoredSession};

pub trait SessionProvider: Send + Sync {
    /// The authenticated user, or `None` when nobody is logged in
    fn current_user(&self) -> Option<CurrentUser>;
}

/// Fixed user (CLI override, tests) or no user at all
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user: Option<CurrentUser>,
}

impl StaticSession {
    pub fn new(user: CurrentUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn with_id(id: i64) -> Self {
        Self::new(CurrentUser {
            id,
            username: None,
            email: None,
            full_name: None,
            company_id: None,
        })
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

impl SessionProvider for StaticSession {
    fn current_user(&self) -> Option<CurrentUser> {
        self.user.clone()
    }
}

/// Session saved to disk by the login flow (the auth response JSON)
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
    session: Option<StoredSession>,
}

impl SessionFile {
    /// Load the session file. A missing file means "not logged in"; an
    /// unreadable or malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            warn!("Session file {} not found, continuing without a user", path.display());
            return Ok(Self { path, session: None });
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session file {}", path.display()))?;
        let session: StoredSession = serde_json::from_str(&content)
            .with_context(|| format!("Invalid session file {}", path.display()))?;

        debug!("Loaded session for user {} from {}", session.user.id, path.display());
        Ok(Self {
            path,
            session: Some(session),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bearer token saved with the session, if any
    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.token.as_deref())
    }
}

impl SessionProvider for SessionFile {
    fn current_user(&self) -> Option<CurrentUser> {
        self.session.as_ref().map(|s| s.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn session_file_with(content: &str) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn test_static_session_returns_user() {
        let session = StaticSession::with_id(9);
        assert_eq!(session.current_user().map(|u| u.id), Some(9));
        assert!(StaticSession::anonymous().current_user().is_none());
    }

    #[test]
    fn test_session_file_loads_user_and_token() {
        let file = session_file_with(
            r#"{"token":"abc","id":12,"username":"petr","fullName":"Petr Svoboda","companyId":"c-9"}"#,
        );

        let session = SessionFile::load(file.path()).unwrap();

        let user = session.current_user().unwrap();
        assert_eq!(user.id, 12);
        assert_eq!(user.company_id.as_deref(), Some("c-9"));
        assert_eq!(session.token(), Some("abc"));
        assert_eq!(session.path(), file.path());
    }

    #[test]
    fn test_missing_session_file_means_no_user() {
        let dir = tempfile::tempdir().unwrap();

        let session = SessionFile::load(dir.path().join("session.json")).unwrap();

        assert!(session.current_user().is_none());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_malformed_session_file_is_an_error() {
        let file = session_file_with("not json");

        assert!(SessionFile::load(file.path()).is_err());
    }
}

//! Current user identity and where it is kept between runs.
//!
//! Credentials are not verified anywhere in the client: a session is whatever
//! was last saved with `login`. Real authentication can replace the stores
//! without touching consumers, which only see [`AuthContext`].

use keyring::Entry;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::KEYRING_SERVICE;

const KEYRING_USER: &str = "session";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Company,
    Teacher,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Company => "company",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Student => "Estudiante",
            Self::Company => "Empresa",
            Self::Teacher => "Docente",
            Self::Admin => "Administrador",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" | "estudiante" => Ok(Self::Student),
            "company" | "empresa" => Ok(Self::Company),
            "teacher" | "docente" => Ok(Self::Teacher),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

// The token never reaches logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, SessionError>;
    fn save(&self, session: &Session) -> Result<(), SessionError>;
    /// Removing a session that does not exist is not an error.
    fn clear(&self) -> Result<(), SessionError>;
}

/// OS-backed secure storage (Keychain, Secret Service, Credential Manager).
pub struct KeyringSessionStore {
    service: String,
}

impl KeyringSessionStore {
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<Entry, SessionError> {
        Ok(Entry::new(&self.service, KEYRING_USER)?)
    }
}

impl Default for KeyringSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for KeyringSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        match self.entry()?.get_password() {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(SessionError::Keyring(e)),
        }
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        let json = serde_json::to_string(session)?;
        self.entry()?.set_password(&json)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SessionError::Keyring(e)),
        }
    }
}

/// `session.json` under the data directory.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.session.lock().clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.session.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.session.lock() = None;
        Ok(())
    }
}

/// The signed-in user as seen by the notification components: identity for
/// display, token for the HTTP store.
pub struct AuthContext {
    store: Box<dyn SessionStore>,
    current: Option<Session>,
}

impl AuthContext {
    /// Read the persisted session, if any. A corrupt or unreadable entry is
    /// logged and treated as signed out.
    pub fn restore(store: Box<dyn SessionStore>) -> Self {
        let current = match store.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "could not restore session");
                None
            }
        };
        Self { store, current }
    }

    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().and_then(|s| s.token.as_deref())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.display_name.as_str())
    }

    pub fn login(&mut self, session: Session) -> Result<(), SessionError> {
        self.store.save(&session)?;
        tracing::info!(user_id = %session.user_id, role = %session.role, "signed in");
        self.current = Some(session);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.store.clear()?;
        self.current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session() -> Session {
        Session {
            user_id: "u-7".to_string(),
            display_name: "Ana Pérez".to_string(),
            role: UserRole::Student,
            token: Some("secret-token".to_string()),
        }
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::in_dir(dir.path().join("nested"));
        assert!(store.load().unwrap().is_none());

        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(session()));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_uses_camel_case() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::in_dir(dir.path());
        store.save(&session()).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"displayName\""));
        assert!(raw.contains("\"role\": \"student\""));
    }

    #[test]
    fn test_corrupt_file_restores_signed_out() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();
        let store = FileSessionStore::in_dir(dir.path());
        assert!(matches!(store.load(), Err(SessionError::Corrupt(_))));

        let auth = AuthContext::restore(Box::new(store));
        assert!(!auth.is_signed_in());
    }

    #[test]
    fn test_auth_context_login_logout() {
        let mut auth = AuthContext::restore(Box::<MemorySessionStore>::default());
        assert_eq!(auth.token(), None);

        auth.login(session()).unwrap();
        assert_eq!(auth.display_name(), Some("Ana Pérez"));
        assert_eq!(auth.token(), Some("secret-token"));

        auth.logout().unwrap();
        assert!(auth.session().is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", session());
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Empresa".parse::<UserRole>().unwrap(), UserRole::Company);
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("rector".parse::<UserRole>().is_err());
    }
}

//! # Auth Session Store
//!
//! Holds who is logged in: bearer token, role and email.
//!
//! ## Storage Scopes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where a Session Lives                              │
//! │                                                                         │
//! │  login(grant, remember_me = true)                                       │
//! │     └──► DurableStorage       <data_dir>/session.json                   │
//! │          survives restarts                                              │
//! │                                                                         │
//! │  login(grant, remember_me = false)                                      │
//! │     └──► SessionScopeStorage  process memory                            │
//! │          gone when the shell exits                                      │
//! │                                                                         │
//! │  restore()  : durable first, then session scope                         │
//! │  logout()   : clears BOTH scopes, whatever login chose                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Secrets
//! The token is held as a [`SecretString`] in memory and never appears in
//! `Debug` output or log fields. It is written in clear to `session.json`
//! (owner-only permissions on Unix) because the backend needs it verbatim.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

use livemart_core::{LoginGrant, Role};

use crate::api::TokenSource;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Stored Session
// =============================================================================

/// The persisted form of a session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub role: Role,
    pub email: String,
    pub saved_at: DateTime<Utc>,
}

impl fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSession")
            .field("token", &"[REDACTED]")
            .field("role", &self.role)
            .field("email", &self.email)
            .field("saved_at", &self.saved_at)
            .finish()
    }
}

/// Which storage a session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageScope {
    /// Survives restarts ("remember me").
    Durable,
    /// Lives as long as the process.
    Session,
}

// =============================================================================
// Storage Seam
// =============================================================================

/// A place a session can be kept.
pub trait SessionStorage: Send + Sync {
    fn scope(&self) -> StorageScope;

    /// Returns the stored session, if any.
    fn load(&self) -> ClientResult<Option<StoredSession>>;

    fn save(&self, session: &StoredSession) -> ClientResult<()>;

    /// Removes the stored session. Clearing an empty storage is not an error.
    fn clear(&self) -> ClientResult<()>;
}

/// JSON file storage for remembered sessions.
#[derive(Debug, Clone)]
pub struct DurableStorage {
    path: PathBuf,
}

impl DurableStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DurableStorage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for DurableStorage {
    fn scope(&self) -> StorageScope {
        StorageScope::Durable
    }

    fn load(&self) -> ClientResult<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let session = serde_json::from_str(&contents)
            .map_err(|e| ClientError::Storage(format!("corrupt session file: {}", e)))?;
        Ok(Some(session))
    }

    fn save(&self, session: &StoredSession) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        debug!(path = ?self.path, "Session saved to disk");
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage for sessions that end with the process.
#[derive(Debug, Default)]
pub struct SessionScopeStorage {
    slot: Mutex<Option<StoredSession>>,
}

impl SessionScopeStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for SessionScopeStorage {
    fn scope(&self) -> StorageScope {
        StorageScope::Session
    }

    fn load(&self) -> ClientResult<Option<StoredSession>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &StoredSession) -> ClientResult<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// =============================================================================
// Session
// =============================================================================

/// The logged-in user.
struct ActiveSession {
    token: SecretString,
    role: Role,
    email: String,
    scope: StorageScope,
}

impl From<(StoredSession, StorageScope)> for ActiveSession {
    fn from((stored, scope): (StoredSession, StorageScope)) -> Self {
        ActiveSession {
            token: SecretString::from(stored.token),
            role: stored.role,
            email: stored.email,
            scope,
        }
    }
}

/// Public view of the current session, without the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub role: Role,
    pub email: String,
    pub remembered: bool,
}

// =============================================================================
// Auth Session Store
// =============================================================================

/// Owns the current session and both storage scopes.
pub struct AuthSessionStore {
    durable: Box<dyn SessionStorage>,
    ephemeral: Box<dyn SessionStorage>,
    current: RwLock<Option<ActiveSession>>,
}

impl AuthSessionStore {
    /// Creates a logged-out store over the given storages.
    pub fn new(durable: Box<dyn SessionStorage>, ephemeral: Box<dyn SessionStorage>) -> Self {
        AuthSessionStore {
            durable,
            ephemeral,
            current: RwLock::new(None),
        }
    }

    /// Creates a store backed by the configured session file and restores
    /// any remembered session.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let path = config
            .session_file()
            .ok_or_else(|| ClientError::Storage("no data directory available".into()))?;

        let store = Self::new(
            Box::new(DurableStorage::new(path)),
            Box::new(SessionScopeStorage::new()),
        );
        store.restore();
        Ok(store)
    }

    /// Loads a session from storage, durable first.
    ///
    /// Unreadable storage is logged and treated as logged out.
    pub fn restore(&self) -> Option<SessionInfo> {
        for storage in [&self.durable, &self.ephemeral] {
            match storage.load() {
                Ok(Some(stored)) => {
                    info!(role = %stored.role, scope = ?storage.scope(), "Session restored");
                    *self.write() = Some(ActiveSession::from((stored, storage.scope())));
                    return self.info();
                }
                Ok(None) => {}
                Err(e) => warn!(scope = ?storage.scope(), error = %e, "Ignoring unreadable session"),
            }
        }
        None
    }

    /// Records a successful login.
    ///
    /// `remember_me` picks durable storage; otherwise the session lasts as
    /// long as the process. The other scope is cleared so a restart cannot
    /// resurrect an older login.
    pub fn login(&self, grant: LoginGrant, remember_me: bool) -> ClientResult<SessionInfo> {
        let stored = StoredSession {
            token: grant.access_token,
            role: grant.role,
            email: grant.email,
            saved_at: Utc::now(),
        };

        let (target, other) = if remember_me {
            (&self.durable, &self.ephemeral)
        } else {
            (&self.ephemeral, &self.durable)
        };

        target.save(&stored)?;
        if let Err(e) = other.clear() {
            warn!(scope = ?other.scope(), error = %e, "Could not clear previous session");
        }

        info!(role = %stored.role, remember_me, "Logged in");

        let info = SessionInfo {
            role: stored.role,
            email: stored.email.clone(),
            remembered: remember_me,
        };
        *self.write() = Some(ActiveSession::from((stored, target.scope())));
        Ok(info)
    }

    /// Logs out: forgets the in-memory session and clears both storages.
    ///
    /// Both clears are attempted even if one fails; the first failure is
    /// returned.
    pub fn logout(&self) -> ClientResult<()> {
        *self.write() = None;

        let durable = self.durable.clear();
        let ephemeral = self.ephemeral.clear();

        info!("Logged out");
        durable.and(ephemeral)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.read().as_ref().map(|s| s.role)
    }

    pub fn email(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.email.clone())
    }

    pub fn info(&self) -> Option<SessionInfo> {
        self.read().as_ref().map(|s| SessionInfo {
            role: s.role,
            email: s.email.clone(),
            remembered: s.scope == StorageScope::Durable,
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<ActiveSession>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<ActiveSession>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenSource for AuthSessionStore {
    fn bearer_token(&self) -> Option<SecretString> {
        self.read()
            .as_ref()
            .map(|s| SecretString::from(s.token.expose_secret().to_owned()))
    }
}

impl fmt::Debug for AuthSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSessionStore")
            .field("session", &self.info())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn grant(role: Role) -> LoginGrant {
        LoginGrant {
            access_token: "tok-123".to_string(),
            token_type: "bearer".to_string(),
            role,
            email: "asha@example.com".to_string(),
        }
    }

    fn temp_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("livemart-session-{}", uuid::Uuid::new_v4()))
            .join("session.json")
    }

    /// Storage that shares its slot with the test so saves can be observed.
    #[derive(Clone, Default)]
    struct SharedStorage {
        scope: Option<StorageScope>,
        slot: Arc<Mutex<Option<StoredSession>>>,
        clears: Arc<Mutex<u32>>,
    }

    impl SharedStorage {
        fn new(scope: StorageScope) -> Self {
            SharedStorage {
                scope: Some(scope),
                ..Default::default()
            }
        }

        fn stored(&self) -> Option<StoredSession> {
            self.slot.lock().unwrap().clone()
        }
    }

    impl SessionStorage for SharedStorage {
        fn scope(&self) -> StorageScope {
            self.scope.unwrap_or(StorageScope::Session)
        }
        fn load(&self) -> ClientResult<Option<StoredSession>> {
            Ok(self.stored())
        }
        fn save(&self, session: &StoredSession) -> ClientResult<()> {
            *self.slot.lock().unwrap() = Some(session.clone());
            Ok(())
        }
        fn clear(&self) -> ClientResult<()> {
            *self.clears.lock().unwrap() += 1;
            *self.slot.lock().unwrap() = None;
            Ok(())
        }
    }

    fn store() -> (AuthSessionStore, SharedStorage, SharedStorage) {
        let durable = SharedStorage::new(StorageScope::Durable);
        let ephemeral = SharedStorage::new(StorageScope::Session);
        let store = AuthSessionStore::new(Box::new(durable.clone()), Box::new(ephemeral.clone()));
        (store, durable, ephemeral)
    }

    #[test]
    fn test_starts_logged_out() {
        let (store, _, _) = store();
        assert!(!store.is_authenticated());
        assert_eq!(store.role(), None);
        assert!(store.bearer_token().is_none());
    }

    #[test]
    fn test_remember_me_uses_durable_storage() {
        let (store, durable, ephemeral) = store();

        let info = store.login(grant(Role::Retailer), true).unwrap();

        assert!(info.remembered);
        assert!(durable.stored().is_some());
        assert!(ephemeral.stored().is_none());
        assert_eq!(store.role(), Some(Role::Retailer));
        assert_eq!(store.bearer_token().unwrap().expose_secret(), "tok-123");
    }

    #[test]
    fn test_without_remember_me_uses_session_storage() {
        let (store, durable, ephemeral) = store();

        let info = store.login(grant(Role::Customer), false).unwrap();

        assert!(!info.remembered);
        assert!(durable.stored().is_none());
        assert_eq!(ephemeral.stored().unwrap().email, "asha@example.com");
    }

    #[test]
    fn test_logout_clears_both_scopes() {
        let (store, durable, ephemeral) = store();
        store.login(grant(Role::Customer), false).unwrap();

        store.logout().unwrap();

        assert!(!store.is_authenticated());
        assert!(store.bearer_token().is_none());
        assert_eq!(*durable.clears.lock().unwrap(), 2); // once at login, once at logout
        assert_eq!(*ephemeral.clears.lock().unwrap(), 1);
        assert!(durable.stored().is_none());
        assert!(ephemeral.stored().is_none());
    }

    #[test]
    fn test_restore_prefers_durable() {
        let (store, durable, ephemeral) = store();
        let now = Utc::now();
        durable
            .save(&StoredSession {
                token: "durable".into(),
                role: Role::Wholesaler,
                email: "w@example.com".into(),
                saved_at: now,
            })
            .unwrap();
        ephemeral
            .save(&StoredSession {
                token: "session".into(),
                role: Role::Customer,
                email: "c@example.com".into(),
                saved_at: now,
            })
            .unwrap();

        let info = store.restore().unwrap();

        assert_eq!(info.role, Role::Wholesaler);
        assert!(info.remembered);
        assert_eq!(store.bearer_token().unwrap().expose_secret(), "durable");
    }

    #[test]
    fn test_durable_storage_file_roundtrip() {
        let path = temp_file();
        let storage = DurableStorage::new(&path);

        assert_eq!(storage.load().unwrap(), None);
        storage.clear().unwrap();

        let session = StoredSession {
            token: "tok".into(),
            role: Role::Retailer,
            email: "r@example.com".into(),
            saved_at: Utc::now(),
        };
        storage.save(&session).unwrap();
        assert_eq!(storage.load().unwrap(), Some(session));

        storage.clear().unwrap();
        assert!(!path.exists());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_session_file_is_ignored_on_restore() {
        let path = temp_file();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let store = AuthSessionStore::new(
            Box::new(DurableStorage::new(&path)),
            Box::new(SessionScopeStorage::new()),
        );

        assert!(DurableStorage::new(&path).load().is_err());
        assert_eq!(store.restore(), None);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_debug_hides_token() {
        let session = StoredSession {
            token: "super-secret".into(),
            role: Role::Customer,
            email: "c@example.com".into(),
            saved_at: Utc::now(),
        };
        assert!(!format!("{:?}", session).contains("super-secret"));

        let (store, _, _) = store();
        store.login(grant(Role::Customer), false).unwrap();
        assert!(!format!("{:?}", store).contains("tok-123"));
    }
}

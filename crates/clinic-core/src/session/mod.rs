//! Session persistence
//!
//! The authenticated identity is a single JSON blob on disk, written on
//! login and removed on logout. A blob that fails to read or parse is
//! treated as "no session" and deleted on the spot, so a corrupt file
//! can never keep a stale identity alive.

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Staff category that determines which dashboard is mounted
///
/// Deserialization is strict: a role string the client does not know
/// fails to parse, which the [`SessionStore`] treats as corrupt data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Receptionist,
    Nurse,
    Manager,
    Doctor,
    Pharmacist,
    Technician,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Receptionist => "Receptionist",
            Role::Nurse => "Nurse",
            Role::Manager => "Manager",
            Role::Doctor => "Doctor",
            Role::Pharmacist => "Pharmacist",
            Role::Technician => "Technician",
        };
        write!(f, "{name}")
    }
}

/// The authenticated identity persisted after login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i64,
    #[serde(alias = "fullName")]
    pub display_name: String,
    pub role: Role,
}

/// File-backed store for the serialized session
///
/// All access is synchronous; the store is only ever touched from the
/// UI thread (reads everywhere, writes from login/logout).
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store at the default platform location
    ///
    /// `CLINIC_SESSION_PATH` overrides the location, which the tests use
    /// to point the store at a temp directory.
    pub fn new() -> Self {
        let path = if let Ok(custom) = env::var("CLINIC_SESSION_PATH") {
            PathBuf::from(custom)
        } else {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("clinic-staff")
                .join("session.json")
        };
        Self { path }
    }

    /// Create a store backed by an explicit file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the current session, if any
    ///
    /// Any read or parse failure clears the stored blob and reports no
    /// session - fail safe, never fail open.
    pub fn get(&self) -> Option<Session> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return None,
        };

        match serde_json::from_str::<Session>(&contents) {
            Ok(session) => {
                debug!(staff_id = session.id, role = %session.role, "Loaded stored session");
                Some(session)
            }
            Err(e) => {
                warn!(error = %e, "Stored session data is invalid, clearing it");
                self.clear();
                None
            }
        }
    }

    /// Persist a session, replacing any previous one
    pub fn set(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string(session)?;
        fs::write(&self.path, contents)?;
        debug!(staff_id = session.id, role = %session.role, "Session persisted");
        Ok(())
    }

    /// Remove the stored session; missing file is not an error
    pub fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, "Failed to remove session file");
            }
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::at(dir.path().join("session.json"))
    }

    fn sample_session() -> Session {
        Session {
            id: 7,
            display_name: "Jane Wanjiru".to_string(),
            role: Role::Receptionist,
        }
    }

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        store.set(&sample_session()).unwrap();
        let loaded = store.get().unwrap();
        assert_eq!(loaded, sample_session());
    }

    #[test]
    fn missing_file_means_no_session() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.get().is_none());
    }

    #[test]
    fn corrupt_blob_is_cleared_and_treated_as_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not valid json").unwrap();

        let store = SessionStore::at(&path);
        assert!(store.get().is_none());
        // The corrupt file must be gone, not just ignored
        assert!(!path.exists());
    }

    #[test]
    fn unknown_role_is_treated_as_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(
            &path,
            r#"{"id":1,"displayName":"X","role":"JANITOR"}"#,
        )
        .unwrap();

        let store = SessionStore::at(&path);
        assert!(store.get().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn accepts_server_field_name_for_display_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(
            &path,
            r#"{"id":3,"fullName":"Omondi Otieno","role":"NURSE"}"#,
        )
        .unwrap();

        let store = SessionStore::at(&path);
        let session = store.get().unwrap();
        assert_eq!(session.display_name, "Omondi Otieno");
        assert_eq!(session.role, Role::Nurse);
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.clear();
        store.set(&sample_session()).unwrap();
        store.clear();
        store.clear();
        assert!(store.get().is_none());
    }
}

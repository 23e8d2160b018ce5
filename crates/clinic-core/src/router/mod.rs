//! Role-based dashboard routing
//!
//! The router is a two-state machine over the persisted session:
//! `Unauthenticated` shows the login screen, `Authenticated(role)`
//! mounts exactly one dashboard through a total role-to-dashboard
//! mapping. There is no third state - a role the client cannot parse
//! never reaches `Authenticated` because session deserialization
//! rejects it upstream.

use tracing::info;

use crate::session::{Role, Session, SessionStore};

/// Dashboard composition mounted for a role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dashboard {
    Reception,
    Triage,
    Administration,
    Consultation,
    Pharmacy,
    Laboratory,
}

impl Dashboard {
    pub fn title(&self) -> &'static str {
        match self {
            Dashboard::Reception => "Reception",
            Dashboard::Triage => "Triage",
            Dashboard::Administration => "Administration",
            Dashboard::Consultation => "Consultation",
            Dashboard::Pharmacy => "Pharmacy",
            Dashboard::Laboratory => "Laboratory",
        }
    }

    /// Sidebar workspaces available on this dashboard
    pub fn workspaces(&self) -> &'static [Workspace] {
        match self {
            Dashboard::Reception => &[
                Workspace::Patients,
                Workspace::Appointments,
                Workspace::BookAppointment,
            ],
            Dashboard::Triage => &[Workspace::IncompleteRecords, Workspace::PastRecords],
            Dashboard::Administration => &[
                Workspace::Staff,
                Workspace::Appointments,
                Workspace::Billing,
                Workspace::Report,
            ],
            Dashboard::Consultation => &[Workspace::Appointments, Workspace::PastRecords],
            Dashboard::Pharmacy => &[Workspace::Billing],
            Dashboard::Laboratory => &[Workspace::IncompleteRecords],
        }
    }
}

/// A sidebar menu entry; each maps to one resource browser instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workspace {
    Patients,
    Appointments,
    BookAppointment,
    Staff,
    Billing,
    Report,
    IncompleteRecords,
    PastRecords,
}

impl Workspace {
    pub fn label(&self) -> &'static str {
        match self {
            Workspace::Patients => "Patients",
            Workspace::Appointments => "Appointments",
            Workspace::BookAppointment => "Book Appointment",
            Workspace::Staff => "Staff",
            Workspace::Billing => "Billing",
            Workspace::Report => "Report",
            Workspace::IncompleteRecords => "Incomplete Records",
            Workspace::PastRecords => "Past Records",
        }
    }
}

impl Role {
    /// Total mapping from role to dashboard; every role renders
    /// something
    pub fn dashboard(&self) -> Dashboard {
        match self {
            Role::Receptionist => Dashboard::Reception,
            Role::Nurse => Dashboard::Triage,
            Role::Manager => Dashboard::Administration,
            Role::Doctor => Dashboard::Consultation,
            Role::Pharmacist => Dashboard::Pharmacy,
            Role::Technician => Dashboard::Laboratory,
        }
    }
}

/// Authentication state of the client
#[derive(Debug, Clone, PartialEq)]
pub enum RouterState {
    Unauthenticated,
    Authenticated(Session),
}

/// Session-derived router selecting the mounted dashboard
#[derive(Debug)]
pub struct RoleRouter {
    store: SessionStore,
    state: RouterState,
}

impl RoleRouter {
    /// Determine the initial state synchronously from the stored
    /// session
    pub fn new(store: SessionStore) -> Self {
        let state = match store.get() {
            Some(session) => {
                info!(staff_id = session.id, role = %session.role, "Restored session");
                RouterState::Authenticated(session)
            }
            None => RouterState::Unauthenticated,
        };
        Self { store, state }
    }

    pub fn state(&self) -> &RouterState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            RouterState::Authenticated(session) => Some(session),
            RouterState::Unauthenticated => None,
        }
    }

    /// The dashboard to mount, or `None` when the login screen shows
    pub fn dashboard(&self) -> Option<Dashboard> {
        self.session().map(|s| s.role.dashboard())
    }

    /// Transition after a successful login response has been persisted
    pub fn login(&mut self, session: Session) {
        info!(staff_id = session.id, role = %session.role, "Authenticated");
        self.state = RouterState::Authenticated(session);
    }

    /// Explicit logout: clear the stored session and drop to the login
    /// screen
    pub fn logout(&mut self) {
        info!("Logging out");
        self.store.clear();
        self.state = RouterState::Unauthenticated;
    }

    /// Re-check the stored session; an invalid or missing blob forces
    /// the router back to `Unauthenticated`
    pub fn revalidate(&mut self) {
        match self.store.get() {
            Some(session) => self.state = RouterState::Authenticated(session),
            None => self.state = RouterState::Unauthenticated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::at(dir.path().join("session.json"))
    }

    fn session(role: Role) -> Session {
        Session {
            id: 1,
            display_name: "Test User".to_string(),
            role,
        }
    }

    #[test]
    fn starts_unauthenticated_without_a_stored_session() {
        let dir = tempdir().unwrap();
        let router = RoleRouter::new(store_in(&dir));
        assert_eq!(*router.state(), RouterState::Unauthenticated);
        assert!(router.dashboard().is_none());
    }

    #[test]
    fn restores_a_stored_session_at_mount() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.set(&session(Role::Manager)).unwrap();

        let router = RoleRouter::new(store);
        assert_eq!(router.dashboard(), Some(Dashboard::Administration));
    }

    #[test]
    fn every_role_maps_to_a_dashboard() {
        let roles = [
            Role::Receptionist,
            Role::Nurse,
            Role::Manager,
            Role::Doctor,
            Role::Pharmacist,
            Role::Technician,
        ];
        for role in roles {
            // Exhaustive match means this cannot panic; the assertion
            // documents that every dashboard has at least one workspace
            assert!(!role.dashboard().workspaces().is_empty());
        }
    }

    #[test]
    fn corrupt_stored_session_routes_to_login() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"id":1,"displayName":"X","role":"SUPERUSER"}"#).unwrap();

        let router = RoleRouter::new(SessionStore::at(&path));
        assert_eq!(*router.state(), RouterState::Unauthenticated);
    }

    #[test]
    fn logout_clears_the_store() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.set(&session(Role::Nurse)).unwrap();

        let mut router = RoleRouter::new(store_in(&dir));
        assert!(router.session().is_some());

        router.logout();
        assert_eq!(*router.state(), RouterState::Unauthenticated);
        assert!(store_in(&dir).get().is_none());
    }

    #[test]
    fn revalidate_detects_an_externally_removed_session() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.set(&session(Role::Doctor)).unwrap();

        let mut router = RoleRouter::new(store_in(&dir));
        store.clear();
        router.revalidate();
        assert_eq!(*router.state(), RouterState::Unauthenticated);
    }
}

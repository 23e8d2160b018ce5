//! Clinic Staff Core Library
//!
//! This crate provides the core functionality for the clinic staff
//! client, including:
//! - Session persistence and the role-based dashboard router
//! - A generic paginated, date-filtered, searchable resource browser
//! - Identifier classification (email / phone / national id / username)
//! - Date period resolution (today / week / month / year / custom)
//! - Form validation and the user notification layer
//! - The REST API client for the clinic backend

pub mod api;
pub mod auth;
pub mod browser;
pub mod config;
pub mod daterange;
pub mod error;
pub mod identifier;
pub mod notify;
pub mod resources;
pub mod router;
pub mod session;
pub mod validate;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::browser::{BrowserBody, ResourceBrowser, ResourcePage, ResourceQuery};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::notify::{Notification, Notifier};
    pub use crate::router::{Dashboard, RoleRouter, RouterState};
    pub use crate::session::{Role, Session, SessionStore};
}

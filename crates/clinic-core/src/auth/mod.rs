//! Login and logout flow
//!
//! Shapes the free-form identifier into the credential field the
//! backend expects, authenticates, and persists the returned session.
//! Failure messages from the server are shown to the user verbatim.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::types::Credentials;
use crate::api::AuthGateway;
use crate::error::Error;
use crate::identifier::{classify_search, IdentifierKind};
use crate::notify::Notifier;
use crate::session::{Session, SessionStore};
use crate::validate::validate_required;

/// Login service wired between the login form, the backend and the
/// session store
pub struct AuthService {
    gateway: Arc<dyn AuthGateway>,
    store: SessionStore,
    notifier: Notifier,
    default_region: String,
}

impl AuthService {
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        store: SessionStore,
        notifier: Notifier,
        default_region: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            store,
            notifier,
            default_region: default_region.into(),
        }
    }

    /// Build credentials from a classified identifier
    ///
    /// Login identifiers are email, phone or username - a national id
    /// is never a login credential, so search-context classification
    /// applies.
    pub fn credentials(&self, identifier: &str, password: &str) -> Credentials {
        let identifier = identifier.trim().to_string();
        let mut credentials = Credentials {
            password: password.trim().to_string(),
            ..Default::default()
        };

        match classify_search(&identifier, &self.default_region) {
            IdentifierKind::Email => credentials.email = Some(identifier),
            IdentifierKind::Phone => credentials.phone = Some(identifier),
            _ => credentials.username = Some(identifier),
        }

        credentials
    }

    /// Attempt a login; returns the session on success
    ///
    /// Every failure path produces exactly one notification: a blank
    /// field short-circuits before any request, and server rejections
    /// surface their message verbatim.
    pub async fn login(&self, identifier: &str, password: &str) -> Option<Session> {
        let fields = [
            ("your account details", identifier),
            ("your account details", password),
        ];
        if let Err(e) = validate_required(&fields) {
            self.notifier.push(e.notification());
            return None;
        }

        let credentials = self.credentials(identifier, password);

        match self.gateway.authenticate(&credentials).await {
            Ok(session) => {
                if let Err(e) = self.store.set(&session) {
                    // The login itself succeeded; a persistence failure
                    // only costs the user the next restart
                    warn!(error = %e, "Failed to persist session");
                }
                info!(staff_id = session.id, role = %session.role, "Login successful");
                self.notifier.success("Login successful!");
                Some(session)
            }
            Err(e @ Error::Api(_)) => {
                // Server-reported rejection, message shown verbatim
                self.notifier.push(e.notification());
                None
            }
            Err(Error::NotFound(_)) => {
                self.notifier.error("Account not found");
                None
            }
            Err(e) => {
                warn!(code = e.code(), error = %e, "Authentication request failed");
                self.notifier.push(e.notification());
                None
            }
        }
    }

    /// Log out: the stored session is destroyed
    pub fn logout(&self) {
        self.store.clear();
        info!("Session cleared");
    }
}

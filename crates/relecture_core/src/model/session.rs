//! Signed-in user identity.
//!
//! The session is read before every storage operation and handed down as a
//! plain value. There is no process-wide "current user".

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of the user owning entries and links.
pub type UserId = Uuid;

/// Result of the backend "get current user" call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    /// Used as the recipient of security alerts.
    pub email: Option<String>,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Source of the signed-in session.
///
/// Returns `None` when nobody is signed in.
pub trait SessionProvider {
    fn current_session(&self) -> Option<Session>;
}

/// Session provider that always answers with the same value.
///
/// Used by the CLI (user passed on the command line) and by tests.
#[derive(Debug, Clone, Default)]
pub struct FixedSessionProvider {
    session: Option<Session>,
}

impl FixedSessionProvider {
    pub fn signed_in(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    pub fn signed_out() -> Self {
        Self { session: None }
    }
}

impl SessionProvider for FixedSessionProvider {
    fn current_session(&self) -> Option<Session> {
        self.session.clone()
    }
}

//! Who is using this device, and for which couple.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SyncError, SyncResult};
use crate::local::LocalStore;

/// Which side of the couple this device belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Shares availability; the only role allowed to edit days.
    Girlfriend,
    /// Plans surprises; read-only view.
    Boyfriend,
}

impl Role {
    pub fn can_edit(&self) -> bool {
        matches!(self, Role::Girlfriend)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Role::Girlfriend => "My Availability",
            Role::Boyfriend => "Planning Mode",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::Girlfriend => write!(f, "shares availability"),
            Role::Boyfriend => write!(f, "plans surprises"),
        }
    }
}

/// Active role and couple key pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub role: Role,
    pub couple_key: String,
}

impl Session {
    /// Trims the couple key; an empty key is rejected.
    pub fn new(role: Role, couple_key: &str) -> SyncResult<Self> {
        let couple_key = couple_key.trim();
        if couple_key.is_empty() {
            return Err(SyncError::EmptyCoupleKey);
        }
        Ok(Session {
            role,
            couple_key: couple_key.to_string(),
        })
    }
}

/// Reads and writes the session slot of the local store.
#[derive(Clone)]
pub struct SessionManager {
    store: LocalStore,
}

impl SessionManager {
    pub fn new(store: LocalStore) -> Self {
        SessionManager { store }
    }

    pub fn current(&self) -> Option<Session> {
        self.store.load_session()
    }

    pub fn login(&self, role: Role, couple_key: &str) -> SyncResult<Session> {
        let session = Session::new(role, couple_key)?;
        self.store.save_session(&session)?;
        info!(role = ?session.role, "logged in");
        Ok(session)
    }

    /// Clears the session only. Schedule documents stay where they are.
    pub fn logout(&self) -> SyncResult<()> {
        self.store.clear_session()?;
        info!("logged out");
        Ok(())
    }
}

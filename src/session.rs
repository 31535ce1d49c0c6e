//! Impersonation flag kept in the request session.

use crate::provider::SessionStore;

/// Session key holding the impersonated user id.
pub const IMPERSONATION_KEY: &str = "_nexus_impersonate";

/// Toggles the impersonation flag on a session.
pub struct Impersonation<'a> {
    session: &'a dyn SessionStore,
}

impl<'a> Impersonation<'a> {
    /// Wrap the request session.
    pub fn new(session: &'a dyn SessionStore) -> Self {
        Self { session }
    }

    /// Start acting as `user_id`.
    pub fn impersonate(&self, user_id: u64) {
        self.session.put(IMPERSONATION_KEY, serde_json::Value::from(user_id));
    }

    /// Stop acting as another user.
    pub fn stop_impersonating(&self) {
        self.session.forget(IMPERSONATION_KEY);
    }

    /// Whether an impersonation is active.
    pub fn is_impersonating(&self) -> bool {
        self.session.has(IMPERSONATION_KEY)
    }
}

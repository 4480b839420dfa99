//! Current viewer identity.

use parking_lot::RwLock;
use uuid::Uuid;

/// Source of the signed-in viewer, read synchronously by every operation
/// that needs one.
pub trait IdentityProvider: Send + Sync {
    fn current_viewer(&self) -> Option<Uuid>;
}

/// Session-backed identity updated on sign in / sign out
#[derive(Debug, Default)]
pub struct SessionIdentity {
    viewer: RwLock<Option<Uuid>>,
}

impl SessionIdentity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: Uuid) -> Self {
        Self {
            viewer: RwLock::new(Some(user_id)),
        }
    }

    pub fn sign_in(&self, user_id: Uuid) {
        *self.viewer.write() = Some(user_id);
    }

    pub fn sign_out(&self) {
        *self.viewer.write() = None;
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_viewer(&self) -> Option<Uuid> {
        *self.viewer.read()
    }
}

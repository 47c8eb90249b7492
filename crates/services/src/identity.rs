//! Minimal `IdentityProvider` implementations. The real identity stack is a
//! black box behind the port; these cover wiring and tests.

use domains::models::Identity;
use domains::ports::IdentityProvider;

/// An identity fixed at construction time, or none at all.
#[derive(Debug, Clone, Default)]
pub struct FixedIdentity {
    identity: Option<Identity>,
}

impl FixedIdentity {
    pub fn signed_in(display_name: impl Into<String>) -> Self {
        Self {
            identity: Some(Identity {
                display_name: display_name.into(),
            }),
        }
    }

    pub fn signed_out() -> Self {
        Self { identity: None }
    }
}

impl IdentityProvider for FixedIdentity {
    fn current_identity(&self) -> Option<Identity> {
        self.identity.clone()
    }
}

//! Resources: leaf payload objects of the staged package.

use crate::entity::{IdentityState, impl_deposit_entity};

/// A leaf payload object carried by the deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    identity: IdentityState,
}

impl_deposit_entity!(Resource);

impl Resource {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            identity: IdentityState::new(uri),
        }
    }
}

use crate::types::{ConnectionId, Identity, PresenceSet};
use thiserror::Error;

/// Why a claim was turned down. Both variants reach the client as
/// `invalid-username` so it can prompt again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("display name is empty")]
    EmptyName,
    #[error("display name {0:?} is already taken")]
    DuplicateName(Identity),
}

/// Live connection to display name bindings, kept in join order.
///
/// No two connections ever hold the same identity. A connection holds at
/// most one identity; claiming again renames it in place.
pub struct IdentityRegistry {
    bindings: Vec<(ConnectionId, Identity)>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    pub fn claim(
        &mut self,
        connection_id: ConnectionId,
        proposed: &str,
    ) -> Result<Identity, ClaimError> {
        let identity = Identity::parse(proposed).ok_or(ClaimError::EmptyName)?;

        if self
            .bindings
            .iter()
            .any(|(holder, bound)| *holder != connection_id && *bound == identity)
        {
            return Err(ClaimError::DuplicateName(identity));
        }

        match self
            .bindings
            .iter_mut()
            .find(|(holder, _)| *holder == connection_id)
        {
            Some((_, bound)) => {
                log::debug!("Connection {} renamed {} -> {}", connection_id, bound, identity);
                *bound = identity.clone();
            }
            None => self.bindings.push((connection_id, identity.clone())),
        }
        Ok(identity)
    }

    /// Unbinds whatever the connection held. Releasing twice is a no-op.
    pub fn release(&mut self, connection_id: &ConnectionId) -> Option<Identity> {
        let index = self
            .bindings
            .iter()
            .position(|(holder, _)| holder == connection_id)?;
        Some(self.bindings.remove(index).1)
    }

    pub fn lookup(&self, connection_id: &ConnectionId) -> Option<&Identity> {
        self.bindings
            .iter()
            .find(|(holder, _)| holder == connection_id)
            .map(|(_, identity)| identity)
    }

    pub fn presence(&self) -> PresenceSet {
        self.bindings
            .iter()
            .map(|(_, identity)| identity.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

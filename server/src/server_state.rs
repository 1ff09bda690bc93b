use std::collections::HashMap;
use std::num::Wrapping;
use system::{ConnectionId, IdentityRegistry, SessionState};

/// Where a connection is in its life. `Closed` is terminal and never stored:
/// closing removes the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    AwaitingIdentity,
    Active,
    Closed,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ServerError {
    UnknownConnection(ConnectionId),
    InvalidTransition {
        from: ConnectionState,
        to: ConnectionState,
    },
}

pub struct ServerState {
    pub connection_id_source: Wrapping<ConnectionId>,
    pub connection_states: HashMap<ConnectionId, ConnectionState>,
    pub registry: IdentityRegistry,
    pub session: SessionState,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            connection_id_source: Wrapping(0),
            connection_states: HashMap::new(),
            registry: IdentityRegistry::new(),
            session: SessionState::new(),
        }
    }

    pub fn create_connection(&mut self) -> ConnectionId {
        let connection_id = self.new_connection_id();
        self.connection_states
            .insert(connection_id, ConnectionState::Connecting);
        connection_id
    }

    pub fn state_of(&self, connection_id: &ConnectionId) -> Option<ConnectionState> {
        self.connection_states.get(connection_id).copied()
    }

    pub fn complete_handshake(&mut self, connection_id: &ConnectionId) -> Result<(), ServerError> {
        self.transition(
            connection_id,
            ConnectionState::Connecting,
            ConnectionState::AwaitingIdentity,
        )
    }

    pub fn activate(&mut self, connection_id: &ConnectionId) -> Result<(), ServerError> {
        self.transition(
            connection_id,
            ConnectionState::AwaitingIdentity,
            ConnectionState::Active,
        )
    }

    /// Drops the connection and returns the state it was in.
    pub fn close(&mut self, connection_id: &ConnectionId) -> Option<ConnectionState> {
        self.connection_states.remove(connection_id)
    }

    pub fn connection_count(&self) -> usize {
        self.connection_states.len()
    }

    fn transition(
        &mut self,
        connection_id: &ConnectionId,
        from: ConnectionState,
        to: ConnectionState,
    ) -> Result<(), ServerError> {
        let state = self
            .connection_states
            .get_mut(connection_id)
            .ok_or(ServerError::UnknownConnection(*connection_id))?;
        if *state != from {
            return Err(ServerError::InvalidTransition { from: *state, to });
        }
        *state = to;
        Ok(())
    }

    // Skips ids still held by a live connection after the counter wraps.
    fn new_connection_id(&mut self) -> ConnectionId {
        loop {
            self.connection_id_source += Wrapping(1);
            let candidate = self.connection_id_source.0;
            if !self.connection_states.contains_key(&candidate) {
                break candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_starts_without_connections() {
        let state = ServerState::default();
        assert_eq!(state.connection_count(), 0);
        assert!(state.registry.is_empty());
        assert_eq!(state.session.snapshot(), system::SessionSnapshot::default());
    }

    #[test]
    fn it_walks_the_lifecycle() {
        let mut state = ServerState::new();
        let connection_id = state.create_connection();
        assert_eq!(
            state.state_of(&connection_id),
            Some(ConnectionState::Connecting)
        );

        assert_eq!(
            state.activate(&connection_id),
            Err(ServerError::InvalidTransition {
                from: ConnectionState::Connecting,
                to: ConnectionState::Active,
            })
        );

        state.complete_handshake(&connection_id).expect("");
        state.activate(&connection_id).expect("");
        assert_eq!(state.state_of(&connection_id), Some(ConnectionState::Active));

        assert_eq!(state.close(&connection_id), Some(ConnectionState::Active));
        assert_eq!(state.close(&connection_id), None);
        assert_eq!(
            state.complete_handshake(&connection_id),
            Err(ServerError::UnknownConnection(connection_id))
        );
    }

    #[test]
    fn it_skips_live_ids_after_wrapping() {
        let mut state = ServerState::new();
        let first = state.create_connection();
        state.connection_id_source = Wrapping(ConnectionId::MAX);
        let next = state.create_connection();
        assert_eq!(next, 0);
        let after = state.create_connection();
        assert_ne!(after, first);
    }
}

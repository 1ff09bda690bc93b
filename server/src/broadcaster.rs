use crate::connection::ConnectionEvent;
use crate::connection_tx_storage::ConnectionTx;
use system::{ConnectionId, ServerEvent};

/// Outbound fan-out. Best effort: nothing is acknowledged and an event for a
/// peer that went away is dropped.
///
/// The audience of `send_to_all*` is every subscribed connection, in
/// subscription order. Attached but unsubscribed connections receive direct
/// sends and `send_to_every_connection`.
pub trait Broadcaster {
    fn attach(&mut self, connection_id: ConnectionId, tx: ConnectionTx);

    /// Forgets the connection, subscribed or not.
    fn detach(&mut self, connection_id: &ConnectionId);

    fn subscribe(&mut self, connection_id: &ConnectionId);

    fn audience(&self) -> Vec<ConnectionId>;

    /// Every attached connection, subscribed or not.
    fn connections(&self) -> Vec<ConnectionId>;

    fn send_to(&mut self, to: &ConnectionId, event: ConnectionEvent);

    fn send_to_all(&mut self, event: &ServerEvent) {
        for connection_id in self.audience() {
            self.send_to(&connection_id, ConnectionEvent::Event(event.clone()));
        }
    }

    fn send_to_all_except(&mut self, sender: &ConnectionId, event: &ServerEvent) {
        for connection_id in self.audience() {
            if connection_id != *sender {
                self.send_to(&connection_id, ConnectionEvent::Event(event.clone()));
            }
        }
    }

    fn send_to_every_connection(&mut self, event: &ServerEvent) {
        for connection_id in self.connections() {
            self.send_to(&connection_id, ConnectionEvent::Event(event.clone()));
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Keeps every delivery in memory instead of writing to sockets.
    #[derive(Default)]
    pub struct RecordingBroadcaster {
        pub attached: Vec<ConnectionId>,
        pub subscribed: Vec<ConnectionId>,
        pub sent: Vec<(ConnectionId, ConnectionEvent)>,
    }

    impl RecordingBroadcaster {
        /// Server events delivered to `to`, oldest first.
        pub fn received(&self, to: ConnectionId) -> Vec<ServerEvent> {
            self.sent
                .iter()
                .filter(|(c, _)| *c == to)
                .filter_map(|(_, e)| match e {
                    ConnectionEvent::Event(event) => Some(event.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn clear(&mut self) {
            self.sent.clear();
        }
    }

    impl Broadcaster for RecordingBroadcaster {
        fn attach(&mut self, connection_id: ConnectionId, _tx: ConnectionTx) {
            self.attached.push(connection_id);
        }

        fn detach(&mut self, connection_id: &ConnectionId) {
            self.attached.retain(|c| c != connection_id);
            self.subscribed.retain(|c| c != connection_id);
        }

        fn subscribe(&mut self, connection_id: &ConnectionId) {
            if !self.subscribed.contains(connection_id) {
                self.subscribed.push(*connection_id);
            }
        }

        fn audience(&self) -> Vec<ConnectionId> {
            self.subscribed.clone()
        }

        fn connections(&self) -> Vec<ConnectionId> {
            self.attached.clone()
        }

        fn send_to(&mut self, to: &ConnectionId, event: ConnectionEvent) {
            if self.attached.contains(to) {
                self.sent.push((*to, event));
            }
        }
    }
}

use crate::broadcaster::Broadcaster;
use crate::connection::ConnectionEvent;
use std::collections::HashMap;
use system::ConnectionId;

pub type ConnectionTx = tokio::sync::mpsc::UnboundedSender<ConnectionEvent>;

/// Egress channels of every open websocket.
pub struct ConnectionTxStorage {
    connection_txs: HashMap<ConnectionId, ConnectionTx>,
    subscribers: Vec<ConnectionId>,
}

impl ConnectionTxStorage {
    pub fn new() -> Self {
        Self {
            connection_txs: HashMap::new(),
            subscribers: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.connection_txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connection_txs.is_empty()
    }
}

impl Default for ConnectionTxStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Broadcaster for ConnectionTxStorage {
    fn attach(&mut self, connection_id: ConnectionId, tx: ConnectionTx) {
        self.connection_txs.insert(connection_id, tx);
    }

    fn detach(&mut self, connection_id: &ConnectionId) {
        self.connection_txs.remove(connection_id);
        self.subscribers.retain(|c| c != connection_id);
    }

    fn subscribe(&mut self, connection_id: &ConnectionId) {
        if self.connection_txs.contains_key(connection_id)
            && !self.subscribers.contains(connection_id)
        {
            self.subscribers.push(*connection_id);
        }
    }

    fn audience(&self) -> Vec<ConnectionId> {
        self.subscribers.clone()
    }

    fn connections(&self) -> Vec<ConnectionId> {
        let mut connection_ids: Vec<_> = self.connection_txs.keys().copied().collect();
        connection_ids.sort_unstable();
        connection_ids
    }

    fn send_to(&mut self, to: &ConnectionId, event: ConnectionEvent) {
        if let Some(tx) = self.connection_txs.get(to) {
            if tx.send(event).is_err() {
                log::debug!("Connection {} is gone, dropping event", to);
            }
        } else {
            log::warn!("No egress channel for connection {}", to);
        }
    }
}

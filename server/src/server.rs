use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use system::{ConnectionId, ServerEvent};

use super::connection::{ConnectionCommand, ConnectionEvent};
use crate::admin::{AdminCommand, SessionSummary};
use crate::broadcaster::Broadcaster;
use crate::config::ServerConfig;
use crate::connection_tx_storage::{ConnectionTx, ConnectionTxStorage};
use crate::presence;
use crate::router::{Router, Routing};
use crate::server_state::{ConnectionState, ServerState};

pub type ServerTx = UnboundedSender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    Connection(ConnectionCommand),
    AdminCommand(AdminCommand),
}

/// Owns all session state. Every command runs to completion before the next
/// one starts, so there is no locking anywhere below this type.
pub struct Server<B> {
    server_state: ServerState,
    router: Router,
    broadcaster: B,
}

impl<B: Broadcaster> Server<B> {
    pub fn new(config: &ServerConfig, broadcaster: B) -> Self {
        Self {
            server_state: ServerState::new(),
            router: Router::new(config.unclaimed_policy),
            broadcaster,
        }
    }

    pub fn handle_server_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::Connection(command) => self.handle_connection_command(command),
            ServerCommand::AdminCommand(AdminCommand::GetSessionSummary { tx }) => {
                if tx.send(self.summary()).is_err() {
                    log::debug!("Admin request went away before the reply");
                }
            }
        }
    }

    fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx } => {
                self.connect(tx);
            }
            ConnectionCommand::Disconnect { from } => self.disconnect(&from),
            ConnectionCommand::ClientEvent { from, event } => match event {
                system::ClientEvent::NewUser(proposed) => self.claim_identity(&from, proposed),
                event => {
                    let routing = self.router.route(
                        &mut self.server_state,
                        &mut self.broadcaster,
                        &from,
                        event,
                    );
                    if routing != Routing::Relayed {
                        log::debug!("Event from connection {} not relayed: {:?}", from, routing);
                    }
                }
            },
        }
    }

    fn connect(&mut self, tx: ConnectionTx) -> ConnectionId {
        let connection_id = self.server_state.create_connection();
        self.broadcaster.attach(connection_id, tx);
        self.broadcaster
            .send_to(&connection_id, ConnectionEvent::Connected { connection_id });
        if let Err(err) = self.server_state.complete_handshake(&connection_id) {
            log::error!("Handshake of connection {} failed: {:?}", connection_id, err);
        }
        self.broadcaster.send_to(
            &connection_id,
            ConnectionEvent::Event(ServerEvent::UserId(connection_id)),
        );
        log::info!("New connection: {}", connection_id);
        connection_id
    }

    fn claim_identity(&mut self, from: &ConnectionId, proposed: Option<String>) {
        let lifecycle = match self.server_state.state_of(from) {
            Some(state @ ConnectionState::AwaitingIdentity)
            | Some(state @ ConnectionState::Active) => state,
            other => {
                log::warn!("Identity claim from connection {} in state {:?}", from, other);
                return;
            }
        };

        let previous = self.server_state.registry.lookup(from).cloned();
        match self
            .server_state
            .registry
            .claim(*from, proposed.as_deref().unwrap_or_default())
        {
            Ok(identity) => {
                if lifecycle == ConnectionState::AwaitingIdentity {
                    if let Err(err) = self.server_state.activate(from) {
                        log::error!("Cannot activate connection {}: {:?}", from, err);
                        return;
                    }
                    log::info!("Connection {} joined as {}", from, identity);
                    self.broadcaster.subscribe(from);
                    self.replay_snapshot(from);
                    self.broadcaster
                        .send_to_all_except(from, &ServerEvent::UserConnected(identity));
                } else if previous.as_ref() == Some(&identity) {
                    return;
                } else {
                    log::info!("Connection {} is now known as {}", from, identity);
                }
                presence::publish(&self.server_state.registry, &mut self.broadcaster);
            }
            Err(err) => {
                log::info!("Connection {} claim rejected: {}", from, err);
                self.broadcaster
                    .send_to(from, ConnectionEvent::Event(ServerEvent::InvalidUsername));
            }
        }
    }

    /// Replays everything since the last clear to `to` alone.
    fn replay_snapshot(&mut self, to: &ConnectionId) {
        let snapshot = self.server_state.session.snapshot();
        log::debug!(
            "Replaying {} strokes, {} texts, {} chats to connection {}",
            snapshot.strokes.len(),
            snapshot.texts.len(),
            snapshot.chats.len(),
            to
        );
        let events = snapshot
            .strokes
            .into_iter()
            .map(ServerEvent::Draw)
            .chain(snapshot.texts.into_iter().map(ServerEvent::Text))
            .chain(snapshot.chats.into_iter().map(ServerEvent::ChatMessage));
        for event in events {
            self.broadcaster.send_to(to, ConnectionEvent::Event(event));
        }
    }

    fn disconnect(&mut self, from: &ConnectionId) {
        let previous = match self.server_state.close(from) {
            Some(state) => state,
            None => {
                log::debug!("Connection {} already closed", from);
                return;
            }
        };
        log::info!(
            "Connection {} disconnected: {:?} -> {:?}",
            from,
            previous,
            ConnectionState::Closed
        );

        self.broadcaster.detach(from);
        let released = self.server_state.registry.release(from);
        // Not replayed later, so connections still awaiting an identity get it too.
        self.broadcaster
            .send_to_every_connection(&ServerEvent::UserDisconnected(released.clone()));
        if released.is_some() {
            presence::publish(&self.server_state.registry, &mut self.broadcaster);
        }
    }

    fn summary(&self) -> SessionSummary {
        let counts = self.server_state.session.counts();
        SessionSummary {
            online_users: self.server_state.registry.presence(),
            connections: self.server_state.connection_count(),
            strokes: counts.strokes,
            texts: counts.texts,
            chats: counts.chats,
        }
    }
}

pub fn spawn_server(config: &ServerConfig) -> ServerTx {
    let (srv_tx, mut srv_rx) = unbounded_channel::<ServerCommand>();
    let mut server = Server::new(config, ConnectionTxStorage::new());

    tokio::spawn(async move {
        while let Some(command) = srv_rx.recv().await {
            server.handle_server_command(command);
        }
        log::info!("Server task terminated");
    });

    srv_tx
}

use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;

use system::{ClientEvent, ConnectionId, ServerEvent};

use crate::connection_tx_storage::ConnectionTx;
use crate::server::{ServerCommand, ServerTx};

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        tx: ConnectionTx,
    },
    Disconnect {
        from: ConnectionId,
    },
    ClientEvent {
        from: ConnectionId,
        event: ClientEvent,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// Control message telling the socket its id. Never written to the wire.
    Connected {
        connection_id: ConnectionId,
    },
    Event(ServerEvent),
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

enum ConnectionState {
    Idle,
    Connected(ConnectionId),
}

struct ConnectionActor {
    state: ConnectionState,
    srv_tx: ServerTx,
    /// Dropped when the actor stops, which wakes the egress forwarder.
    stopped_tx: Option<oneshot::Sender<()>>,
}

impl ConnectionActor {
    fn send_command(&self, command: ConnectionCommand) -> bool {
        if self
            .srv_tx
            .send(ServerCommand::Connection(command))
            .is_err()
        {
            log::error!("Server task is gone");
            false
        } else {
            true
        }
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<ConnectionEvent>();

        if !self.send_command(ConnectionCommand::Connect { tx }) {
            ctx.stop();
            return;
        }

        let addr = ctx.address().recipient();
        let (stopped_tx, stopped_rx) = oneshot::channel();
        self.stopped_tx = Some(stopped_tx);
        let srv_tx = self.srv_tx.clone();

        tokio::spawn(async move {
            log::debug!("connection green thread - started");
            forward_egress(rx, stopped_rx, srv_tx, move |msg| {
                addr.do_send(ConnectionActorMessage(msg)).is_ok()
            })
            .await;
            log::debug!("connection green thread - terminated");
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.stopped_tx.take();
        Running::Stop
    }
}

/// Hands egress to the actor through `deliver` until either side goes away.
///
/// The actor can stop before its `Connected` message reaches it, so it cannot
/// always name itself to the server. This task sees every egress message, so
/// it reports the disconnect once the actor is gone and the id is known. The
/// server dropping its end means the connection was already forgotten.
async fn forward_egress<F>(
    mut rx: UnboundedReceiver<ConnectionEvent>,
    mut stopped_rx: oneshot::Receiver<()>,
    srv_tx: ServerTx,
    mut deliver: F,
) where
    F: FnMut(ConnectionEvent) -> bool,
{
    let mut connection_id = None;
    let mut actor_alive = true;

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(msg) => {
                    if let ConnectionEvent::Connected { connection_id: id } = msg {
                        connection_id = Some(id);
                    }
                    if actor_alive && !deliver(msg) {
                        actor_alive = false;
                    }
                }
                None => return,
            },
            _ = &mut stopped_rx, if actor_alive => actor_alive = false,
        }

        if let (false, Some(from)) = (actor_alive, connection_id) {
            let command = ServerCommand::Connection(ConnectionCommand::Disconnect { from });
            if srv_tx.send(command).is_err() {
                log::error!("Server task is gone");
            }
            return;
        }
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => {
                log::debug!("Ingress size: {}", text.len());
                if let ConnectionState::Connected(from) = self.state {
                    match ClientEvent::decode(&text) {
                        Ok(event) => {
                            log::debug!("Ingress {:?}", event);
                            self.send_command(ConnectionCommand::ClientEvent { from, event });
                        }
                        Err(err) => log::warn!("Connection {} sent {}", from, err),
                    }
                } else {
                    log::warn!("Dropping frame received before handshake");
                }
            }
            Ok(ws::Message::Binary(bin)) => {
                log::warn!("Ignoring binary frame of {} bytes", bin.len());
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(err) => {
                log::warn!("Websocket protocol error: {}", err);
                ctx.stop();
            }
            _ => (),
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        match msg.0 {
            ConnectionEvent::Connected { connection_id } => {
                self.state = ConnectionState::Connected(connection_id);
            }
            ConnectionEvent::Event(event) => match event.encode() {
                Ok(frame) => {
                    log::debug!("Egress {}", event.name());
                    ctx.text(frame);
                }
                Err(err) => log::error!("Cannot encode {}: {}", event.name(), err),
            },
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
) -> Result<HttpResponse, Error> {
    ws::start(
        ConnectionActor {
            srv_tx: srv_tx.get_ref().clone(),
            state: ConnectionState::Idle,
            stopped_tx: None,
        },
        &req,
        stream,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn is_disconnect_of(command: Option<ServerCommand>, id: ConnectionId) -> bool {
        match command {
            Some(ServerCommand::Connection(ConnectionCommand::Disconnect { from })) => from == id,
            _ => false,
        }
    }

    #[tokio::test]
    async fn it_reports_disconnect_when_socket_closes_before_handshake() {
        let (tx, rx) = unbounded_channel();
        let (stopped_tx, stopped_rx) = oneshot::channel::<()>();
        let (srv_tx, mut srv_rx) = unbounded_channel();

        drop(stopped_tx);
        tx.send(ConnectionEvent::Connected { connection_id: 7 })
            .expect("");
        forward_egress(rx, stopped_rx, srv_tx, |_| true).await;

        assert!(is_disconnect_of(srv_rx.recv().await, 7));
        assert!(srv_rx.recv().await.is_none());
        drop(tx);
    }

    #[tokio::test]
    async fn it_reports_disconnect_when_delivery_fails() {
        let (tx, rx) = unbounded_channel();
        let (_stopped_tx, stopped_rx) = oneshot::channel::<()>();
        let (srv_tx, mut srv_rx) = unbounded_channel();

        tx.send(ConnectionEvent::Connected { connection_id: 3 })
            .expect("");
        forward_egress(rx, stopped_rx, srv_tx, |_| false).await;

        assert!(is_disconnect_of(srv_rx.recv().await, 3));
        assert!(srv_rx.recv().await.is_none());
        drop(tx);
    }

    #[tokio::test]
    async fn it_stays_quiet_when_server_forgets_the_connection() {
        let (tx, rx) = unbounded_channel();
        let (_stopped_tx, stopped_rx) = oneshot::channel::<()>();
        let (srv_tx, mut srv_rx) = unbounded_channel();

        tx.send(ConnectionEvent::Connected { connection_id: 1 })
            .expect("");
        tx.send(ConnectionEvent::Event(ServerEvent::UserId(1)))
            .expect("");
        drop(tx);

        let mut delivered = Vec::new();
        forward_egress(rx, stopped_rx, srv_tx, |msg| {
            delivered.push(msg);
            true
        })
        .await;

        assert_eq!(delivered.len(), 2);
        assert!(srv_rx.recv().await.is_none());
    }
}

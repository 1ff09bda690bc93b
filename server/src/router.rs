use crate::broadcaster::Broadcaster;
use crate::config::UnclaimedPolicy;
use crate::connection::ConnectionEvent;
use crate::server_state::{ConnectionState, ServerState};
use system::{
    ChatMessage, ClearScope, ClientEvent, ConnectionId, Entry, HintEvent, ServerEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    Relayed,
    /// Sender is not an open connection.
    UnknownConnection,
    /// Sender has no identity and the policy refuses such events.
    Unclaimed,
    /// Identity claims belong to the lifecycle, not the router.
    NotRoutable,
}

/// Applies one canvas or chat event to the session and fans it out.
///
/// | event          | session        | audience         |
/// |----------------|----------------|------------------|
/// | draw, text     | appended       | all but sender   |
/// | erase, hint    | untouched      | all but sender   |
/// | chat-message   | appended       | all with sender  |
/// | clear          | strokes, texts | all but sender   |
/// | clear-chat     | chats          | all but sender   |
pub struct Router {
    policy: UnclaimedPolicy,
}

impl Router {
    pub fn new(policy: UnclaimedPolicy) -> Self {
        Self { policy }
    }

    pub fn route<B: Broadcaster>(
        &self,
        state: &mut ServerState,
        broadcaster: &mut B,
        from: &ConnectionId,
        event: ClientEvent,
    ) -> Routing {
        if !event.requires_identity() {
            return Routing::NotRoutable;
        }
        match state.state_of(from) {
            None => {
                log::warn!("Dropping event from unknown connection {}", from);
                return Routing::UnknownConnection;
            }
            Some(ConnectionState::Active) => {}
            Some(_) if self.policy == UnclaimedPolicy::Reject => {
                log::warn!(
                    "Dropping {:?} from connection {} without identity",
                    event,
                    from
                );
                return Routing::Unclaimed;
            }
            Some(_) => {}
        }

        match event {
            ClientEvent::Draw(stroke) => {
                state.session.record(Entry::Stroke(stroke.clone()));
                broadcaster.send_to_all_except(from, &ServerEvent::Draw(stroke));
            }
            ClientEvent::Erase(point) => {
                broadcaster.send_to_all_except(from, &ServerEvent::Erase(point));
            }
            ClientEvent::Text(text) => {
                state.session.record(Entry::Text(text.clone()));
                broadcaster.send_to_all_except(from, &ServerEvent::Text(text));
            }
            ClientEvent::ChatMessage(body) => {
                let message = ChatMessage {
                    author: state.registry.lookup(from).cloned(),
                    body,
                };
                if message.author.is_none() {
                    log::info!("Chat from connection {} has no author", from);
                }
                state.session.record(Entry::Chat(message.clone()));
                let event = ServerEvent::ChatMessage(message);
                broadcaster.send_to_all_except(from, &event);
                // The sender renders its own line only from this echo.
                broadcaster.send_to(from, ConnectionEvent::Event(event));
            }
            ClientEvent::Clear => {
                state.session.clear(ClearScope::Canvas);
                broadcaster.send_to_all_except(from, &ServerEvent::Clear);
            }
            ClientEvent::ClearChat => {
                state.session.clear(ClearScope::Chat);
                broadcaster.send_to_all_except(from, &ServerEvent::ClearChat);
            }
            ClientEvent::Hint(hint) => {
                broadcaster.send_to_all_except(
                    from,
                    &ServerEvent::Hint(HintEvent {
                        connection_id: *from,
                        hint,
                    }),
                );
            }
            ClientEvent::NewUser(_) => return Routing::NotRoutable,
        }
        Routing::Relayed
    }
}

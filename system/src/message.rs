use crate::types::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Events a client may send. Every frame is `{"event": .., "data": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    NewUser(Option<String>),
    Draw(StrokeSegment),
    Erase(ErasePoint),
    Text(TextPlacement),
    ChatMessage(String),
    Clear,
    ClearChat,
    Hint(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    UserId(ConnectionId),
    InvalidUsername,
    UserConnected(Identity),
    UserDisconnected(Option<Identity>),
    OnlineUsers(PresenceSet),
    Draw(StrokeSegment),
    Erase(ErasePoint),
    Text(TextPlacement),
    ChatMessage(ChatMessage),
    Clear,
    ClearChat,
    Hint(HintEvent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintEvent {
    pub connection_id: ConnectionId,
    pub hint: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ClientEvent {
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(frame)?)
    }

    /// Whether this event may only be sent after an identity was claimed.
    pub fn requires_identity(&self) -> bool {
        !matches!(self, ClientEvent::NewUser(_))
    }
}

impl ServerEvent {
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Event name on the wire, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::UserId(_) => "user-id",
            ServerEvent::InvalidUsername => "invalid-username",
            ServerEvent::UserConnected(_) => "user-connected",
            ServerEvent::UserDisconnected(_) => "user-disconnected",
            ServerEvent::OnlineUsers(_) => "online-users",
            ServerEvent::Draw(_) => "draw",
            ServerEvent::Erase(_) => "erase",
            ServerEvent::Text(_) => "text",
            ServerEvent::ChatMessage(_) => "chat-message",
            ServerEvent::Clear => "clear",
            ServerEvent::ClearChat => "clear-chat",
            ServerEvent::Hint(_) => "hint",
        }
    }
}

use serde::Serialize;
use system::PresenceSet;
use tokio::sync::oneshot::Sender;

#[derive(Debug)]
pub enum AdminCommand {
    GetSessionSummary { tx: Sender<SessionSummary> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub online_users: PresenceSet,
    pub connections: usize,
    pub strokes: usize,
    pub texts: usize,
    pub chats: usize,
}

use crate::broadcaster::Broadcaster;
use system::{IdentityRegistry, ServerEvent};

/// Pushes the join-ordered online list to every active connection. Called
/// once per membership change; clients replace their view with it.
pub fn publish<B: Broadcaster>(registry: &IdentityRegistry, broadcaster: &mut B) {
    let presence = registry.presence();
    log::debug!("Publishing presence of {} users", presence.len());
    broadcaster.send_to_all(&ServerEvent::OnlineUsers(presence));
}

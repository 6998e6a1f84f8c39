//! Ports the session layer needs beyond the shared world oracle.

use wayforge_protocol::{ParticipantId, ServiceError};

/// Revokes and restores named capabilities (permissions).
///
/// Optional: without one, the manager still records which capabilities a
/// game *would* revoke, but nothing is actually taken away or given back.
pub trait CapabilityService: Send + Sync + 'static {
    fn has(&self, participant: ParticipantId, name: &str) -> bool;

    fn remove(&self, participant: ParticipantId, name: &str) -> Result<(), ServiceError>;

    fn add(&self, participant: ParticipantId, name: &str) -> Result<(), ServiceError>;
}

/// Runs a rendered reward command on behalf of the server console.
pub trait RewardDispatcher: Send + Sync + 'static {
    fn dispatch(&self, participant: ParticipantId, command: &str) -> Result<(), ServiceError>;
}

/// Fills in a reward command template.
///
/// `{player}` and `%player%` become `name`; a single leading `/` is
/// dropped because console commands are dispatched without one.
pub fn render_reward_command(template: &str, name: &str) -> String {
    let rendered = template.replace("{player}", name).replace("%player%", name);
    match rendered.strip_prefix('/') {
        Some(rest) => rest.to_string(),
        None => rendered,
    }
}

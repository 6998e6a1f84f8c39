//! Error types for the session layer.

use wayforge_protocol::{ParticipantId, ProtocolError, ServiceError};

/// Errors returned by game-session operations.
///
/// Every variant is a rejection with no side effects: when a start fails
/// halfway (capability revocation, teleport), whatever was already done is
/// rolled back before the error is returned.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The mini-game is switched off in configuration.
    #[error("the timed game is disabled")]
    Disabled,

    /// The participant already has a running session.
    #[error("participant {0} is already in a game")]
    AlreadyInGame(ParticipantId),

    /// The participant has no running session.
    #[error("participant {0} has no active game")]
    NoActiveGame(ParticipantId),

    /// The world oracle doesn't know where the participant is.
    #[error("participant {0} is offline")]
    ParticipantOffline(ParticipantId),

    /// The capability service failed while revoking a capability.
    #[error("capability service failed: {0}")]
    Capability(ServiceError),

    /// Moving the participant to the start point failed.
    #[error("teleport to start failed: {0}")]
    Teleport(ServiceError),
}

/// Errors from a [`MarkerStore`](crate::MarkerStore).
///
/// Markers are best-effort, so the manager only ever logs these.
#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    #[error("marker i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("marker encoding failed: {0}")]
    Codec(#[from] ProtocolError),
}

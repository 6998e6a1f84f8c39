//! Error types for the request layer.

use wayforge_protocol::{ParticipantId, ServiceError};

/// Errors returned by request operations.
///
/// Each variant maps to one condition the command layer reports to the
/// caller. Apart from the accept-time failures noted below, a rejected
/// operation leaves the registry untouched.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// A participant tried to send a request to themselves.
    #[error("cannot send a request to yourself")]
    SelfRequest,

    /// The target is not online.
    #[error("participant {0} is offline")]
    TargetOffline(ParticipantId),

    /// The requester left before the target accepted. The request is
    /// consumed.
    #[error("requester {0} is offline")]
    RequesterOffline(ParticipantId),

    /// The target has switched incoming requests off.
    #[error("participant {0} does not accept requests")]
    TargetDisabled(ParticipantId),

    /// The requester can't afford the configured cost. At accept time
    /// the request is consumed.
    #[error("insufficient balance: cost {cost}, balance {balance}")]
    InsufficientBalance { cost: f64, balance: f64 },

    /// The ledger refused the withdrawal. The request is consumed and not
    /// retried.
    #[error("charge failed: {0}")]
    ChargeFailed(ServiceError),

    /// The requester was charged but the teleport itself failed.
    #[error("teleport failed: {0}")]
    TeleportFailed(ServiceError),

    /// The target has no pending request (never sent, or already
    /// resolved or expired).
    #[error("participant {0} has no pending request")]
    NoPendingRequest(ParticipantId),

    /// The requester has nothing to cancel.
    #[error("participant {0} has no outgoing request")]
    NoOutgoingRequest(ParticipantId),

    /// A request for this target is already pending.
    #[error("a request for participant {0} is already pending")]
    AlreadyPending(ParticipantId),
}

//! Unified error type for Wayforge.

use wayforge_protocol::ProtocolError;
use wayforge_request::RequestError;
use wayforge_session::{GameError, MarkerError};

/// Top-level error that wraps all crate-specific errors.
///
/// Hosts using the `wayforge` crate deal with this single type instead of
/// importing errors from each sub-crate. The `#[from]` attributes let `?`
/// convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WayforgeError {
    /// A timed-game error (already in game, no active game, disabled...).
    #[error(transparent)]
    Game(#[from] GameError),

    /// A teleport-request error (no pending request, target offline...).
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Encoding or decoding a persisted record failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session marker couldn't be read.
    #[error(transparent)]
    Marker(#[from] MarkerError),

    /// The configuration document is not valid JSON for [`EngineConfig`](crate::EngineConfig).
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A menu button id that doesn't name any action.
    #[error("unknown menu action: {0}")]
    UnknownAction(String),

    /// The engine actor has stopped; its command channel is closed.
    #[error("engine is not running")]
    Unavailable,
}

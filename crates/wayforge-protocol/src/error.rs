//! Error types for the protocol layer.
//!
//! Two enums live here. [`ProtocolError`] is about bytes: encoding and
//! decoding persisted records. [`ServiceError`] is what the host's services
//! (world, capabilities, ledger, dispatcher) report when a call fails.
//! Both workflows see the same shape, so it sits in the shared crate.

/// Errors that can occur while encoding or decoding records.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: a hand-edited record, a truncated write after a
    /// crash, or a record from an older layout.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The record decoded but is not usable.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// A failure reported by one of the host's external services.
///
/// These are never fatal: the engine surfaces them to the caller of the
/// operation that triggered the call, or logs them when the call was part
/// of best-effort cleanup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The service could not be reached or is not installed.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The service was reached but refused the operation
    /// (e.g., a ledger declining a withdrawal).
    #[error("service rejected the operation: {0}")]
    Rejected(String),
}

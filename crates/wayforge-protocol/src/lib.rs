//! Shared vocabulary for Wayforge.
//!
//! Everything the session and request layers have in common lives here:
//!
//! - **Types** ([`ParticipantId`], [`Location`], [`Notice`]): who is
//!   involved, where they are, and what they get told.
//! - **Ports** ([`WorldOracle`], [`Notifier`]): the narrow interfaces to the
//!   host game server that both workflows call out to.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how persisted records are
//!   turned into bytes and back.
//! - **Errors** ([`ProtocolError`], [`ServiceError`]).
//!
//! # Architecture
//!
//! ```text
//! wayforge (engine actor)
//!     ↕
//! wayforge-session / wayforge-request  ← the two state machines
//!     ↕
//! wayforge-protocol (this crate)       ← ids, notices, host ports
//! ```

mod codec;
mod error;
mod notice;
mod ports;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{ProtocolError, ServiceError};
pub use notice::Notice;
pub use ports::{Notifier, WorldOracle};
pub use types::{BlockPos, Location, ParticipantId, format_clock};

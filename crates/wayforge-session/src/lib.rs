//! Timed mini-game sessions for Wayforge.
//!
//! A participant is dropped somewhere in the world and has a fixed number
//! of seconds to reach a target. This crate owns the whole lifecycle:
//!
//! 1. **Placement**: picking a target and a start point at the right
//!    distance ([`placement`]).
//! 2. **State machine**: the countdown, the win check, and the
//!    exactly-once terminal transition ([`GameSession`]).
//! 3. **Registry**: at most one session per participant
//!    ([`SessionRegistry`]).
//! 4. **Coordination**: revoking capabilities, driving ticks, rewards,
//!    and cleanup ([`GameManager`]).
//!
//! # How it fits in the stack
//!
//! ```text
//! Engine actor (above)   ← routes commands and ticks to the manager
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Protocol layer (below) ← ParticipantId, Location, Notice, WorldOracle
//! ```

mod config;
mod error;
mod manager;
mod marker;
pub mod placement;
mod registry;
mod services;
mod session;

pub use config::GameConfig;
pub use error::{GameError, MarkerError};
pub use manager::{GameManager, GameServices, GameStatus, StartOptions, StartedGame};
pub use marker::{FileMarkerStore, MarkerStore, MemoryMarkerStore, SessionMarker};
pub use placement::{DistanceBand, WorldBounds};
pub use registry::SessionRegistry;
pub use services::{CapabilityService, RewardDispatcher, render_reward_command};
pub use session::{EndCause, GameSession, SessionStatus, Teardown, TickVerdict};

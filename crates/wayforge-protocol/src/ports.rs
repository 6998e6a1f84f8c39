//! Ports to the host game server shared by both workflows.
//!
//! Wayforge doesn't know how the host stores worlds or delivers chat;
//! that's the host's job (Bukkit, Minestom, a custom server, a test
//! double...). Instead it defines two narrow traits that the host
//! implements and hands to the engine at startup:
//!
//! - [`WorldOracle`]: where participants are, where they can stand, and
//!   moving them.
//! - [`Notifier`]: delivering a [`Notice`] to a participant.
//!
//! Both are called synchronously from the engine's single mutation loop,
//! so implementations must not block for long.

use crate::{Location, Notice, ParticipantId, ServiceError};

/// Read and move participants in the host's worlds.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` because the engine is moved into its own Tokio
/// task and holds the oracle for its whole lifetime.
///
/// # Example
///
/// ```rust
/// use wayforge_protocol::{Location, ParticipantId, ServiceError, WorldOracle};
///
/// /// A flat world where everybody stands at the origin.
/// struct FlatWorld;
///
/// impl WorldOracle for FlatWorld {
///     fn location(&self, _participant: ParticipantId) -> Option<Location> {
///         Some(Location::new("world", 0.5, 64.0, 0.5))
///     }
///
///     fn highest_standable_y(&self, _world: &str, _x: i32, _z: i32) -> i32 {
///         64
///     }
///
///     fn teleport(
///         &self,
///         _participant: ParticipantId,
///         _to: &Location,
///     ) -> Result<(), ServiceError> {
///         Ok(())
///     }
/// }
/// ```
pub trait WorldOracle: Send + Sync + 'static {
    /// Current location of the participant, or `None` if they are not
    /// online. "Offline" is how the engine detects a vanished participant.
    fn location(&self, participant: ParticipantId) -> Option<Location>;

    /// The first elevation a participant can stand on in column `(x, z)`.
    fn highest_standable_y(&self, world: &str, x: i32, z: i32) -> i32;

    /// Moves the participant to `to`.
    fn teleport(
        &self,
        participant: ParticipantId,
        to: &Location,
    ) -> Result<(), ServiceError>;

    /// Distance between two points; `None` across worlds.
    fn distance(&self, a: &Location, b: &Location) -> Option<f64> {
        a.distance(b)
    }

    /// Human-readable name substituted into reward commands.
    fn display_name(&self, participant: ParticipantId) -> String {
        participant.to_string()
    }

    /// Whether the participant is currently reachable.
    fn is_online(&self, participant: ParticipantId) -> bool {
        self.location(participant).is_some()
    }
}

/// Delivers notices to participants.
///
/// Delivery is fire-and-forget: a notice to someone who just left is
/// dropped by the host, never reported back as an error.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, participant: ParticipantId, notice: Notice);
}

/// Any thread-safe closure is a notifier. Handy for tests and for hosts
/// that forward notices straight into their own channel.
impl<F> Notifier for F
where
    F: Fn(ParticipantId, Notice) + Send + Sync + 'static,
{
    fn notify(&self, participant: ParticipantId, notice: Notice) {
        self(participant, notice)
    }
}

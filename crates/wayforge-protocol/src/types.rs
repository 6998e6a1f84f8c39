//! Core value types shared by every Wayforge crate.
//!
//! These are plain data: who a participant is and where something is in
//! the game world. They are serializable because session markers persist
//! them and notices carry them to the host's message layer.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A unique identifier for a participant (one connected user).
///
/// A newtype wrapper around `u64` so it can't be confused with tick counts,
/// balances, or any other integer flowing through the engine. The host maps
/// its own user identity (UUID, account id, ...) onto this value.
///
/// `#[serde(transparent)]` serializes `ParticipantId(42)` as just `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// Integer block coordinates, as shown to players ("target at 100 70 100").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

/// A point in a named world.
///
/// Coordinates are `f64` because participants stand anywhere inside a
/// block; generated locations sit at the block centre (`x + 0.5`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Name of the world (dimension) this point belongs to.
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    /// Creates a location in the given world.
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// The centre of the block column `(x, z)` standing at elevation `y`.
    pub fn block_centre(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self::new(world, f64::from(x) + 0.5, f64::from(y), f64::from(z) + 0.5)
    }

    /// The block this point lies in (coordinates floored).
    pub fn block(&self) -> BlockPos {
        BlockPos {
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
            z: self.z.floor() as i32,
        }
    }

    /// Euclidean distance to `other`, or `None` if the two points are in
    /// different worlds (there is no meaningful distance across worlds).
    pub fn distance(&self, other: &Location) -> Option<f64> {
        if self.world != other.world {
            return None;
        }
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        Some((dx * dx + dy * dy + dz * dz).sqrt())
    }

    /// Distance on the horizontal plane only, ignoring elevation.
    pub fn horizontal_distance(&self, other: &Location) -> Option<f64> {
        if self.world != other.world {
            return None;
        }
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        Some((dx * dx + dz * dz).sqrt())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@({:.1}, {:.1}, {:.1})", self.world, self.x, self.y, self.z)
    }
}

/// Formats a number of seconds as a countdown clock: `m:ss`.
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

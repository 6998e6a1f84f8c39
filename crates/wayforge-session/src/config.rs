//! Configuration for the timed game.

use serde::{Deserialize, Serialize};

use crate::{DistanceBand, WorldBounds};

/// Settings for the timed mini-game.
///
/// Every field has a default, so a config file only needs to name what it
/// changes (`#[serde(default)]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// When `false`, every game entry point is rejected with
    /// [`GameError::Disabled`](crate::GameError::Disabled).
    pub enabled: bool,

    /// Default time limit in seconds when the caller doesn't pass one.
    pub time_limit_secs: u32,

    /// How close (in blocks) the participant must get to the target.
    pub target_radius: f64,

    /// Start-to-target distance band.
    pub distance: DistanceBand,

    /// Square bounds targets and starts are generated within.
    pub bounds: WorldBounds,

    /// Capabilities revoked for the duration of a game (e.g. `"essentials.home"`).
    pub revoked_capabilities: Vec<String>,

    /// Commands dispatched on success. `{player}` and `%player%` are
    /// replaced by the participant's display name.
    pub reward_commands: Vec<String>,

    /// Remaining-time values (seconds) at which a warning notice is sent.
    pub warning_secs: Vec<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time_limit_secs: 300,
            target_radius: 5.0,
            distance: DistanceBand::default(),
            bounds: WorldBounds::default(),
            revoked_capabilities: Vec::new(),
            reward_commands: Vec::new(),
            warning_secs: vec![60, 30, 10],
        }
    }
}

impl GameConfig {
    /// Fixes values that would break placement or the countdown.
    pub fn validated(mut self) -> Self {
        self.time_limit_secs = self.time_limit_secs.max(1);
        if !self.target_radius.is_finite() || self.target_radius < 0.0 {
            self.target_radius = 0.0;
        }
        self.distance = self.distance.validated();
        self.bounds = self.bounds.validated();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_config_default() {
        let config = GameConfig::default();
        assert!(config.enabled);
        assert_eq!(config.time_limit_secs, 300);
        assert_eq!(config.target_radius, 5.0);
        assert_eq!(config.distance, DistanceBand::new(500, 2000));
        assert_eq!(config.bounds, WorldBounds::new(-10_000, 10_000));
        assert_eq!(config.warning_secs, vec![60, 30, 10]);
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "time_limit_secs": 120, "reward_commands": ["give {player} diamond 1"] }"#)
                .unwrap();
        assert_eq!(config.time_limit_secs, 120);
        assert_eq!(config.reward_commands.len(), 1);
        assert_eq!(config.target_radius, 5.0);
    }

    #[test]
    fn test_validated_repairs_bad_values() {
        let config = GameConfig {
            time_limit_secs: 0,
            target_radius: -3.0,
            distance: DistanceBand::new(900, 100),
            bounds: WorldBounds::new(50, -50),
            ..GameConfig::default()
        }
        .validated();

        assert_eq!(config.time_limit_secs, 1);
        assert_eq!(config.target_radius, 0.0);
        assert_eq!(config.distance, DistanceBand::new(900, 901));
        assert_eq!(config.bounds, WorldBounds::new(-50, 50));
    }
}

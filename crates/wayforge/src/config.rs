//! Engine configuration.

use serde::{Deserialize, Serialize};
use wayforge_request::RequestConfig;
use wayforge_session::GameConfig;
use wayforge_tick::{TickConfig, TickPolicy};

use crate::WayforgeError;

/// Everything the engine needs to know, in one document.
///
/// ```json
/// {
///   "tick_rate_hz": 20,
///   "game": { "time_limit_secs": 300, "reward_commands": ["give {player} diamond 1"] },
///   "requests": { "cost": 10.0, "timeout_secs": 60 }
/// }
/// ```
///
/// Missing sections and fields fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine ticks per second. Game countdowns advance once every
    /// `tick_rate_hz` ticks and request timeouts are measured in the same
    /// ticks, so this sets the resolution of both.
    pub tick_rate_hz: u32,
    /// What the actor's clock does after a stall: `skip` lets countdowns
    /// fall behind, `drop` replays the missed ticks.
    pub tick_policy: TickPolicy,
    pub game: GameConfig,
    pub requests: RequestConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: TickConfig::default().tick_rate_hz,
            tick_policy: TickPolicy::default(),
            game: GameConfig::default(),
            requests: RequestConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, WayforgeError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Clamps the tick rate and repairs the game and request sections.
    pub fn validated(self) -> Self {
        Self {
            tick_rate_hz: self.tick_config().tick_rate_hz,
            tick_policy: self.tick_policy,
            game: self.game.validated(),
            requests: self.requests.validated(),
        }
    }

    /// The clock settings for the engine actor.
    pub fn tick_config(&self) -> TickConfig {
        TickConfig::with_rate(self.tick_rate_hz)
            .with_policy(self.tick_policy)
            .validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.tick_rate_hz, 20);
        assert_eq!(config.tick_policy, TickPolicy::Skip);
        assert_eq!(config.game.time_limit_secs, 300);
        assert_eq!(config.requests.timeout_secs, 60);
    }

    #[test]
    fn test_from_json_str_partial_document() {
        let config = EngineConfig::from_json_str(
            r#"{ "game": { "time_limit_secs": 90 }, "requests": { "cost": 2.5 } }"#,
        )
        .unwrap();

        assert_eq!(config.tick_rate_hz, 20);
        assert_eq!(config.game.time_limit_secs, 90);
        assert_eq!(config.game.target_radius, 5.0);
        assert_eq!(config.requests.charge(), Some(2.5));
    }

    #[test]
    fn test_from_json_str_validates() {
        let config = EngineConfig::from_json_str(
            r#"{ "tick_rate_hz": 0, "game": { "distance": { "min": 900, "max": 100 } } }"#,
        )
        .unwrap();

        assert_eq!(config.tick_rate_hz, 1);
        assert!(config.game.distance.max > config.game.distance.min);
    }

    #[test]
    fn test_tick_policy_reaches_clock_config() {
        let config = EngineConfig::from_json_str(r#"{ "tick_policy": "drop" }"#).unwrap();

        let tick = config.tick_config();
        assert_eq!(tick.policy, TickPolicy::Drop);
        assert_eq!(tick.tick_rate_hz, 20);
    }

    #[test]
    fn test_from_json_str_rejects_garbage() {
        let result = EngineConfig::from_json_str("{ tick_rate_hz: ");
        assert!(matches!(result, Err(WayforgeError::Config(_))));
    }
}

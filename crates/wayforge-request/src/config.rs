//! Configuration for teleport requests.

use serde::{Deserialize, Serialize};

/// Settings for teleport requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Charged to the requester when the target accepts. `0` disables
    /// charging entirely.
    pub cost: f64,

    /// Seconds a request stays pending before it expires.
    pub timeout_secs: u32,

    /// Whether participants accept requests until they say otherwise.
    pub default_accepts: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            cost: 0.0,
            timeout_secs: 60,
            default_accepts: true,
        }
    }
}

impl RequestConfig {
    /// Clamps the cost to a non-negative number and the timeout to at
    /// least one second.
    pub fn validated(mut self) -> Self {
        if !self.cost.is_finite() || self.cost < 0.0 {
            self.cost = 0.0;
        }
        self.timeout_secs = self.timeout_secs.max(1);
        self
    }

    /// The cost to charge, or `None` when charging is off.
    pub fn charge(&self) -> Option<f64> {
        (self.cost > 0.0).then_some(self.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_config_default() {
        let config = RequestConfig::default();
        assert_eq!(config.cost, 0.0);
        assert_eq!(config.timeout_secs, 60);
        assert!(config.default_accepts);
        assert_eq!(config.charge(), None);
    }

    #[test]
    fn test_validated_clamps_negative_cost_and_zero_timeout() {
        let config = RequestConfig {
            cost: -4.0,
            timeout_secs: 0,
            default_accepts: false,
        }
        .validated();

        assert_eq!(config.cost, 0.0);
        assert_eq!(config.timeout_secs, 1);
        assert!(!config.default_accepts);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: RequestConfig = serde_json::from_str(r#"{ "cost": 10.0 }"#).unwrap();
        assert_eq!(config.charge(), Some(10.0));
        assert_eq!(config.timeout_secs, 60);
    }
}

//! Engine configuration, read from TOML.
//!
//! ```toml
//! home = "P1"
//!
//! [topology]
//! sites = ["P1", "P2"]
//!
//! [[topology.connections]]
//! a = "P1"
//! b = "P2"
//! cost = 6.0
//!
//! [alert]
//! simultaneous = "first_in_order"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use site_model::{SiteId, TopologyConfig};

use crate::alert::SimultaneousPolicy;
use crate::error::Result;
use crate::routing::WeightConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Where the traveler starts and returns to on reset.
    pub home: SiteId,

    pub topology: TopologyConfig,

    #[serde(default)]
    pub alert: AlertConfig,

    #[serde(default)]
    pub weights: WeightConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AlertConfig {
    pub simultaneous: SimultaneousPolicy,
}

impl EngineConfig {
    /// Create a config with default alert policy and weights.
    pub fn new(home: impl Into<SiteId>, topology: TopologyConfig) -> Self {
        Self {
            home: home.into(),
            topology,
            alert: AlertConfig::default(),
            weights: WeightConfig::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_policy(mut self, policy: SimultaneousPolicy) -> Self {
        self.alert.simultaneous = policy;
        self
    }

    pub fn with_weights(mut self, weights: WeightConfig) -> Self {
        self.weights = weights;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = EngineConfig::from_toml_str(
            r#"
            home = "P1"

            [topology]
            sites = ["P1", "P2"]

            [[topology.connections]]
            a = "P1"
            b = "P2"
            cost = 6.0

            [alert]
            simultaneous = "queue"

            [weights]
            high_risk_penalty = 4.0
            "#,
        )
        .unwrap();

        assert_eq!(config.home, SiteId::new("P1"));
        assert_eq!(config.topology.connections.len(), 1);
        assert_eq!(config.alert.simultaneous, SimultaneousPolicy::Queue);
        assert_eq!(config.weights.high_risk_penalty, 4.0);
        // Unset weight fields keep their defaults
        assert_eq!(config.weights.max_discount, 0.6);
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = EngineConfig::from_toml_str(
            r#"
            home = "A"
            [topology]
            sites = ["A"]
            "#,
        )
        .unwrap();

        assert_eq!(config.alert.simultaneous, SimultaneousPolicy::FirstInOrder);
        assert_eq!(config.weights, WeightConfig::default());
        assert!(config.topology.connections.is_empty());
    }

    #[test]
    fn test_weight_limit_key_rejected() {
        // The routing limit is the high-band threshold and cannot be moved
        let result = EngineConfig::from_toml_str(
            r#"
            home = "A"
            [topology]
            sites = ["A"]
            [weights]
            limit = 5.0
            "#,
        );
        assert!(matches!(result, Err(crate::error::EngineError::ConfigParse(_))));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = EngineConfig::from_toml_str(
            r#"
            home = "A"
            [topology]
            sites = ["A"]
            [alert]
            simultaneous = "merge"
            "#,
        );
        assert!(result.is_err());
    }
}

//! Adaptive edge weights driven by endpoint risk.

use serde::{Deserialize, Serialize};
use site_model::{Connection, RISK_LIMIT};

/// Parameters of the risk-adaptive weight function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightConfig {
    /// Node factor for sites at or above the limit.
    pub high_risk_penalty: f64,

    /// Largest discount a fully safe site gives (factor floor is 1 - this).
    pub max_discount: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            high_risk_penalty: 5.0,
            max_discount: 0.6,
        }
    }
}

impl WeightConfig {
    /// Reject parameters that would make costs zero, negative or undefined.
    pub fn validate(&self) -> Result<(), String> {
        if !self.high_risk_penalty.is_finite() || self.high_risk_penalty <= 0.0 {
            return Err(format!(
                "high_risk_penalty must be positive, got {}",
                self.high_risk_penalty
            ));
        }
        if !(0.0..1.0).contains(&self.max_discount) {
            return Err(format!(
                "max_discount must be in [0, 1), got {}",
                self.max_discount
            ));
        }
        Ok(())
    }

    /// Multiplier contributed by one endpoint.
    ///
    /// The limit is the high-band threshold `RISK_LIMIT`, so a site is
    /// penalised exactly when it bands as high.
    /// Sites at or past it get the flat penalty. Below it the factor
    /// runs linearly from `1 - max_discount` at score 0 up to 1.0 just under
    /// the limit, so cost never drops as risk rises.
    pub fn node_factor(&self, score: f64) -> f64 {
        let margin = RISK_LIMIT - score;
        if margin <= 0.0 {
            return self.high_risk_penalty;
        }
        let ratio = (margin / RISK_LIMIT).clamp(0.0, 1.0);
        1.0 - self.max_discount * ratio
    }

    /// Average of the two endpoint factors.
    pub fn edge_factor(&self, score_a: f64, score_b: f64) -> f64 {
        (self.node_factor(score_a) + self.node_factor(score_b)) / 2.0
    }

    /// Risk-adjusted traversal cost of a connection.
    pub fn real_cost(&self, connection: &Connection, score_a: f64, score_b: f64) -> f64 {
        connection.cost * self.edge_factor(score_a, score_b)
    }
}

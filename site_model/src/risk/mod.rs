//! Structural-risk model: observation bundle -> bounded score -> band.
//!
//! Everything here is pure arithmetic. Scores are recomputed on every read
//! and never stored.

use serde::{Deserialize, Serialize};

use crate::sites::{LeakLevel, LoadLevel, Observations};

/// Rainfall at which the rainfall ratio saturates.
pub const RAINFALL_SATURATION_MM: f64 = 1000.0;

/// Soil fractions at or below this contribute nothing.
pub const SOIL_FRACTION_FLOOR: f64 = 0.25;

/// Width of the linear soil ramp; fractions at or above floor + span contribute fully.
pub const SOIL_FRACTION_SPAN: f64 = 0.5;

/// Upper bound of the low band (inclusive).
pub const LOW_BAND_CEILING: f64 = 3.0;

/// Lower bound of the high band (inclusive). Also the routing limit.
pub const RISK_LIMIT: f64 = 7.0;

/// Scores are clamped to this.
pub const MAX_SRI: f64 = 10.0;

// Component weights of the raw sum.
const RAINFALL_WEIGHT: f64 = 3.0;
const SOIL_WEIGHT: f64 = 3.0;
const LEAK_WEIGHT: f64 = 2.0;
const EXCAVATION_WEIGHT: f64 = 1.0;
const LOAD_WEIGHT: f64 = 1.0;

/// Discrete risk classification of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    /// [0, 3]
    #[default]
    Low,
    /// (3, 7)
    Mid,
    /// [7, 10]
    High,
}

impl RiskBand {
    /// Classify a score. The bands partition [0, 10] with no gaps.
    pub fn from_score(score: f64) -> Self {
        if score >= RISK_LIMIT {
            RiskBand::High
        } else if score <= LOW_BAND_CEILING {
            RiskBand::Low
        } else {
            RiskBand::Mid
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, RiskBand::High)
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RiskBand::Low => "low",
            RiskBand::Mid => "mid",
            RiskBand::High => "high",
        };
        write!(f, "{}", name)
    }
}

impl LeakLevel {
    /// Contribution of this leak level before weighting.
    pub fn term(&self) -> f64 {
        match self {
            LeakLevel::None => 0.0,
            LeakLevel::Minor => 0.3,
            LeakLevel::Moderate => 0.6,
            LeakLevel::Severe => 1.0,
        }
    }
}

impl LoadLevel {
    /// Contribution of this load level before weighting.
    pub fn term(&self) -> f64 {
        match self {
            LoadLevel::Light => 0.0,
            LoadLevel::Moderate => 0.5,
            LoadLevel::Heavy => 1.0,
        }
    }
}

/// A fully itemised risk score for one site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    /// min(rainfall / 1000, 1).
    pub rainfall_ratio: f64,
    /// soil / (soil + sand), or 0 without composition data.
    pub soil_fraction: f64,
    /// Soil fraction mapped linearly onto [0, 1] between 0.25 and 0.75.
    pub soil_term: f64,
    pub leak_term: f64,
    pub excavation_term: f64,
    pub load_term: f64,
    /// Weighted sum before clamping.
    pub raw: f64,
    /// Final structural-risk index in [0, 10].
    pub sri: f64,
}

impl RiskScore {
    /// Compute the score for an observation bundle.
    ///
    /// Inputs are expected to be finite; that is enforced when observations
    /// are patched, not here.
    pub fn compute(obs: &Observations) -> Self {
        let rainfall_ratio = (obs.rainfall_mm / RAINFALL_SATURATION_MM).min(1.0);

        let composition = obs.soil_volume + obs.sand_volume;
        let soil_fraction = if composition > 0.0 {
            obs.soil_volume / composition
        } else {
            0.0
        };
        let soil_term = ((soil_fraction - SOIL_FRACTION_FLOOR) / SOIL_FRACTION_SPAN).clamp(0.0, 1.0);

        let leak_term = obs.leak.term();
        let excavation_term = if obs.excavation { 1.0 } else { 0.0 };
        let load_term = obs.load.term();

        let raw = RAINFALL_WEIGHT * rainfall_ratio
            + SOIL_WEIGHT * soil_term
            + LEAK_WEIGHT * leak_term
            + EXCAVATION_WEIGHT * excavation_term
            + LOAD_WEIGHT * load_term;

        Self {
            rainfall_ratio,
            soil_fraction,
            soil_term,
            leak_term,
            excavation_term,
            load_term,
            raw,
            sri: raw.min(MAX_SRI),
        }
    }

    pub fn band(&self) -> RiskBand {
        RiskBand::from_score(self.sri)
    }
}

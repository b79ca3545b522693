//! Observation bundles and field-level patches.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Severity of a detected leak, ordered from none to severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum LeakLevel {
    #[default]
    None,
    Minor,
    Moderate,
    Severe,
}

impl TryFrom<u8> for LeakLevel {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LeakLevel::None),
            1 => Ok(LeakLevel::Minor),
            2 => Ok(LeakLevel::Moderate),
            3 => Ok(LeakLevel::Severe),
            _ => Err(ValidationError::LevelOutOfRange {
                field: "leak",
                value,
                max: 3,
            }),
        }
    }
}

impl From<LeakLevel> for u8 {
    fn from(level: LeakLevel) -> Self {
        level as u8
    }
}

/// Traffic load passing over a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum LoadLevel {
    #[default]
    Light,
    Moderate,
    Heavy,
}

impl TryFrom<u8> for LoadLevel {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LoadLevel::Light),
            1 => Ok(LoadLevel::Moderate),
            2 => Ok(LoadLevel::Heavy),
            _ => Err(ValidationError::LevelOutOfRange {
                field: "load",
                value,
                max: 2,
            }),
        }
    }
}

impl From<LoadLevel> for u8 {
    fn from(level: LoadLevel) -> Self {
        level as u8
    }
}

/// The full set of raw observations for one site.
///
/// `Default` is the zero-observation state every site starts from and
/// returns to on reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Observations {
    /// Cumulative rainfall in millimetres.
    pub rainfall_mm: f64,
    pub soil_volume: f64,
    pub sand_volume: f64,
    pub leak: LeakLevel,
    pub excavation: bool,
    pub load: LoadLevel,
}

impl Observations {
    /// Apply a patch, returning the patched copy.
    ///
    /// Non-finite numbers are rejected and negative numbers are clamped to
    /// zero. On error `self` is left as it was.
    pub fn apply(&self, patch: &ObservationPatch) -> Result<Observations, ValidationError> {
        let mut next = self.clone();

        if let Some(value) = patch.rainfall_mm {
            next.rainfall_mm = sanitize("rainfall_mm", value)?;
        }
        if let Some(value) = patch.soil_volume {
            next.soil_volume = sanitize("soil_volume", value)?;
        }
        if let Some(value) = patch.sand_volume {
            next.sand_volume = sanitize("sand_volume", value)?;
        }
        if let Some(leak) = patch.leak {
            next.leak = leak;
        }
        if let Some(excavation) = patch.excavation {
            next.excavation = excavation;
        }
        if let Some(load) = patch.load {
            next.load = load;
        }

        Ok(next)
    }
}

fn sanitize(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { field, value });
    }
    Ok(value.max(0.0))
}

/// A field-level update to a site's observations. `None` leaves the field as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ObservationPatch {
    pub rainfall_mm: Option<f64>,
    pub soil_volume: Option<f64>,
    pub sand_volume: Option<f64>,
    pub leak: Option<LeakLevel>,
    pub excavation: Option<bool>,
    pub load: Option<LoadLevel>,
}

impl ObservationPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch that overwrites every field, used for full replacement.
    pub fn replace_all(observations: &Observations) -> Self {
        Self {
            rainfall_mm: Some(observations.rainfall_mm),
            soil_volume: Some(observations.soil_volume),
            sand_volume: Some(observations.sand_volume),
            leak: Some(observations.leak),
            excavation: Some(observations.excavation),
            load: Some(observations.load),
        }
    }

    pub fn with_rainfall(mut self, rainfall_mm: f64) -> Self {
        self.rainfall_mm = Some(rainfall_mm);
        self
    }

    /// Set soil and sand volumes together.
    pub fn with_composition(mut self, soil_volume: f64, sand_volume: f64) -> Self {
        self.soil_volume = Some(soil_volume);
        self.sand_volume = Some(sand_volume);
        self
    }

    pub fn with_leak(mut self, leak: LeakLevel) -> Self {
        self.leak = Some(leak);
        self
    }

    pub fn with_excavation(mut self, excavation: bool) -> Self {
        self.excavation = Some(excavation);
        self
    }

    pub fn with_load(mut self, load: LoadLevel) -> Self {
        self.load = Some(load);
        self
    }

    /// Check whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

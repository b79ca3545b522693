//! Error types for the evacuation engine.

use thiserror::Error;

use site_model::{SiteId, TopologyError, ValidationError};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid observation for site {site}: {source}")]
    InvalidObservation {
        site: SiteId,
        #[source]
        source: ValidationError,
    },

    #[error("invalid external probability for site {site}: {value}")]
    InvalidProbability { site: SiteId, value: f64 },

    #[error("unknown site: {0}")]
    UnknownSite(SiteId),

    #[error("no active escape plan")]
    NoActivePlan,

    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("home site {0} is not part of the topology")]
    UnknownHome(SiteId),

    #[error("invalid weight config: {0}")]
    InvalidWeights(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn invalid_observation(site: impl Into<SiteId>, source: ValidationError) -> Self {
        Self::InvalidObservation {
            site: site.into(),
            source,
        }
    }

    /// Whether this error can only come from loading configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            EngineError::Topology(_)
                | EngineError::UnknownHome(_)
                | EngineError::InvalidWeights(_)
                | EngineError::ConfigParse(_)
                | EngineError::Io(_)
        )
    }
}

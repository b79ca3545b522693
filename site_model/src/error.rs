//! Error types for observation input and topology configuration.

use thiserror::Error;

use crate::sites::SiteId;

/// Rejected observation input. The site keeps its previous observations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("non-finite value for {field}: {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} level {value} out of range (max {max})")]
    LevelOutOfRange {
        field: &'static str,
        value: u8,
        max: u8,
    },
}

/// Malformed topology. Always fatal at load time.
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("topology has no sites")]
    Empty,

    #[error("duplicate site: {0}")]
    DuplicateSite(SiteId),

    #[error("connection {a}-{b} references unknown site {missing}")]
    UnknownSite {
        a: SiteId,
        b: SiteId,
        missing: SiteId,
    },

    #[error("connection {0}-{0} is a self-loop")]
    SelfLoop(SiteId),

    #[error("connection {a}-{b} has invalid base cost {cost}")]
    InvalidCost { a: SiteId, b: SiteId, cost: f64 },

    #[error("failed to parse topology: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

//! Site definitions.

use serde::{Deserialize, Serialize};

use super::{ObservationPatch, Observations, SiteId};
use crate::error::ValidationError;
use crate::risk::{RiskBand, RiskScore};

/// A monitored site with its current observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub observations: Observations,
}

impl Site {
    /// Create a site in the zero-observation state.
    pub fn new(id: impl Into<SiteId>) -> Self {
        Self {
            id: id.into(),
            observations: Observations::default(),
        }
    }

    /// Apply a patch. On error the site is unchanged.
    pub fn apply(&mut self, patch: &ObservationPatch) -> Result<(), ValidationError> {
        self.observations = self.observations.apply(patch)?;
        Ok(())
    }

    /// Return the site to the zero-observation state.
    pub fn clear(&mut self) {
        self.observations = Observations::default();
    }

    /// Recompute the risk score from current observations.
    pub fn risk(&self) -> RiskScore {
        RiskScore::compute(&self.observations)
    }

    pub fn band(&self) -> RiskBand {
        self.risk().band()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::LeakLevel;

    #[test]
    fn test_new_site() {
        let site = Site::new("P2");
        assert_eq!(site.id, SiteId::new("P2"));
        assert_eq!(site.risk().sri, 0.0);
        assert_eq!(site.band(), RiskBand::Low);
    }

    #[test]
    fn test_failed_apply_keeps_state() {
        let mut site = Site::new("P1");
        site.apply(&ObservationPatch::new().with_leak(LeakLevel::Severe)).unwrap();

        let err = site.apply(&ObservationPatch::new().with_rainfall(f64::NAN).with_excavation(true));
        assert!(err.is_err());
        assert_eq!(site.observations.leak, LeakLevel::Severe);
        assert!(!site.observations.excavation);
    }

    #[test]
    fn test_clear() {
        let mut site = Site::new("P1");
        site.apply(&ObservationPatch::new().with_rainfall(1000.0)).unwrap();
        assert!(site.risk().sri > 0.0);

        site.clear();
        assert_eq!(site.observations, Observations::default());
    }
}

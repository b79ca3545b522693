//! Point-in-time view of every site's effective risk score.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use site_model::{RiskBand, SiteId, Topology};

/// Effective scores for one update cycle. Sites missing from the snapshot
/// read as score 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RiskSnapshot {
    scores: HashMap<SiteId, f64>,
}

impl RiskSnapshot {
    /// Create a new empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_score(&mut self, site: SiteId, score: f64) {
        self.scores.insert(site, score);
    }

    /// Builder form of [`RiskSnapshot::set_score`].
    pub fn with_score(mut self, site: impl Into<SiteId>, score: f64) -> Self {
        self.set_score(site.into(), score);
        self
    }

    pub fn score(&self, site: &SiteId) -> f64 {
        self.scores.get(site).copied().unwrap_or(0.0)
    }

    pub fn band(&self, site: &SiteId) -> RiskBand {
        RiskBand::from_score(self.score(site))
    }

    /// Bands for every site of the topology, in enumeration order.
    pub fn bands<'a>(&'a self, topology: &'a Topology) -> impl Iterator<Item = (&'a SiteId, RiskBand)> + 'a {
        topology.sites().iter().map(move |site| (site, self.band(site)))
    }

    /// The highest-scoring site among `candidates`; ties go to the earliest.
    pub fn riskiest<'a>(&self, candidates: &'a [SiteId]) -> Option<&'a SiteId> {
        let mut best: Option<&'a SiteId> = None;
        for site in candidates {
            match best {
                Some(current) if self.score(current) >= self.score(site) => {}
                _ => best = Some(site),
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::TopologyConfig;

    #[test]
    fn test_missing_site_reads_zero() {
        let snapshot = RiskSnapshot::new().with_score("P1", 8.0);
        assert_eq!(snapshot.score(&SiteId::new("P1")), 8.0);
        assert_eq!(snapshot.score(&SiteId::new("P2")), 0.0);
        assert_eq!(snapshot.band(&SiteId::new("P2")), RiskBand::Low);
    }

    #[test]
    fn test_bands_follow_topology_order() {
        let topology = Topology::build(
            TopologyConfig::new()
                .with_site("C")
                .with_site("A")
                .with_site("B"),
        )
        .unwrap();
        let snapshot = RiskSnapshot::new()
            .with_score("A", 5.0)
            .with_score("B", 7.0);

        let bands: Vec<_> = snapshot
            .bands(&topology)
            .map(|(s, b)| (s.as_str(), b))
            .collect();
        assert_eq!(
            bands,
            vec![("C", RiskBand::Low), ("A", RiskBand::Mid), ("B", RiskBand::High)]
        );
    }

    #[test]
    fn test_riskiest_prefers_earliest_on_tie() {
        let snapshot = RiskSnapshot::new()
            .with_score("A", 7.5)
            .with_score("B", 9.0)
            .with_score("C", 9.0);
        let candidates = vec![SiteId::new("A"), SiteId::new("B"), SiteId::new("C")];

        assert_eq!(snapshot.riskiest(&candidates), Some(&SiteId::new("B")));
        assert_eq!(snapshot.riskiest(&[]), None);
    }
}

//! Routing - risk-adaptive evacuation planning.
//!
//! Planning an escape works as follows:
//! 1. **Targets**: every other site below the risk limit, or every other
//!    site at all when none is below it
//! 2. **Weights**: each connection's base cost is scaled by the risk of its
//!    two endpoints
//! 3. **Search**: cheapest path from the trigger site to any target
//! 4. **Plan**: the route, or a trigger-only plan when nothing is reachable

mod planner;
mod snapshot;
mod weights;

pub use planner::*;
pub use snapshot::*;
pub use weights::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use site_model::{SiteId, Topology, RISK_LIMIT};

/// Unique identifier for escape plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(pub Uuid);

impl PlanId {
    /// Create a new random plan ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recommended evacuation from a trigger site.
///
/// `path` always starts at `trigger`. When planning failed the path is just
/// the trigger and `destination` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscapePlan {
    pub id: PlanId,
    pub trigger: SiteId,
    pub path: Vec<SiteId>,
    pub destination: Option<SiteId>,
    /// Total real cost of the path, if one was found.
    pub cost: Option<f64>,
}

impl EscapePlan {
    /// Build a plan from a found route.
    pub fn from_route(trigger: SiteId, route: Route) -> Self {
        Self {
            id: PlanId::new(),
            destination: route.destination().cloned(),
            trigger,
            cost: Some(route.cost),
            path: route.path,
        }
    }

    /// A plan with no route: the traveler is told there is nowhere to go.
    pub fn unreachable(trigger: SiteId) -> Self {
        Self {
            id: PlanId::new(),
            path: vec![trigger.clone()],
            trigger,
            destination: None,
            cost: None,
        }
    }

    pub fn has_route(&self) -> bool {
        self.destination.is_some()
    }
}

/// Plans escape routes over a topology.
#[derive(Debug, Clone, Default)]
pub struct EscapePlanner {
    weights: WeightConfig,
}

impl EscapePlanner {
    /// Create a planner with the given weight parameters.
    pub fn new(weights: WeightConfig) -> Self {
        Self { weights }
    }

    /// Create a planner with default weights.
    pub fn with_defaults() -> Self {
        Self::new(WeightConfig::default())
    }

    pub fn weights(&self) -> &WeightConfig {
        &self.weights
    }

    /// Candidate destinations for an escape from `trigger`.
    ///
    /// Prefers sites below the limit; if there are none, falls back to every
    /// other site so that a plan is always attempted.
    pub fn select_targets(
        &self,
        topology: &Topology,
        trigger: &SiteId,
        snapshot: &RiskSnapshot,
    ) -> HashSet<SiteId> {
        let others = || topology.sites().iter().filter(move |s| *s != trigger);

        let safe: HashSet<SiteId> = others()
            .filter(|s| snapshot.score(s) < RISK_LIMIT)
            .cloned()
            .collect();

        if safe.is_empty() {
            others().cloned().collect()
        } else {
            safe
        }
    }

    /// Real cost of a connection under the given scores.
    pub fn real_cost(&self, connection: &site_model::Connection, snapshot: &RiskSnapshot) -> f64 {
        self.weights.real_cost(
            connection,
            snapshot.score(&connection.a),
            snapshot.score(&connection.b),
        )
    }

    /// Plan an escape from `trigger` under the current scores.
    pub fn plan(&self, topology: &Topology, trigger: &SiteId, snapshot: &RiskSnapshot) -> EscapePlan {
        let targets = self.select_targets(topology, trigger, snapshot);
        let route = shortest_path_to_any(topology, trigger, &targets, |conn| {
            self.real_cost(conn, snapshot)
        });

        match route {
            Some(route) => {
                debug!(
                    trigger = %trigger,
                    hops = route.path.len().saturating_sub(1),
                    cost = route.cost,
                    "escape route found"
                );
                EscapePlan::from_route(trigger.clone(), route)
            }
            None => {
                debug!(trigger = %trigger, targets = targets.len(), "no escape route");
                EscapePlan::unreachable(trigger.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::TopologyConfig;

    fn four_sites() -> TopologyConfig {
        TopologyConfig::new()
            .with_site("P1")
            .with_site("P2")
            .with_site("P3")
            .with_site("P4")
            .with_connection("P1", "P2", 6.0)
            .with_connection("P2", "P3", 5.0)
            .with_connection("P3", "P4", 7.0)
            .with_connection("P1", "P3", 9.0)
            .with_connection("P2", "P4", 8.0)
    }

    fn ids(names: &[&str]) -> HashSet<SiteId> {
        names.iter().map(|s| SiteId::new(*s)).collect()
    }

    #[test]
    fn test_targets_exclude_dangerous_sites() {
        let topology = Topology::build(four_sites()).unwrap();
        let snapshot = RiskSnapshot::new()
            .with_score("P1", 8.0)
            .with_score("P3", 7.0);

        let targets = EscapePlanner::with_defaults().select_targets(&topology, &SiteId::new("P1"), &snapshot);
        assert_eq!(targets, ids(&["P2", "P4"]));
    }

    #[test]
    fn test_mid_band_sites_stay_targets() {
        // Targets are exactly the sites that do not band high
        let topology = Topology::build(four_sites()).unwrap();
        let snapshot = RiskSnapshot::new()
            .with_score("P1", 8.0)
            .with_score("P2", 6.9)
            .with_score("P3", 7.0)
            .with_score("P4", 5.0);

        let targets = EscapePlanner::with_defaults().select_targets(&topology, &SiteId::new("P1"), &snapshot);
        assert_eq!(targets, ids(&["P2", "P4"]));
        for site in &targets {
            assert!(!snapshot.band(site).is_high());
        }
    }

    #[test]
    fn test_targets_fall_back_when_everything_is_dangerous() {
        let topology = Topology::build(four_sites()).unwrap();
        let snapshot = RiskSnapshot::new()
            .with_score("P1", 9.0)
            .with_score("P2", 7.0)
            .with_score("P3", 8.0)
            .with_score("P4", 10.0);

        let targets = EscapePlanner::with_defaults().select_targets(&topology, &SiteId::new("P1"), &snapshot);
        assert_eq!(targets, ids(&["P2", "P3", "P4"]));
    }

    #[test]
    fn test_plan_prefers_direct_low_risk_neighbor() {
        let topology = Topology::build(four_sites()).unwrap();
        let snapshot = RiskSnapshot::new().with_score("P1", 8.0);

        let plan = EscapePlanner::with_defaults().plan(&topology, &SiteId::new("P1"), &snapshot);

        assert_eq!(plan.trigger, SiteId::new("P1"));
        assert_eq!(plan.path, vec![SiteId::new("P1"), SiteId::new("P2")]);
        assert_eq!(plan.destination, Some(SiteId::new("P2")));
        // 6 * (5.0 + 0.4) / 2
        assert!((plan.cost.unwrap() - 16.2).abs() < 1e-9);
    }

    #[test]
    fn test_plan_routes_around_dangerous_site() {
        // P1 alerts, P2 is also dangerous; P3 is reached directly rather than through P2
        let topology = Topology::build(four_sites()).unwrap();
        let snapshot = RiskSnapshot::new()
            .with_score("P1", 8.0)
            .with_score("P2", 9.0);

        let plan = EscapePlanner::with_defaults().plan(&topology, &SiteId::new("P1"), &snapshot);
        assert_eq!(plan.destination, Some(SiteId::new("P3")));
        assert_eq!(plan.path.len(), 2);
        // 9 * (5.0 + 0.4) / 2
        assert!((plan.cost.unwrap() - 24.3).abs() < 1e-9);
    }

    #[test]
    fn test_plan_without_route() {
        let p4 = SiteId::new("P4");
        let topology = Topology::build(four_sites().without_connections_to(&p4)).unwrap();
        let snapshot = RiskSnapshot::new().with_score("P4", 8.0);

        let plan = EscapePlanner::with_defaults().plan(&topology, &p4, &snapshot);
        assert!(!plan.has_route());
        assert_eq!(plan.path, vec![p4.clone()]);
        assert_eq!(plan.trigger, p4);
        assert!(plan.cost.is_none());
    }

    #[test]
    fn test_custom_weights() {
        let topology = Topology::build(four_sites()).unwrap();
        let snapshot = RiskSnapshot::new().with_score("P1", 8.0);
        let planner = EscapePlanner::new(WeightConfig {
            high_risk_penalty: 2.0,
            max_discount: 0.0,
        });

        let plan = planner.plan(&topology, &SiteId::new("P1"), &snapshot);
        assert!((plan.cost.unwrap() - 6.0 * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_plan_ids_are_fresh() {
        let a = EscapePlan::unreachable(SiteId::new("P1"));
        let b = EscapePlan::unreachable(SiteId::new("P1"));
        assert_ne!(a.id, b.id);
    }
}

//! The engine - owns every site and runs the full update cycle.
//!
//! Each operation runs to completion before returning: recompute every
//! score, diff every band, plan if something fired. There is no partial
//! update to observe in between.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use site_model::{
    ObservationPatch, Observations, RiskBand, RiskScore, Site, SiteId, Topology, MAX_SRI,
};

use crate::alert::{AlertMachine, AlertStatus, SimultaneousPolicy};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::EngineEvent;
use crate::navigation::NavigationTracker;
use crate::routing::{EscapePlan, EscapePlanner, PlanId, RiskSnapshot};

/// Read-only state for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertView {
    pub status: AlertStatus,
    pub trigger: Option<SiteId>,
    pub path: Vec<SiteId>,
    pub destination: Option<SiteId>,
    pub position: SiteId,
    pub next_hop: Option<SiteId>,
    pub plan_id: Option<PlanId>,
    pub cost: Option<f64>,
}

/// Per-site risk summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteReport {
    pub site: SiteId,
    /// Score derived from the site's own observations.
    pub risk: RiskScore,
    /// Score actually used for banding and routing.
    pub effective_score: f64,
    pub band: RiskBand,
    /// Whether an external probability replaced the local score.
    pub external: bool,
}

#[derive(Debug)]
pub struct Engine {
    topology: Topology,
    /// Same order as `topology.sites()`.
    sites: Vec<Site>,
    /// Externally supplied probabilities in [0, 1], by site.
    external: HashMap<SiteId, f64>,
    planner: EscapePlanner,
    alerts: AlertMachine,
    navigation: NavigationTracker,
}

impl Engine {
    /// Validate the configuration and start idle at home with every site
    /// in the zero-observation state.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.weights.validate().map_err(EngineError::InvalidWeights)?;

        let topology = Topology::build(config.topology)?;
        if !topology.contains(&config.home) {
            return Err(EngineError::UnknownHome(config.home));
        }

        let sites = topology.sites().iter().cloned().map(Site::new).collect();

        info!(
            sites = topology.site_count(),
            connections = topology.connections().len(),
            home = %config.home,
            policy = ?config.alert.simultaneous,
            "engine ready"
        );

        Ok(Self {
            topology,
            sites,
            external: HashMap::new(),
            planner: EscapePlanner::new(config.weights),
            alerts: AlertMachine::new(config.alert.simultaneous),
            navigation: NavigationTracker::new(config.home),
        })
    }

    /// Parse a TOML config and build the engine from it.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Self::new(EngineConfig::from_toml_str(s)?)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn policy(&self) -> SimultaneousPolicy {
        self.alerts.policy()
    }

    pub fn status(&self) -> AlertStatus {
        self.alerts.status()
    }

    pub fn active_plan(&self) -> Option<&EscapePlan> {
        self.alerts.active_plan()
    }

    pub fn position(&self) -> &SiteId {
        self.navigation.position()
    }

    pub fn observations(&self, site: &SiteId) -> Result<&Observations> {
        let idx = self.site_index(site)?;
        Ok(&self.sites[idx].observations)
    }

    /// Locally derived score, ignoring any external override.
    pub fn risk(&self, site: &SiteId) -> Result<RiskScore> {
        let idx = self.site_index(site)?;
        Ok(self.sites[idx].risk())
    }

    /// Score used for banding and routing.
    pub fn effective_score(&self, site: &SiteId) -> Result<f64> {
        let idx = self.site_index(site)?;
        Ok(self.score_at(idx))
    }

    pub fn band(&self, site: &SiteId) -> Result<RiskBand> {
        Ok(RiskBand::from_score(self.effective_score(site)?))
    }

    /// Effective scores of every site, freshly recomputed.
    pub fn snapshot(&self) -> RiskSnapshot {
        let mut snapshot = RiskSnapshot::new();
        for (idx, site) in self.sites.iter().enumerate() {
            snapshot.set_score(site.id.clone(), self.score_at(idx));
        }
        snapshot
    }

    /// Risk summary for every site, in topology order.
    pub fn site_report(&self) -> Vec<SiteReport> {
        self.sites
            .iter()
            .enumerate()
            .map(|(idx, site)| {
                let effective_score = self.score_at(idx);
                SiteReport {
                    site: site.id.clone(),
                    risk: site.risk(),
                    effective_score,
                    band: RiskBand::from_score(effective_score),
                    external: self.external.contains_key(&site.id),
                }
            })
            .collect()
    }

    /// Apply an observation patch to one site and run a full cycle.
    ///
    /// Rejected input leaves the site, the bands, and the active plan as
    /// they were.
    pub fn update(&mut self, site: &SiteId, patch: &ObservationPatch) -> Result<Vec<EngineEvent>> {
        let idx = self.site_index(site)?;
        if let Err(err) = self.sites[idx].apply(patch) {
            warn!(site = %site, error = %err, "observation rejected");
            return Err(EngineError::invalid_observation(site.clone(), err));
        }
        debug!(site = %site, "observations updated");
        Ok(self.run_cycle())
    }

    /// Apply patches to several sites as one update and run a single cycle.
    ///
    /// Patches for the same site compose in order. If any patch is rejected
    /// nothing is applied.
    pub fn update_batch(&mut self, updates: &[(SiteId, ObservationPatch)]) -> Result<Vec<EngineEvent>> {
        let mut staged: Vec<(usize, Observations)> = Vec::with_capacity(updates.len());

        for (site, patch) in updates {
            let idx = self.site_index(site)?;
            let base = staged
                .iter()
                .rev()
                .find(|(i, _)| *i == idx)
                .map(|(_, obs)| obs)
                .unwrap_or(&self.sites[idx].observations);

            let next = base.apply(patch).map_err(|err| {
                warn!(site = %site, error = %err, "observation rejected, batch discarded");
                EngineError::invalid_observation(site.clone(), err)
            })?;
            staged.push((idx, next));
        }

        debug!(updates = staged.len(), "batch applied");
        for (idx, observations) in staged {
            self.sites[idx].observations = observations;
        }
        Ok(self.run_cycle())
    }

    /// Replace a site's whole observation bundle and run a full cycle.
    pub fn replace(&mut self, site: &SiteId, observations: &Observations) -> Result<Vec<EngineEvent>> {
        self.update(site, &ObservationPatch::replace_all(observations))
    }

    /// Substitute an externally computed probability for a site's local
    /// score, or remove the substitution with `None`. The probability is
    /// clamped to [0, 1] and scaled onto the score range.
    pub fn set_external_probability(
        &mut self,
        site: &SiteId,
        probability: Option<f64>,
    ) -> Result<Vec<EngineEvent>> {
        self.site_index(site)?;
        match probability {
            Some(value) if !value.is_finite() => {
                warn!(site = %site, value, "external probability rejected");
                return Err(EngineError::InvalidProbability {
                    site: site.clone(),
                    value,
                });
            }
            Some(value) => {
                self.external.insert(site.clone(), value.clamp(0.0, 1.0));
            }
            None => {
                self.external.remove(site);
            }
        }
        Ok(self.run_cycle())
    }

    /// Confirm one hop along the active plan. Reaching the destination
    /// closes the alert.
    pub fn confirm_hop(&mut self) -> Result<Vec<EngineEvent>> {
        let plan = self.alerts.active_plan().ok_or(EngineError::NoActivePlan)?;
        let hop = self.navigation.confirm_hop(plan);

        let mut events = Vec::new();
        if hop.moved() {
            debug!(from = %hop.from, to = %hop.to, "hop confirmed");
            events.push(EngineEvent::Moved {
                from: hop.from,
                to: hop.to.clone(),
            });
        }

        if hop.arrived {
            info!(site = %hop.to, "arrived, alert closed");
            events.push(EngineEvent::Arrived { site: hop.to });
            let snapshot = self.snapshot();
            events.extend(self.alerts.close(&self.topology, &snapshot, &self.planner));
        }

        Ok(events)
    }

    /// Clear every site to zero observations, drop external scores and the
    /// active plan, and send the traveler home.
    pub fn reset(&mut self) -> Vec<EngineEvent> {
        for site in &mut self.sites {
            site.clear();
        }
        self.external.clear();
        self.alerts.reset(&self.topology);
        self.navigation.reset();

        info!(home = %self.navigation.home(), "engine reset");
        vec![EngineEvent::Reset]
    }

    /// Current alert state for rendering.
    pub fn view(&self) -> AlertView {
        let plan = self.alerts.active_plan();
        AlertView {
            status: self.alerts.status(),
            trigger: plan.map(|p| p.trigger.clone()),
            path: plan.map(|p| p.path.clone()).unwrap_or_default(),
            destination: plan.and_then(|p| p.destination.clone()),
            position: self.navigation.position().clone(),
            next_hop: plan.and_then(|p| self.navigation.next_hop(p).cloned()),
            plan_id: plan.map(|p| p.id),
            cost: plan.and_then(|p| p.cost),
        }
    }

    fn run_cycle(&mut self) -> Vec<EngineEvent> {
        let snapshot = self.snapshot();
        self.alerts.observe(&self.topology, &snapshot, &self.planner)
    }

    fn site_index(&self, site: &SiteId) -> Result<usize> {
        self.topology
            .index_of(site)
            .ok_or_else(|| EngineError::UnknownSite(site.clone()))
    }

    fn score_at(&self, idx: usize) -> f64 {
        let site = &self.sites[idx];
        match self.external.get(&site.id) {
            Some(probability) => probability * MAX_SRI,
            None => site.risk().sri,
        }
    }
}

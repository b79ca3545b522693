//! Alert state machine - edge-triggered escalation into the high band.
//!
//! The previous band of every site is carried in the machine itself and
//! replaced wholesale at the end of every cycle, whether or not anything
//! fired.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info, warn};

use site_model::{RiskBand, SiteId, Topology};

use crate::events::EngineEvent;
use crate::routing::{EscapePlan, EscapePlanner, RiskSnapshot};

/// What to do when several sites enter the high band in the same cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimultaneousPolicy {
    /// The first entering site in topology order triggers; the rest are dropped.
    #[default]
    FirstInOrder,
    /// The entering site with the highest score triggers; the rest are dropped.
    HighestRisk,
    /// The first entering site triggers; the rest are planned one by one as
    /// earlier alerts close, if they are still high by then.
    Queue,
}

/// Overall alerting status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    #[default]
    Idle,
    Alerting,
}

/// Tracks bands across cycles and holds the single active plan.
#[derive(Debug, Clone, Default)]
pub struct AlertMachine {
    policy: SimultaneousPolicy,

    /// Bands as of the end of the last cycle. Absent sites read as low.
    previous_bands: HashMap<SiteId, RiskBand>,

    active: Option<EscapePlan>,

    /// Pending triggers under [`SimultaneousPolicy::Queue`].
    queued: VecDeque<SiteId>,
}

impl AlertMachine {
    /// Create an idle machine with every site at low.
    pub fn new(policy: SimultaneousPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn policy(&self) -> SimultaneousPolicy {
        self.policy
    }

    pub fn status(&self) -> AlertStatus {
        if self.active.is_some() {
            AlertStatus::Alerting
        } else {
            AlertStatus::Idle
        }
    }

    pub fn active_plan(&self) -> Option<&EscapePlan> {
        self.active.as_ref()
    }

    /// Band recorded for a site at the end of the last cycle.
    pub fn previous_band(&self, site: &SiteId) -> RiskBand {
        self.previous_bands.get(site).copied().unwrap_or_default()
    }

    pub fn queued(&self) -> impl Iterator<Item = &SiteId> {
        self.queued.iter()
    }

    /// Run one cycle: diff bands against the previous cycle, fire on entry
    /// into high, then store the new bands as the baseline.
    pub fn observe(
        &mut self,
        topology: &Topology,
        snapshot: &RiskSnapshot,
        planner: &EscapePlanner,
    ) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let mut entering = Vec::new();
        let mut next_bands = HashMap::with_capacity(topology.site_count());

        for (site, band) in snapshot.bands(topology) {
            let previous = self.previous_band(site);
            if band != previous {
                debug!(site = %site, from = %previous, to = %band, "band changed");
                events.push(EngineEvent::BandChanged {
                    site: site.clone(),
                    from: previous,
                    to: band,
                });
            }
            if band.is_high() && !previous.is_high() {
                entering.push(site.clone());
            }
            next_bands.insert(site.clone(), band);
        }

        self.previous_bands = next_bands;

        let trigger = match self.policy {
            SimultaneousPolicy::FirstInOrder | SimultaneousPolicy::Queue => entering.first(),
            SimultaneousPolicy::HighestRisk => snapshot.riskiest(&entering),
        };
        let Some(trigger) = trigger.cloned() else {
            return events;
        };

        for site in entering.iter().filter(|s| **s != trigger) {
            if self.policy == SimultaneousPolicy::Queue {
                if !self.queued.contains(site) {
                    debug!(site = %site, "trigger queued");
                    self.queued.push_back(site.clone());
                    events.push(EngineEvent::TriggerQueued { site: site.clone() });
                }
            } else {
                warn!(site = %site, trigger = %trigger, "simultaneous trigger dropped");
                events.push(EngineEvent::TriggerDropped { site: site.clone() });
            }
        }

        // A fresh trigger supersedes any queued copy of itself
        self.queued.retain(|s| *s != trigger);
        events.extend(self.raise(topology, &trigger, snapshot, planner));
        events
    }

    /// Close the active alert. Under the queue policy the next queued site
    /// still in the high band is planned straight away.
    pub fn close(
        &mut self,
        topology: &Topology,
        snapshot: &RiskSnapshot,
        planner: &EscapePlanner,
    ) -> Vec<EngineEvent> {
        self.active = None;

        while let Some(site) = self.queued.pop_front() {
            if snapshot.band(&site).is_high() {
                return self.raise(topology, &site, snapshot, planner);
            }
            debug!(site = %site, "queued trigger no longer high, discarded");
        }
        Vec::new()
    }

    /// Clear every band to low and discard the active plan and the queue.
    pub fn reset(&mut self, topology: &Topology) {
        self.previous_bands = topology
            .sites()
            .iter()
            .map(|s| (s.clone(), RiskBand::Low))
            .collect();
        self.active = None;
        self.queued.clear();
    }

    fn raise(
        &mut self,
        topology: &Topology,
        trigger: &SiteId,
        snapshot: &RiskSnapshot,
        planner: &EscapePlanner,
    ) -> Vec<EngineEvent> {
        let plan = planner.plan(topology, trigger, snapshot);
        let mut events = vec![EngineEvent::AlertRaised { plan: plan.clone() }];

        if let Some(destination) = &plan.destination {
            info!(
                trigger = %trigger,
                destination = %destination,
                plan = %plan.id,
                "alert raised"
            );
        } else {
            warn!(trigger = %trigger, plan = %plan.id, "alert raised with no reachable destination");
            events.push(EngineEvent::PlanUnavailable {
                trigger: trigger.clone(),
            });
        }

        self.active = Some(plan);
        events
    }
}

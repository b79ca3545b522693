//! Events reported back from every engine operation.

use serde::{Deserialize, Serialize};
use site_model::{RiskBand, SiteId};

use crate::routing::EscapePlan;

/// Something observable that happened while processing an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A site's band differs from the previous cycle.
    BandChanged {
        site: SiteId,
        from: RiskBand,
        to: RiskBand,
    },

    /// A new escape plan is active (it may have no route).
    AlertRaised { plan: EscapePlan },

    /// The plan for this trigger found no reachable destination.
    PlanUnavailable { trigger: SiteId },

    /// A site entered the high band alongside the trigger and was ignored.
    TriggerDropped { site: SiteId },

    /// A site entered the high band alongside the trigger and waits its turn.
    TriggerQueued { site: SiteId },

    /// The traveler confirmed a hop.
    Moved { from: SiteId, to: SiteId },

    /// The traveler reached the plan's destination; the alert is closed.
    Arrived { site: SiteId },

    /// Every site was cleared and navigation returned home.
    Reset,
}

impl EngineEvent {
    /// The site this event is mainly about, if any.
    pub fn site(&self) -> Option<&SiteId> {
        match self {
            EngineEvent::BandChanged { site, .. } => Some(site),
            EngineEvent::AlertRaised { plan } => Some(&plan.trigger),
            EngineEvent::PlanUnavailable { trigger } => Some(trigger),
            EngineEvent::TriggerDropped { site } => Some(site),
            EngineEvent::TriggerQueued { site } => Some(site),
            EngineEvent::Moved { to, .. } => Some(to),
            EngineEvent::Arrived { site } => Some(site),
            EngineEvent::Reset => None,
        }
    }

    pub fn is_alert(&self) -> bool {
        matches!(self, EngineEvent::AlertRaised { .. })
    }
}

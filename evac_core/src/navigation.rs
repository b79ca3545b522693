//! Navigation tracker - the traveler's position along the active plan.

use serde::{Deserialize, Serialize};
use site_model::SiteId;

use crate::routing::EscapePlan;

/// Outcome of one confirmed hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub from: SiteId,
    pub to: SiteId,
    /// The new position is the plan's destination.
    pub arrived: bool,
}

impl Hop {
    pub fn moved(&self) -> bool {
        self.from != self.to
    }
}

/// Holds the traveler's current site. Moves only on explicit confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationTracker {
    home: SiteId,
    position: SiteId,
}

impl NavigationTracker {
    /// Start at `home`.
    pub fn new(home: SiteId) -> Self {
        Self {
            position: home.clone(),
            home,
        }
    }

    pub fn home(&self) -> &SiteId {
        &self.home
    }

    pub fn position(&self) -> &SiteId {
        &self.position
    }

    /// Where the next confirmation would take the traveler.
    ///
    /// On the path and not at its end: the following site. Off the path:
    /// the path's second site, as if still standing at the trigger.
    pub fn next_hop<'a>(&self, plan: &'a EscapePlan) -> Option<&'a SiteId> {
        match plan.path.iter().position(|s| *s == self.position) {
            Some(i) => plan.path.get(i + 1),
            None => plan.path.get(1),
        }
    }

    /// Confirm a hop along `plan`.
    pub fn confirm_hop(&mut self, plan: &EscapePlan) -> Hop {
        let from = self.position.clone();
        if let Some(next) = self.next_hop(plan) {
            self.position = next.clone();
        }

        let arrived = plan.destination.as_ref() == Some(&self.position);
        Hop {
            from,
            to: self.position.clone(),
            arrived,
        }
    }

    /// Go back home.
    pub fn reset(&mut self) {
        self.position = self.home.clone();
    }
}

//! Single-source, multi-target shortest path search.

use std::collections::HashSet;

use ordered_float::OrderedFloat;
use pathfinding::prelude::dijkstra;
use serde::{Deserialize, Serialize};
use site_model::{Connection, SiteId, Topology};

/// A path through the topology with its total real cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub path: Vec<SiteId>,
    pub cost: f64,
}

impl Route {
    pub fn destination(&self) -> Option<&SiteId> {
        self.path.last()
    }
}

/// Find the cheapest path from `start` to any site in `targets`.
///
/// Dijkstra over site indices; the success predicate stops the search at
/// the first settled target, so that target is a cheapest reachable one.
/// Which of several equally cheap targets wins is unspecified. Returns
/// `None` when `start` is unknown or no target is reachable.
pub fn shortest_path_to_any<F>(
    topology: &Topology,
    start: &SiteId,
    targets: &HashSet<SiteId>,
    weight: F,
) -> Option<Route>
where
    F: Fn(&Connection) -> f64,
{
    let start_idx = topology.index_of(start)?;
    if targets.is_empty() {
        return None;
    }

    let is_target: Vec<bool> = topology.sites().iter().map(|s| targets.contains(s)).collect();

    let (indices, cost) = dijkstra(
        &start_idx,
        |&i| {
            topology
                .neighbors_by_index(i)
                .map(|(next, conn)| (next, OrderedFloat(weight(conn))))
                .collect::<Vec<_>>()
        },
        |&i| is_target[i],
    )?;

    Some(Route {
        path: indices
            .into_iter()
            .filter_map(|i| topology.site_at(i).cloned())
            .collect(),
        cost: cost.into_inner(),
    })
}

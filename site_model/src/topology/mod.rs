//! Topology - the fixed set of sites and the connections between them.
//!
//! Loaded once from configuration and immutable afterwards. Site order in
//! the configuration is the enumeration order used everywhere else.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::TopologyError;
use crate::sites::SiteId;

/// An undirected connection between two sites with a static base cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub a: SiteId,
    pub b: SiteId,
    /// Base traversal cost, independent of risk. Always positive.
    pub cost: f64,
}

impl Connection {
    pub fn new(a: impl Into<SiteId>, b: impl Into<SiteId>, cost: f64) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            cost,
        }
    }

    pub fn touches(&self, site: &SiteId) -> bool {
        &self.a == site || &self.b == site
    }
}

/// Unvalidated topology as read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub sites: Vec<SiteId>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl TopologyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a topology from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, TopologyError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML topology file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TopologyError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_site(mut self, id: impl Into<SiteId>) -> Self {
        self.sites.push(id.into());
        self
    }

    pub fn with_connection(mut self, a: impl Into<SiteId>, b: impl Into<SiteId>, cost: f64) -> Self {
        self.connections.push(Connection::new(a, b, cost));
        self
    }

    /// A copy with every connection touching `site` removed. The site itself stays.
    pub fn without_connections_to(&self, site: &SiteId) -> Self {
        Self {
            sites: self.sites.clone(),
            connections: self
                .connections
                .iter()
                .filter(|c| !c.touches(site))
                .cloned()
                .collect(),
        }
    }
}

/// Validated topology with a prebuilt adjacency list.
#[derive(Debug, Clone)]
pub struct Topology {
    sites: Vec<SiteId>,
    index: HashMap<SiteId, usize>,
    connections: Vec<Connection>,
    /// Site index -> (neighbor index, connection index).
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl Topology {
    /// Validate a configuration and build the adjacency list.
    pub fn build(config: TopologyConfig) -> Result<Self, TopologyError> {
        if config.sites.is_empty() {
            return Err(TopologyError::Empty);
        }

        let mut index = HashMap::with_capacity(config.sites.len());
        for (i, site) in config.sites.iter().enumerate() {
            if index.insert(site.clone(), i).is_some() {
                return Err(TopologyError::DuplicateSite(site.clone()));
            }
        }

        let mut adjacency = vec![Vec::new(); config.sites.len()];
        for (edge, conn) in config.connections.iter().enumerate() {
            let lookup = |site: &SiteId| {
                index.get(site).copied().ok_or_else(|| TopologyError::UnknownSite {
                    a: conn.a.clone(),
                    b: conn.b.clone(),
                    missing: site.clone(),
                })
            };
            let a = lookup(&conn.a)?;
            let b = lookup(&conn.b)?;

            if a == b {
                return Err(TopologyError::SelfLoop(conn.a.clone()));
            }
            if !conn.cost.is_finite() || conn.cost <= 0.0 {
                return Err(TopologyError::InvalidCost {
                    a: conn.a.clone(),
                    b: conn.b.clone(),
                    cost: conn.cost,
                });
            }

            adjacency[a].push((b, edge));
            adjacency[b].push((a, edge));
        }

        debug!(
            sites = config.sites.len(),
            connections = config.connections.len(),
            "topology built"
        );

        Ok(Self {
            sites: config.sites,
            index,
            connections: config.connections,
            adjacency,
        })
    }

    /// All sites in enumeration order.
    pub fn sites(&self) -> &[SiteId] {
        &self.sites
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    pub fn contains(&self, site: &SiteId) -> bool {
        self.index.contains_key(site)
    }

    /// Position of a site in enumeration order.
    pub fn index_of(&self, site: &SiteId) -> Option<usize> {
        self.index.get(site).copied()
    }

    pub fn site_at(&self, index: usize) -> Option<&SiteId> {
        self.sites.get(index)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Neighbors of a site with the connection leading to each.
    /// Unknown sites have no neighbors.
    pub fn neighbors<'a>(
        &'a self,
        site: &SiteId,
    ) -> impl Iterator<Item = (&'a SiteId, &'a Connection)> + 'a {
        self.index_of(site)
            .into_iter()
            .flat_map(move |i| self.neighbors_by_index(i))
            .map(move |(n, conn)| (&self.sites[n], conn))
    }

    /// Index-based variant of [`Topology::neighbors`] for search loops.
    pub fn neighbors_by_index(&self, index: usize) -> impl Iterator<Item = (usize, &Connection)> {
        self.adjacency
            .get(index)
            .map(|adj| adj.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&(n, edge)| (n, &self.connections[edge]))
    }

}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_build_adjacency() {
        let topology = Topology::build(four_sites()).unwrap();
        assert_eq!(topology.site_count(), 4);
        assert_eq!(topology.connections().len(), 5);

        let p2 = SiteId::new("P2");
        let neighbors: Vec<_> = topology.neighbors(&p2).map(|(n, _)| n.as_str()).collect();
        assert_eq!(neighbors, vec!["P1", "P3", "P4"]);

        let p4 = SiteId::new("P4");
        let (_, conn) = topology
            .neighbors(&p4)
            .find(|(n, _)| n.as_str() == "P3")
            .unwrap();
        assert_eq!(conn.cost, 7.0);
    }

    #[test]
    fn test_enumeration_order_preserved() {
        let topology = Topology::build(four_sites()).unwrap();
        assert_eq!(topology.index_of(&SiteId::new("P3")), Some(2));
        assert_eq!(topology.site_at(0), Some(&SiteId::new("P1")));
        assert!(topology.contains(&SiteId::new("P4")));
        assert!(!topology.contains(&SiteId::new("P9")));
    }

    #[test]
    fn test_unknown_site_has_no_neighbors() {
        let topology = Topology::build(four_sites()).unwrap();
        assert_eq!(topology.neighbors(&SiteId::new("nowhere")).count(), 0);
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let config = four_sites().with_connection("P1", "P9", 1.0);
        let err = Topology::build(config).unwrap_err();
        assert!(matches!(err, TopologyError::UnknownSite { missing, .. } if missing.as_str() == "P9"));
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(matches!(
            Topology::build(TopologyConfig::new()),
            Err(TopologyError::Empty)
        ));
        assert!(matches!(
            Topology::build(four_sites().with_site("P1")),
            Err(TopologyError::DuplicateSite(_))
        ));
        assert!(matches!(
            Topology::build(four_sites().with_connection("P2", "P2", 1.0)),
            Err(TopologyError::SelfLoop(_))
        ));
        assert!(matches!(
            Topology::build(four_sites().with_connection("P1", "P4", 0.0)),
            Err(TopologyError::InvalidCost { .. })
        ));
        assert!(matches!(
            Topology::build(four_sites().with_connection("P1", "P4", f64::NAN)),
            Err(TopologyError::InvalidCost { .. })
        ));
    }

    #[test]
    fn test_without_connections_to() {
        let config = four_sites().without_connections_to(&SiteId::new("P4"));
        assert_eq!(config.sites.len(), 4);
        assert_eq!(config.connections.len(), 3);

        let topology = Topology::build(config).unwrap();
        assert_eq!(topology.neighbors(&SiteId::new("P4")).count(), 0);
    }

    #[test]
    fn test_connection_touches_both_endpoints() {
        let conn = Connection::new("P1", "P3", 9.0);

        assert!(conn.touches(&SiteId::new("P1")));
        assert!(conn.touches(&SiteId::new("P3")));
        assert!(!conn.touches(&SiteId::new("P2")));
    }

    #[test]
    fn test_from_toml() {
        let config = TopologyConfig::from_toml_str(
            r#"
            sites = ["A", "B", "C"]

            [[connections]]
            a = "A"
            b = "B"
            cost = 2.5

            [[connections]]
            a = "B"
            b = "C"
            cost = 4.0
            "#,
        )
        .unwrap();

        let topology = Topology::build(config).unwrap();
        assert_eq!(topology.site_count(), 3);
        assert_eq!(topology.connections()[0].cost, 2.5);
        assert_eq!(topology.connections().len(), 2);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            TopologyConfig::from_toml_str("sites = 3"),
            Err(TopologyError::Parse(_))
        ));
    }
}

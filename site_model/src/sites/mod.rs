//! Site definitions and their observation bundles.

mod observation;
mod site;

pub use observation::*;
pub use site::*;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a monitored site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub String);

impl SiteId {
    /// Create a site ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SiteId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SiteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_id_display() {
        let id = SiteId::new("P1");
        assert_eq!(id.as_str(), "P1");
        assert_eq!(id.to_string(), "P1");
    }

    #[test]
    fn test_site_id_serializes_as_plain_string() {
        let id: SiteId = "P3".into();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"P3\"");

        let back: SiteId = serde_json::from_str("\"P3\"").unwrap();
        assert_eq!(back, id);
    }
}

//! Authority-node topology, keyed by network name.
//!
//! Parsed from a JSON document of the form
//! `{ "<network>": { "authorityNodes": [{ "hostname": .., "walletAddress": .. }] } }`.
//! The document's key order is preserved because identity lookup is
//! first-match in enumeration order.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

use crate::TypesError;

/// One authority node of a network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityNode {
    pub hostname: String,
    pub wallet_address: String,
}

/// Per-network settings. Only the authority-node list is read here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    #[serde(default)]
    pub authority_nodes: Vec<AuthorityNode>,
}

/// Ordered mapping of network name to its configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkTopology {
    networks: Vec<(String, NetworkConfig)>,
}

impl NetworkTopology {
    pub fn from_json_str(s: &str) -> Result<Self, TypesError> {
        serde_json::from_str(s).map_err(|e| TypesError::Topology(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, TypesError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TypesError::Topology(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&content)
    }

    /// Networks in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NetworkConfig)> {
        self.networks.iter().map(|(name, cfg)| (name.as_str(), cfg))
    }

    /// First authority node with this hostname: first network in document
    /// order, then first node in that network's list.
    pub fn find_authority_node(&self, hostname: &str) -> Option<(&str, &AuthorityNode)> {
        self.iter().find_map(|(network, cfg)| {
            cfg.authority_nodes
                .iter()
                .find(|node| node.hostname == hostname)
                .map(|node| (network, node))
        })
    }
}

impl Serialize for NetworkTopology {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.networks.len()))?;
        for (name, cfg) in &self.networks {
            map.serialize_entry(name, cfg)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NetworkTopology {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TopologyVisitor;

        impl<'de> Visitor<'de> for TopologyVisitor {
            type Value = NetworkTopology;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of network name to network configuration")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut networks = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, cfg)) = access.next_entry::<String, NetworkConfig>()? {
                    networks.push((name, cfg));
                }
                Ok(NetworkTopology { networks })
            }
        }

        deserializer.deserialize_map(TopologyVisitor)
    }
}

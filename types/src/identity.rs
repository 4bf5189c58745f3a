//! The identity under which this node tags audit records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Network name plus `hostname:walletAddress` of the matching authority node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub network: String,
    pub node_id: String,
}

impl NodeIdentity {
    pub fn new(network: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            node_id: node_id.into(),
        }
    }

    /// Build the node id from an authority node's hostname and wallet address.
    pub fn from_authority_node(network: &str, hostname: &str, wallet_address: &str) -> Self {
        Self::new(network, format!("{hostname}:{wallet_address}"))
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.node_id, self.network)
    }
}

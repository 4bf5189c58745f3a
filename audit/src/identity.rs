//! Node identity resolution from the certificate path and network topology.
//!
//! The certificate lives at `<...>/<hostname>/<file>`, e.g.
//! `/etc/letsencrypt/live/n4.example.org/fullchain.pem`. The hostname is looked
//! up among every network's authority nodes; the first match wins.

use std::path::PathBuf;

use custody_types::{NetworkTopology, NodeIdentity};

use crate::AuditError;

/// Where the network topology comes from.
#[derive(Clone, Debug)]
pub enum TopologySource {
    Inline(NetworkTopology),
    /// Re-read on every resolution attempt, so a corrected file takes effect
    /// without a restart.
    File(PathBuf),
}

/// The second-to-last `/`-separated segment of a certificate path.
pub fn hostname_from_cert_path(cert_path: &str) -> Option<&str> {
    let mut segments = cert_path.rsplit('/');
    segments.next()?;
    segments.next().filter(|hostname| !hostname.is_empty())
}

/// Derives this node's [`NodeIdentity`]. Caching is the caller's business.
#[derive(Clone, Debug)]
pub struct IdentityResolver {
    cert_path: String,
    topology: TopologySource,
}

impl IdentityResolver {
    pub fn new(cert_path: impl Into<String>, topology: TopologySource) -> Self {
        Self {
            cert_path: cert_path.into(),
            topology,
        }
    }

    pub fn resolve(&self) -> Result<NodeIdentity, AuditError> {
        let hostname = hostname_from_cert_path(&self.cert_path).ok_or_else(|| {
            AuditError::Identity(format!(
                "certificate path {:?} has no hostname segment",
                self.cert_path
            ))
        })?;

        let loaded;
        let topology = match &self.topology {
            TopologySource::Inline(topology) => topology,
            TopologySource::File(path) => {
                loaded = NetworkTopology::from_json_file(path)
                    .map_err(|e| AuditError::Identity(e.to_string()))?;
                &loaded
            }
        };

        let (network, node) =
            topology
                .find_authority_node(hostname)
                .ok_or_else(|| AuditError::NodeNotFound {
                    hostname: hostname.to_string(),
                })?;
        Ok(NodeIdentity::from_authority_node(
            network,
            &node.hostname,
            &node.wallet_address,
        ))
    }
}

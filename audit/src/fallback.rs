//! Append-only local file used when the audit store is unreachable.
//!
//! Entry format:
//!
//! ```text
//! [2026-01-01T00:00:00.000Z] <node_id> <network> <type>: <message>
//! { ...pretty-printed details... }
//! ```

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

use custody_types::NodeIdentity;

use crate::{AuditError, AuditEvent};

/// Tag written in place of the node id and network before identity resolves.
pub const UNRESOLVED: &str = "unresolved";

#[derive(Clone, Debug)]
pub struct FallbackLog {
    path: PathBuf,
}

impl FallbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `event`, which could not be mirrored because of `cause`.
    pub fn append(
        &self,
        identity: Option<&NodeIdentity>,
        event: &AuditEvent,
        cause: &AuditError,
    ) -> Result<(), AuditError> {
        let message = format!("{} ({cause})", event.summary());
        let entry = format_entry(
            Utc::now(),
            identity,
            event.log_type(),
            &message,
            Some(&event.details()),
        );

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(entry.as_bytes())?;
        Ok(())
    }
}

/// Render one log entry, terminated by a newline.
pub fn format_entry(
    timestamp: DateTime<Utc>,
    identity: Option<&NodeIdentity>,
    log_type: &str,
    message: &str,
    details: Option<&serde_json::Value>,
) -> String {
    let (node_id, network) = identity
        .map(|id| (id.node_id.as_str(), id.network.as_str()))
        .unwrap_or((UNRESOLVED, UNRESOLVED));
    let mut entry = format!(
        "[{}] {node_id} {network} {log_type}: {message}\n",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    );
    if let Some(details) = details {
        let pretty = serde_json::to_string_pretty(details).unwrap_or_else(|_| details.to_string());
        entry.push_str(&pretty);
        entry.push('\n');
    }
    entry
}

//! Custody service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use custody_audit::AuditCredentials;

use crate::LedgerError;

/// Configuration for the custody ledger service.
///
/// Can be loaded from a TOML file via [`CustodyConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustodyConfig {
    #[serde(default)]
    pub primary: PrimaryStoreConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// The authoritative SQLite store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrimaryStoreConfig {
    #[serde(default = "default_primary_path")]
    pub path: PathBuf,
}

/// The best-effort MySQL audit mirror.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Where audit events go when the audit store cannot take them.
    #[serde(default = "default_fallback_log")]
    pub fallback_log: PathBuf,

    #[serde(default = "default_credentials")]
    pub credentials: AuditCredentials,
}

/// Inputs for deriving this node's identity tags.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// TLS certificate path; its parent directory names this host.
    #[serde(default = "default_cert_path")]
    pub cert_path: String,

    /// Network topology JSON document.
    #[serde(default = "default_networks_file")]
    pub networks_file: PathBuf,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_primary_path() -> PathBuf {
    PathBuf::from("./custody_data/custody.db")
}

fn default_fallback_log() -> PathBuf {
    PathBuf::from("./custody_data/audit_fallback.log")
}

fn default_credentials() -> AuditCredentials {
    AuditCredentials {
        host: "localhost".to_string(),
        user: "custody".to_string(),
        password: String::new(),
        database: "custody_audit".to_string(),
        port: 3306,
    }
}

fn default_cert_path() -> String {
    "/etc/letsencrypt/live/localhost/fullchain.pem".to_string()
}

fn default_networks_file() -> PathBuf {
    PathBuf::from("./settings/networks.json")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CustodyConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, LedgerError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LedgerError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, LedgerError> {
        toml::from_str(s).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, LedgerError> {
        toml::to_string_pretty(self).map_err(|e| LedgerError::Config(e.to_string()))
    }
}

impl Default for CustodyConfig {
    fn default() -> Self {
        Self {
            primary: PrimaryStoreConfig::default(),
            audit: AuditConfig::default(),
            identity: IdentityConfig::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

impl Default for PrimaryStoreConfig {
    fn default() -> Self {
        Self {
            path: default_primary_path(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            fallback_log: default_fallback_log(),
            credentials: default_credentials(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            cert_path: default_cert_path(),
            networks_file: default_networks_file(),
        }
    }
}

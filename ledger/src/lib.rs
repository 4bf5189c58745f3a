//! Custody ledger service: the facade the rest of the bridge talks to.
//!
//! The service composes the authoritative primary store with the audit mirror:
//! - Reads are served from the primary store only
//! - Every mutation commits to the primary store first, then is mirrored
//! - Audit failures are logged and never reach the caller
//! - Batches apply element by element; a failure leaves the applied prefix in place

pub mod config;
pub mod error;
pub mod logging;
pub mod service;

pub use config::{AuditConfig, CustodyConfig, IdentityConfig, PrimaryStoreConfig};
pub use error::LedgerError;
pub use logging::{init_logging, LogFormat};
pub use service::{build_audit_mirror, LedgerService};

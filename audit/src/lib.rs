//! Best-effort audit mirror for the custodial bridge ledger.
//!
//! Every primary-store mutation is mirrored into a secondary, non-authoritative
//! store tagged with this node's identity. When the secondary store cannot be
//! reached the event goes to an append-only fallback file; when that fails too
//! the loss is reported through `tracing` and nothing else happens. No error
//! ever leaves [`AuditMirror`].

pub mod backend;
pub mod error;
pub mod event;
pub mod fallback;
pub mod identity;
pub mod mirror;
pub mod mysql;
pub mod schema;

pub use backend::AuditBackend;
pub use error::AuditError;
pub use event::AuditEvent;
pub use fallback::FallbackLog;
pub use identity::{hostname_from_cert_path, IdentityResolver, TopologySource};
pub use mirror::AuditMirror;
pub use mysql::{AuditCredentials, MysqlAuditBackend};

//! Secondary audit store abstraction.

use async_trait::async_trait;

use custody_types::NodeIdentity;

use crate::{AuditError, AuditEvent};

/// A secondary store that audit events are mirrored into.
///
/// Implementations keep their own connection. A failed `connect` leaves the
/// backend disconnected; the mirror tries again on its next call.
#[async_trait]
pub trait AuditBackend: Send {
    fn is_connected(&self) -> bool;

    async fn connect(&mut self) -> Result<(), AuditError>;

    /// Write one event tagged with `identity`. Only called while connected.
    async fn write(&mut self, identity: &NodeIdentity, event: &AuditEvent)
        -> Result<(), AuditError>;

    async fn close(&mut self) -> Result<(), AuditError>;
}

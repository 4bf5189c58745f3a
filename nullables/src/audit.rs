//! Nullable audit backend: in-memory secondary store with failure injection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use custody_audit::{AuditBackend, AuditError, AuditEvent};
use custody_types::NodeIdentity;

#[derive(Default)]
struct Shared {
    events: Mutex<Vec<(NodeIdentity, AuditEvent)>>,
    fail_connect: AtomicBool,
    fail_writes: AtomicBool,
    connect_attempts: AtomicUsize,
}

/// Inspection and control handle, kept by the test after the backend is
/// boxed and handed to the mirror.
#[derive(Clone, Default)]
pub struct AuditRecorder {
    shared: Arc<Shared>,
}

impl AuditRecorder {
    /// Every event written so far, with the identity it was tagged with.
    pub fn events(&self) -> Vec<(NodeIdentity, AuditEvent)> {
        self.shared.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn event_count(&self) -> usize {
        self.shared.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn connect_attempts(&self) -> usize {
        self.shared.connect_attempts.load(Ordering::SeqCst)
    }

    /// Make subsequent `connect` calls fail (or succeed again).
    pub fn set_unreachable(&self, unreachable: bool) {
        self.shared.fail_connect.store(unreachable, Ordering::SeqCst);
    }

    /// Make subsequent `write` calls fail (or succeed again).
    pub fn set_failing_writes(&self, failing: bool) {
        self.shared.fail_writes.store(failing, Ordering::SeqCst);
    }
}

/// An in-memory audit store for testing.
pub struct NullAuditBackend {
    connected: bool,
    recorder: AuditRecorder,
}

impl NullAuditBackend {
    pub fn new() -> Self {
        Self {
            connected: false,
            recorder: AuditRecorder::default(),
        }
    }

    /// A backend whose connect always fails until told otherwise.
    pub fn unreachable() -> Self {
        let backend = Self::new();
        backend.recorder.set_unreachable(true);
        backend
    }

    pub fn recorder(&self) -> AuditRecorder {
        self.recorder.clone()
    }
}

impl Default for NullAuditBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditBackend for NullAuditBackend {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self) -> Result<(), AuditError> {
        let shared = &self.recorder.shared;
        shared.connect_attempts.fetch_add(1, Ordering::SeqCst);
        if shared.fail_connect.load(Ordering::SeqCst) {
            return Err(AuditError::Connect("null audit store is unreachable".to_string()));
        }
        self.connected = true;
        Ok(())
    }

    async fn write(
        &mut self,
        identity: &NodeIdentity,
        event: &AuditEvent,
    ) -> Result<(), AuditError> {
        if self.recorder.shared.fail_writes.load(Ordering::SeqCst) {
            return Err(AuditError::Write("null audit store rejected write".to_string()));
        }
        self.recorder
            .shared
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((identity.clone(), event.clone()));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), AuditError> {
        self.connected = false;
        Ok(())
    }
}

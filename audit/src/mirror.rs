//! The audit mirror: best-effort replication of ledger mutations.
//!
//! Each call resolves (and caches) the node identity, connects to the audit
//! store if needed, and writes the event. Any failure on that path sends the
//! event to the fallback log instead; a failure there is reported at `error`
//! level. The public methods return `()`.

use tokio::sync::Mutex;

use custody_types::{DecimalAmount, NodeIdentity};

use crate::{AuditBackend, AuditError, AuditEvent, FallbackLog, IdentityResolver};

struct MirrorState {
    backend: Box<dyn AuditBackend>,
    /// Set once, on the first successful resolution.
    identity: Option<NodeIdentity>,
}

impl MirrorState {
    fn identity(&mut self, resolver: &IdentityResolver) -> Result<NodeIdentity, AuditError> {
        if let Some(identity) = &self.identity {
            return Ok(identity.clone());
        }
        let identity = resolver.resolve()?;
        tracing::info!(
            node_id = %identity.node_id,
            network = %identity.network,
            "resolved node identity"
        );
        self.identity = Some(identity.clone());
        Ok(identity)
    }

    async fn try_record(
        &mut self,
        resolver: &IdentityResolver,
        event: &AuditEvent,
    ) -> Result<(), AuditError> {
        let identity = self.identity(resolver)?;
        if !self.backend.is_connected() {
            self.backend.connect().await?;
        }
        self.backend.write(&identity, event).await
    }
}

pub struct AuditMirror {
    state: Mutex<MirrorState>,
    resolver: IdentityResolver,
    fallback: FallbackLog,
}

impl AuditMirror {
    pub fn new(
        backend: Box<dyn AuditBackend>,
        resolver: IdentityResolver,
        fallback: FallbackLog,
    ) -> Self {
        Self {
            state: Mutex::new(MirrorState {
                backend,
                identity: None,
            }),
            resolver,
            fallback,
        }
    }

    /// Connect eagerly. A failure is logged and retried on the next event.
    pub async fn connect(&self) {
        let mut state = self.state.lock().await;
        if state.backend.is_connected() {
            return;
        }
        if let Err(e) = state.backend.connect().await {
            tracing::warn!(error = %e, "audit store unavailable");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.backend.is_connected()
    }

    /// The cached identity, resolving it now if it has not been resolved yet.
    pub async fn identity(&self) -> Option<NodeIdentity> {
        let mut state = self.state.lock().await;
        match state.identity(&self.resolver) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!(error = %e, "node identity unavailable");
                None
            }
        }
    }

    pub async fn log_used_deposit_address(&self, address: &str) {
        self.record(AuditEvent::UsedDepositAddress {
            address: address.to_string(),
        })
        .await
    }

    pub async fn log_mint_deposit_address(
        &self,
        mint_address: &str,
        deposit_address: &str,
        redeem_script: &str,
        approved_tax: &DecimalAmount,
    ) {
        self.record(AuditEvent::MintDepositAddress {
            mint_address: mint_address.to_string(),
            deposit_address: deposit_address.to_string(),
            redeem_script: redeem_script.to_string(),
            approved_tax: approved_tax.clone(),
        })
        .await
    }

    pub async fn update_mint_deposit_address(
        &self,
        deposit_address: &str,
        approved_tax: &DecimalAmount,
    ) {
        self.record(AuditEvent::MintDepositAddressUpdated {
            deposit_address: deposit_address.to_string(),
            approved_tax: approved_tax.clone(),
        })
        .await
    }

    pub async fn log_withdrawal(
        &self,
        burn_address: &str,
        burn_index: u32,
        approved_amount: &DecimalAmount,
        approved_tax: &DecimalAmount,
    ) {
        self.record(AuditEvent::Withdrawal {
            burn_address: burn_address.to_string(),
            burn_index,
            approved_amount: approved_amount.clone(),
            approved_tax: approved_tax.clone(),
        })
        .await
    }

    pub async fn update_withdrawal(
        &self,
        burn_address: &str,
        burn_index: u32,
        approved_amount: &DecimalAmount,
        approved_tax: &DecimalAmount,
    ) {
        self.record(AuditEvent::WithdrawalUpdated {
            burn_address: burn_address.to_string(),
            burn_index,
            approved_amount: approved_amount.clone(),
            approved_tax: approved_tax.clone(),
        })
        .await
    }

    /// Free-form diagnostic entry for the `debug_logs` table.
    pub async fn log_debug(
        &self,
        log_type: &str,
        message: &str,
        details: Option<serde_json::Value>,
    ) {
        self.record(AuditEvent::Debug {
            log_type: log_type.to_string(),
            message: message.to_string(),
            details,
        })
        .await
    }

    /// Mirror one event. Never fails.
    pub async fn record(&self, event: AuditEvent) {
        let mut state = self.state.lock().await;
        let Err(cause) = state.try_record(&self.resolver, &event).await else {
            return;
        };
        tracing::warn!(
            event = event.kind(),
            error = %cause,
            fallback = %self.fallback.path().display(),
            "audit store write failed, using fallback log"
        );

        if let Err(fallback_err) = self.fallback.append(state.identity.as_ref(), &event, &cause) {
            let lost = AuditError::MirrorUnavailable {
                write: cause.to_string(),
                fallback: fallback_err.to_string(),
            };
            tracing::error!(
                event = event.kind(),
                details = %event.details(),
                error = %lost,
                "audit record dropped"
            );
        }
    }

    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if let Err(e) = state.backend.close().await {
            tracing::warn!(error = %e, "failed to close audit store connection");
        }
    }
}

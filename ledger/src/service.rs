//! The ledger service: primary-commit-then-mirror over a [`LedgerStore`].

use std::path::Path;

use serde_json::json;

use custody_audit::{AuditMirror, FallbackLog, IdentityResolver, MysqlAuditBackend, TopologySource};
use custody_store::{LedgerStore, StoreError};
use custody_store_sqlite::SqliteLedgerStore;
use custody_types::{
    DecimalAmount, MintDepositAddress, MintDepositAddressUpdate, Withdrawal, WithdrawalUpdate,
};

use crate::{CustodyConfig, LedgerError};

/// Log type of the diagnostic record written when a batch stops part way.
const BATCH_ABORTED: &str = "batch_aborted";

/// Facade over the primary store and the audit mirror.
///
/// Reads never touch the mirror. Each successful primary write is followed
/// by exactly one mirror call for the same change; a failed primary write
/// is never mirrored.
pub struct LedgerService<S> {
    store: S,
    mirror: AuditMirror,
}

/// Wire the MySQL audit backend, identity resolver and fallback log from config.
pub fn build_audit_mirror(config: &CustodyConfig) -> AuditMirror {
    let backend = MysqlAuditBackend::new(config.audit.credentials.clone());
    let resolver = IdentityResolver::new(
        config.identity.cert_path.clone(),
        TopologySource::File(config.identity.networks_file.clone()),
    );
    let fallback = FallbackLog::new(config.audit.fallback_log.clone());
    AuditMirror::new(Box::new(backend), resolver, fallback)
}

impl LedgerService<SqliteLedgerStore> {
    /// Open the SQLite primary store and connect the audit mirror.
    ///
    /// Only a primary store failure is fatal; the mirror connects best-effort.
    pub async fn open(config: &CustodyConfig) -> Result<Self, LedgerError> {
        let path = config.primary.path.as_path();
        create_parent_dir(path)?;
        let store = SqliteLedgerStore::open(path).map_err(StoreError::from)?;

        let mirror = build_audit_mirror(config);
        mirror.connect().await;
        Ok(Self::new(store, mirror))
    }
}

fn create_parent_dir(path: &Path) -> Result<(), LedgerError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

impl<S: LedgerStore> LedgerService<S> {
    pub fn new(store: S, mirror: AuditMirror) -> Self {
        Self { store, mirror }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn mirror(&self) -> &AuditMirror {
        &self.mirror
    }

    /// Close the audit connection. The primary store closes on drop.
    pub async fn close(&self) {
        self.mirror.close().await;
    }

    // ── Used deposit addresses ─────────────────────────────────────────

    /// True if ANY of `addresses` was already used. Empty input is `false`.
    pub fn has_used_deposit_addresses(&self, addresses: &[String]) -> Result<bool, LedgerError> {
        require_each("deposit address", addresses.iter().map(String::as_str))?;
        Ok(self.store.has_used_deposit_addresses(addresses)?)
    }

    /// Record each address as used, in order. Stops at the first failure,
    /// leaving the earlier addresses registered.
    pub async fn register_used_deposit_addresses(
        &self,
        addresses: &[String],
    ) -> Result<(), LedgerError> {
        require_each("deposit address", addresses.iter().map(String::as_str))?;
        for (applied, address) in addresses.iter().enumerate() {
            if let Err(e) = self.store.register_used_deposit_address(address) {
                self.batch_aborted("register_used_deposit_addresses", applied, addresses.len(), &e)
                    .await;
                return Err(e.into());
            }
            self.mirror.log_used_deposit_address(address).await;
        }
        Ok(())
    }

    /// Issue fresh deposit addresses: refuse the whole list if any is used,
    /// otherwise register them.
    pub async fn claim_deposit_addresses(&self, addresses: &[String]) -> Result<(), LedgerError> {
        if self.has_used_deposit_addresses(addresses)? {
            let reused = self.first_used_deposit_address(addresses)?;
            tracing::warn!(address = %reused, "refusing to reissue deposit address");
            return Err(LedgerError::DepositAddressReused(reused));
        }
        self.register_used_deposit_addresses(addresses).await
    }

    fn first_used_deposit_address(&self, addresses: &[String]) -> Result<String, LedgerError> {
        for address in addresses {
            if self
                .store
                .has_used_deposit_addresses(std::slice::from_ref(address))?
            {
                return Ok(address.clone());
            }
        }
        Err(LedgerError::Storage(StoreError::DataIntegrity(
            "used deposit address vanished during lookup".to_string(),
        )))
    }

    // ── Mint deposit addresses ─────────────────────────────────────────

    /// Bind `mint_address` to `deposit_address` with a zero approved tax.
    pub async fn register_mint_deposit_address(
        &self,
        mint_address: &str,
        deposit_address: &str,
        redeem_script: &str,
    ) -> Result<(), LedgerError> {
        require("mint address", mint_address)?;
        require("deposit address", deposit_address)?;

        self.store
            .register_mint_deposit_address(mint_address, deposit_address, redeem_script)?;
        tracing::debug!(
            mint_address = %mint_address,
            deposit_address = %deposit_address,
            "mint deposit address registered"
        );
        self.mirror
            .log_mint_deposit_address(
                mint_address,
                deposit_address,
                redeem_script,
                &DecimalAmount::zero(),
            )
            .await;
        Ok(())
    }

    pub fn get_mint_deposit_address(
        &self,
        mint_address: &str,
    ) -> Result<Option<String>, LedgerError> {
        require("mint address", mint_address)?;
        Ok(self.store.get_mint_deposit_address(mint_address)?)
    }

    /// All bindings, or only those whose deposit address is in `filter`.
    pub fn get_mint_deposit_addresses(
        &self,
        filter: Option<&[String]>,
    ) -> Result<Vec<MintDepositAddress>, LedgerError> {
        Ok(self.store.get_mint_deposit_addresses(filter)?)
    }

    /// Set the approved tax of each binding, in order. Stops at the first failure.
    pub async fn update_mint_deposit_addresses(
        &self,
        updates: &[MintDepositAddressUpdate],
    ) -> Result<(), LedgerError> {
        let updates = updates
            .iter()
            .map(|update| {
                require("deposit address", &update.deposit_address)?;
                Ok(MintDepositAddressUpdate {
                    deposit_address: update.deposit_address.clone(),
                    approved_tax: canonical(&update.approved_tax)?,
                })
            })
            .collect::<Result<Vec<_>, LedgerError>>()?;

        for (applied, update) in updates.iter().enumerate() {
            if let Err(e) = self.store.update_mint_deposit_address(update) {
                self.batch_aborted("update_mint_deposit_addresses", applied, updates.len(), &e)
                    .await;
                return Err(e.into());
            }
            self.mirror
                .update_mint_deposit_address(&update.deposit_address, &update.approved_tax)
                .await;
        }
        Ok(())
    }

    // ── Withdrawals ────────────────────────────────────────────────────

    /// Record a burn with zero approved amount and tax.
    pub async fn register_withdrawal(
        &self,
        burn_address: &str,
        burn_index: u32,
    ) -> Result<(), LedgerError> {
        require("burn address", burn_address)?;

        self.store.register_withdrawal(burn_address, burn_index)?;
        tracing::debug!(burn_address = %burn_address, burn_index, "withdrawal registered");
        let zero = DecimalAmount::zero();
        self.mirror
            .log_withdrawal(burn_address, burn_index, &zero, &zero)
            .await;
        Ok(())
    }

    pub fn get_withdrawal(
        &self,
        burn_address: &str,
        burn_index: u32,
    ) -> Result<Option<Withdrawal>, LedgerError> {
        require("burn address", burn_address)?;
        Ok(self.store.get_withdrawal(burn_address, burn_index)?)
    }

    pub fn get_withdrawals(&self) -> Result<Vec<Withdrawal>, LedgerError> {
        Ok(self.store.get_withdrawals()?)
    }

    /// Withdrawals whose approved tax is still exactly `"0"`.
    pub fn get_unapproved_withdrawals(&self) -> Result<Vec<Withdrawal>, LedgerError> {
        Ok(self.store.get_unapproved_withdrawals()?)
    }

    /// Set approved amount and tax of each withdrawal, in order. Stops at the
    /// first failure.
    pub async fn update_withdrawals(&self, updates: &[WithdrawalUpdate]) -> Result<(), LedgerError> {
        let updates = updates
            .iter()
            .map(|update| {
                require("burn address", &update.burn_address)?;
                Ok(WithdrawalUpdate {
                    burn_address: update.burn_address.clone(),
                    burn_index: update.burn_index,
                    approved_amount: canonical(&update.approved_amount)?,
                    approved_tax: canonical(&update.approved_tax)?,
                })
            })
            .collect::<Result<Vec<_>, LedgerError>>()?;

        for (applied, update) in updates.iter().enumerate() {
            if let Err(e) = self.store.update_withdrawal(update) {
                self.batch_aborted("update_withdrawals", applied, updates.len(), &e)
                    .await;
                return Err(e.into());
            }
            self.mirror
                .update_withdrawal(
                    &update.burn_address,
                    update.burn_index,
                    &update.approved_amount,
                    &update.approved_tax,
                )
                .await;
        }
        Ok(())
    }

    /// Leaves a diagnostic trail when a batch stopped with part of it applied.
    async fn batch_aborted(
        &self,
        operation: &str,
        applied: usize,
        total: usize,
        error: &StoreError,
    ) {
        tracing::warn!(operation, applied, total, error = %error, "batch aborted");
        if applied == 0 {
            return;
        }
        self.mirror
            .log_debug(
                BATCH_ABORTED,
                &format!("{operation} stopped after {applied} of {total}"),
                Some(json!({
                    "operation": operation,
                    "applied": applied,
                    "total": total,
                    "error": error.to_string(),
                })),
            )
            .await;
    }
}

fn require(what: &str, value: &str) -> Result<(), LedgerError> {
    if value.is_empty() {
        return Err(LedgerError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(())
}

fn require_each<'a>(what: &str, values: impl IntoIterator<Item = &'a str>) -> Result<(), LedgerError> {
    values.into_iter().try_for_each(|value| require(what, value))
}

/// Re-parse so a zero built with `from_stored` still compares equal to `"0"`.
fn canonical(amount: &DecimalAmount) -> Result<DecimalAmount, LedgerError> {
    Ok(DecimalAmount::parse(amount.as_str())?)
}

//! Ledger service behaviour against the SQLite store and a null audit backend.

use custody_audit::{AuditEvent, AuditMirror, FallbackLog, IdentityResolver, TopologySource};
use custody_ledger::{LedgerError, LedgerService};
use custody_nullables::{AuditRecorder, NullAuditBackend};
use custody_store::StoreError;
use custody_store_sqlite::SqliteLedgerStore;
use custody_types::{
    DecimalAmount, MintDepositAddress, MintDepositAddressUpdate, NetworkTopology, NodeIdentity,
    WithdrawalUpdate,
};

const TOPOLOGY: &str = r#"{
    "dingo": {
        "authorityNodes": [
            { "hostname": "n4.dingocoin.org", "walletAddress": "0xBBB" }
        ]
    }
}"#;

const CERT_PATH: &str = "/etc/letsencrypt/live/n4.dingocoin.org/fullchain.pem";

struct Harness {
    service: LedgerService<SqliteLedgerStore>,
    recorder: AuditRecorder,
    _dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let backend = NullAuditBackend::new();
    let recorder = backend.recorder();
    let topology = NetworkTopology::from_json_str(TOPOLOGY).unwrap();
    let mirror = AuditMirror::new(
        Box::new(backend),
        IdentityResolver::new(CERT_PATH, TopologySource::Inline(topology)),
        FallbackLog::new(dir.path().join("audit_fallback.log")),
    );
    let store = SqliteLedgerStore::in_memory().unwrap();
    Harness {
        service: LedgerService::new(store, mirror),
        recorder,
        _dir: dir,
    }
}

fn addresses(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn amount(s: &str) -> DecimalAmount {
    DecimalAmount::parse(s).unwrap()
}

fn events(recorder: &AuditRecorder) -> Vec<AuditEvent> {
    recorder.events().into_iter().map(|(_, event)| event).collect()
}

// ── Used deposit addresses ─────────────────────────────────────────────

#[tokio::test]
async fn used_addresses_are_visible_after_registration() {
    let h = harness();
    assert!(!h.service.has_used_deposit_addresses(&addresses(&["D1"])).unwrap());

    h.service
        .register_used_deposit_addresses(&addresses(&["D1", "D2"]))
        .await
        .unwrap();

    assert!(h.service.has_used_deposit_addresses(&addresses(&["D2"])).unwrap());
    assert!(h.service.has_used_deposit_addresses(&addresses(&["X", "D1"])).unwrap());
    assert!(!h.service.has_used_deposit_addresses(&addresses(&["X", "Y"])).unwrap());
    assert!(!h.service.has_used_deposit_addresses(&[]).unwrap());
}

#[tokio::test]
async fn each_registered_address_is_mirrored_with_identity() {
    let h = harness();
    h.service
        .register_used_deposit_addresses(&addresses(&["D1", "D2"]))
        .await
        .unwrap();

    let identity = NodeIdentity::new("dingo", "n4.dingocoin.org:0xBBB");
    assert_eq!(
        h.recorder.events(),
        vec![
            (
                identity.clone(),
                AuditEvent::UsedDepositAddress { address: "D1".into() }
            ),
            (
                identity,
                AuditEvent::UsedDepositAddress { address: "D2".into() }
            ),
        ]
    );
}

#[tokio::test]
async fn batch_failure_keeps_applied_prefix() {
    let h = harness();
    let err = h
        .service
        .register_used_deposit_addresses(&addresses(&["D1", "D2", "D1", "D3"]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Storage(StoreError::ConstraintViolation(_))
    ));

    let store = h.service.store();
    assert!(h.service.has_used_deposit_addresses(&addresses(&["D2"])).unwrap());
    assert!(!h.service.has_used_deposit_addresses(&addresses(&["D3"])).unwrap());
    assert_eq!(
        custody_store::UsedDepositAddressStore::used_deposit_address_count(store).unwrap(),
        2
    );

    let mirrored = events(&h.recorder);
    assert_eq!(mirrored.len(), 3);
    assert_eq!(
        &mirrored[..2],
        &[
            AuditEvent::UsedDepositAddress { address: "D1".into() },
            AuditEvent::UsedDepositAddress { address: "D2".into() },
        ]
    );
    match &mirrored[2] {
        AuditEvent::Debug {
            log_type, details, ..
        } => {
            assert_eq!(log_type, "batch_aborted");
            let details = details.as_ref().unwrap();
            assert_eq!(details["applied"], 2);
            assert_eq!(details["total"], 4);
            assert_eq!(details["operation"], "register_used_deposit_addresses");
        }
        other => panic!("expected batch_aborted debug entry, got {other:?}"),
    }
}

#[tokio::test]
async fn claim_refuses_any_used_address_before_writing() {
    let h = harness();
    h.service
        .claim_deposit_addresses(&addresses(&["D1"]))
        .await
        .unwrap();

    let err = h
        .service
        .claim_deposit_addresses(&addresses(&["D2", "D1", "D3"]))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DepositAddressReused(ref a) if a == "D1"));
    assert!(!h.service.has_used_deposit_addresses(&addresses(&["D2", "D3"])).unwrap());
    assert_eq!(h.recorder.event_count(), 1);
}

#[tokio::test]
async fn empty_address_is_invalid_input() {
    let h = harness();
    let err = h
        .service
        .register_used_deposit_addresses(&addresses(&["D1", ""]))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));
    // Validation runs before any write.
    assert!(!h.service.has_used_deposit_addresses(&addresses(&["D1"])).unwrap());
    assert_eq!(h.recorder.event_count(), 0);
}

// ── Mint deposit addresses ─────────────────────────────────────────────

#[tokio::test]
async fn mint_binding_lifecycle() {
    let h = harness();
    h.service
        .register_mint_deposit_address("M1", "D1", "script-1")
        .await
        .unwrap();
    h.service
        .register_mint_deposit_address("M2", "D2", "script-2")
        .await
        .unwrap();

    assert_eq!(
        h.service.get_mint_deposit_address("M1").unwrap().as_deref(),
        Some("D1")
    );
    assert_eq!(h.service.get_mint_deposit_address("M9").unwrap(), None);

    h.service
        .update_mint_deposit_addresses(&[MintDepositAddressUpdate::new("D2", amount("1.5"))])
        .await
        .unwrap();

    let filter = addresses(&["D2"]);
    let bindings = h.service.get_mint_deposit_addresses(Some(&filter)).unwrap();
    assert_eq!(
        bindings,
        vec![MintDepositAddress {
            mint_address: "M2".into(),
            deposit_address: "D2".into(),
            redeem_script: "script-2".into(),
            approved_tax: amount("1.5"),
        }]
    );
    assert_eq!(h.service.get_mint_deposit_addresses(None).unwrap().len(), 2);

    assert_eq!(
        events(&h.recorder).last(),
        Some(&AuditEvent::MintDepositAddressUpdated {
            deposit_address: "D2".into(),
            approved_tax: amount("1.5"),
        })
    );
}

#[tokio::test]
async fn mint_registration_is_mirrored_with_zero_tax() {
    let h = harness();
    h.service
        .register_mint_deposit_address("M1", "D1", "script-1")
        .await
        .unwrap();
    assert_eq!(
        events(&h.recorder),
        vec![AuditEvent::MintDepositAddress {
            mint_address: "M1".into(),
            deposit_address: "D1".into(),
            redeem_script: "script-1".into(),
            approved_tax: DecimalAmount::zero(),
        }]
    );
}

#[tokio::test]
async fn failed_primary_write_is_not_mirrored() {
    let h = harness();
    h.service
        .register_mint_deposit_address("M1", "D1", "s")
        .await
        .unwrap();

    let err = h
        .service
        .register_mint_deposit_address("M2", "D1", "s")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Storage(StoreError::ConstraintViolation(_))
    ));

    let err = h
        .service
        .update_mint_deposit_addresses(&[MintDepositAddressUpdate::new("D9", amount("1"))])
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Storage(StoreError::NotFound(_))));

    assert_eq!(h.recorder.event_count(), 1);
}

// ── Withdrawals ────────────────────────────────────────────────────────

#[tokio::test]
async fn approval_flow_moves_withdrawal_out_of_unapproved() {
    let h = harness();
    h.service.register_withdrawal("B1", 0).await.unwrap();
    h.service.register_withdrawal("B1", 1).await.unwrap();
    h.service.register_withdrawal("B2", 0).await.unwrap();

    let unapproved = h.service.get_unapproved_withdrawals().unwrap();
    assert_eq!(unapproved.len(), 3);
    assert!(unapproved.iter().all(|w| w.approved_amount.is_zero()));

    h.service
        .update_withdrawals(&[WithdrawalUpdate {
            burn_address: "B1".into(),
            burn_index: 1,
            approved_amount: amount("100"),
            approved_tax: amount("2"),
        }])
        .await
        .unwrap();

    let approved = h.service.get_withdrawal("B1", 1).unwrap().unwrap();
    assert_eq!(approved.approved_amount.as_str(), "100");
    assert_eq!(approved.approved_tax.as_str(), "2");

    let unapproved: Vec<_> = h
        .service
        .get_unapproved_withdrawals()
        .unwrap()
        .into_iter()
        .map(|w| w.key())
        .collect();
    assert_eq!(unapproved.len(), 2);
    assert!(!unapproved.contains(&approved.key()));
    assert_eq!(h.service.get_withdrawals().unwrap().len(), 3);
}

#[tokio::test]
async fn non_canonical_zero_tax_stays_unapproved() {
    let h = harness();
    h.service.register_withdrawal("B1", 0).await.unwrap();
    h.service
        .update_withdrawals(&[WithdrawalUpdate {
            burn_address: "B1".into(),
            burn_index: 0,
            approved_amount: DecimalAmount::from_stored("5"),
            approved_tax: DecimalAmount::from_stored("0.00"),
        }])
        .await
        .unwrap();

    let withdrawal = h.service.get_withdrawal("B1", 0).unwrap().unwrap();
    assert_eq!(withdrawal.approved_tax.as_str(), "0");
    assert_eq!(h.service.get_unapproved_withdrawals().unwrap().len(), 1);
}

#[tokio::test]
async fn negative_amount_is_rejected_before_writing() {
    let h = harness();
    h.service.register_withdrawal("B1", 0).await.unwrap();
    let err = h
        .service
        .update_withdrawals(&[WithdrawalUpdate {
            burn_address: "B1".into(),
            burn_index: 0,
            approved_amount: DecimalAmount::from_stored("-1"),
            approved_tax: DecimalAmount::zero(),
        }])
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));
    assert_eq!(h.recorder.event_count(), 1);
}

#[tokio::test]
async fn duplicate_withdrawal_is_rejected_and_not_mirrored() {
    let h = harness();
    h.service.register_withdrawal("B1", 7).await.unwrap();
    let err = h.service.register_withdrawal("B1", 7).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Storage(StoreError::ConstraintViolation(_))
    ));
    assert_eq!(
        events(&h.recorder),
        vec![AuditEvent::Withdrawal {
            burn_address: "B1".into(),
            burn_index: 7,
            approved_amount: DecimalAmount::zero(),
            approved_tax: DecimalAmount::zero(),
        }]
    );
}

#[tokio::test]
async fn update_batch_stops_at_missing_withdrawal() {
    let h = harness();
    h.service.register_withdrawal("B1", 0).await.unwrap();
    h.service.register_withdrawal("B3", 0).await.unwrap();

    let update = |burn: &str| WithdrawalUpdate {
        burn_address: burn.into(),
        burn_index: 0,
        approved_amount: amount("10"),
        approved_tax: amount("1"),
    };
    let err = h
        .service
        .update_withdrawals(&[update("B1"), update("B2"), update("B3")])
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Storage(StoreError::NotFound(_))));

    assert_eq!(
        h.service.get_withdrawal("B1", 0).unwrap().unwrap().approved_tax.as_str(),
        "1"
    );
    assert!(h.service.get_withdrawal("B3", 0).unwrap().unwrap().approved_tax.is_zero());
}

#[tokio::test]
async fn reads_do_not_touch_the_mirror() {
    let h = harness();
    h.service.register_withdrawal("B1", 0).await.unwrap();
    let before = h.recorder.event_count();

    h.service.get_withdrawals().unwrap();
    h.service.get_unapproved_withdrawals().unwrap();
    h.service.get_withdrawal("B1", 0).unwrap();
    h.service.get_mint_deposit_addresses(None).unwrap();
    h.service.has_used_deposit_addresses(&addresses(&["D1"])).unwrap();

    assert_eq!(h.recorder.event_count(), before);
}

#[tokio::test]
async fn close_disconnects_the_mirror() {
    let h = harness();
    h.service.register_withdrawal("B1", 0).await.unwrap();
    assert!(h.service.mirror().is_connected().await);
    h.service.close().await;
    assert!(!h.service.mirror().is_connected().await);
}

#[tokio::test]
async fn high_precision_approval_is_kept() {
    let h = harness();
    h.service.register_withdrawal("B1", 0).await.unwrap();
    let tax = "0.0000000000000000000000000000001";
    let wei = "100000000000000000000000000000";
    h.service
        .update_withdrawals(&[WithdrawalUpdate {
            burn_address: "B1".into(),
            burn_index: 0,
            approved_amount: amount(wei),
            approved_tax: amount(tax),
        }])
        .await
        .unwrap();

    let withdrawal = h.service.get_withdrawal("B1", 0).unwrap().unwrap();
    assert_eq!(withdrawal.approved_amount.as_str(), wei);
    assert_eq!(withdrawal.approved_tax.as_str(), tax);
    assert!(h.service.get_unapproved_withdrawals().unwrap().is_empty());
}

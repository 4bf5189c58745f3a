//! Audit mirror degradation: unreachable audit store, unresolved identity,
//! unwritable fallback log.

use std::path::Path;

use custody_audit::{AuditEvent, AuditMirror, FallbackLog, IdentityResolver, TopologySource};
use custody_ledger::LedgerService;
use custody_nullables::{AuditRecorder, NullAuditBackend};
use custody_store_sqlite::SqliteLedgerStore;
use custody_types::{DecimalAmount, NetworkTopology, NodeIdentity, Withdrawal, WithdrawalUpdate};

const TOPOLOGY: &str = r#"{
    "doge": {
        "authorityNodes": [
            { "hostname": "n1.dogecoin.org", "walletAddress": "0xAAA" }
        ]
    },
    "dingo": {
        "authorityNodes": [
            { "hostname": "n4.dingocoin.org", "walletAddress": "0xBBB" },
            { "hostname": "n5.dingocoin.org", "walletAddress": "0xCCC" }
        ]
    }
}"#;

const CERT_PATH: &str = "/etc/letsencrypt/live/n4.dingocoin.org/fullchain.pem";

fn inline_resolver(cert_path: &str) -> IdentityResolver {
    let topology = NetworkTopology::from_json_str(TOPOLOGY).unwrap();
    IdentityResolver::new(cert_path, TopologySource::Inline(topology))
}

fn service(
    backend: NullAuditBackend,
    resolver: IdentityResolver,
    fallback: &Path,
) -> LedgerService<SqliteLedgerStore> {
    let mirror = AuditMirror::new(Box::new(backend), resolver, FallbackLog::new(fallback));
    LedgerService::new(SqliteLedgerStore::in_memory().unwrap(), mirror)
}

/// Header lines of the fallback log; detail JSON follows each one.
fn fallback_headers(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .filter(|line| line.starts_with('['))
        .map(str::to_string)
        .collect()
}

async fn exercise(service: &LedgerService<SqliteLedgerStore>) -> Vec<Withdrawal> {
    service
        .register_used_deposit_addresses(&["D1".to_string()])
        .await
        .unwrap();
    service.register_withdrawal("B1", 0).await.unwrap();
    service
        .update_withdrawals(&[WithdrawalUpdate {
            burn_address: "B1".into(),
            burn_index: 0,
            approved_amount: DecimalAmount::parse("10").unwrap(),
            approved_tax: DecimalAmount::parse("0.5").unwrap(),
        }])
        .await
        .unwrap();
    service.get_withdrawals().unwrap()
}

#[tokio::test]
async fn unreachable_audit_store_writes_one_fallback_entry_per_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = dir.path().join("logs/audit_fallback.log");
    let backend = NullAuditBackend::unreachable();
    let recorder = backend.recorder();
    let service = service(backend, inline_resolver(CERT_PATH), &fallback);

    exercise(&service).await;

    let headers = fallback_headers(&fallback);
    assert_eq!(headers.len(), 3);
    assert!(headers
        .iter()
        .all(|h| h.contains(" n4.dingocoin.org:0xBBB dingo ")));
    assert!(headers[0].contains("used_deposit_address: "));
    assert!(headers[1].contains("withdrawal: "));
    assert!(headers[2].contains("withdrawal_updated: "));
    // Reconnection is attempted on every call.
    assert_eq!(recorder.connect_attempts(), 3);
    assert_eq!(recorder.event_count(), 0);
}

#[tokio::test]
async fn ledger_results_do_not_depend_on_audit_store() {
    let dir = tempfile::tempdir().unwrap();

    let healthy = service(
        NullAuditBackend::new(),
        inline_resolver(CERT_PATH),
        &dir.path().join("a.log"),
    );
    let degraded = service(
        NullAuditBackend::unreachable(),
        inline_resolver(CERT_PATH),
        &dir.path().join("b.log"),
    );

    assert_eq!(exercise(&healthy).await, exercise(&degraded).await);
    assert!(fallback_headers(&dir.path().join("a.log")).is_empty());
    assert_eq!(fallback_headers(&dir.path().join("b.log")).len(), 3);
}

#[tokio::test]
async fn audit_store_recovers_after_outage() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = dir.path().join("audit_fallback.log");
    let backend = NullAuditBackend::unreachable();
    let recorder: AuditRecorder = backend.recorder();
    let service = service(backend, inline_resolver(CERT_PATH), &fallback);

    service.mirror().connect().await;
    assert!(!service.mirror().is_connected().await);
    service.register_withdrawal("B1", 0).await.unwrap();

    recorder.set_unreachable(false);
    service.register_withdrawal("B2", 0).await.unwrap();

    assert_eq!(fallback_headers(&fallback).len(), 1);
    assert_eq!(recorder.event_count(), 1);
    assert!(service.mirror().is_connected().await);
}

#[tokio::test]
async fn failed_audit_write_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = dir.path().join("audit_fallback.log");
    let backend = NullAuditBackend::new();
    let recorder = backend.recorder();
    recorder.set_failing_writes(true);
    let service = service(backend, inline_resolver(CERT_PATH), &fallback);

    service.register_withdrawal("B1", 0).await.unwrap();

    let headers = fallback_headers(&fallback);
    assert_eq!(headers.len(), 1);
    assert!(headers[0].contains("rejected write"));
}

#[tokio::test]
async fn unknown_host_is_tagged_unresolved_in_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = dir.path().join("audit_fallback.log");
    let backend = NullAuditBackend::new();
    let recorder = backend.recorder();
    let resolver = inline_resolver("/etc/letsencrypt/live/stranger.example.com/fullchain.pem");
    let service = service(backend, resolver, &fallback);

    service.register_withdrawal("B1", 0).await.unwrap();
    service.register_withdrawal("B2", 0).await.unwrap();

    let headers = fallback_headers(&fallback);
    assert_eq!(headers.len(), 2);
    assert!(headers
        .iter()
        .all(|h| h.contains(" unresolved unresolved withdrawal: ")));
    // Nothing reaches the audit store without identity tags.
    assert_eq!(recorder.event_count(), 0);
    assert_eq!(service.mirror().identity().await, None);
    // The ledger itself is unaffected.
    assert_eq!(service.get_withdrawals().unwrap().len(), 2);
}

#[tokio::test]
async fn identity_is_retried_until_resolved_then_cached() {
    let dir = tempfile::tempdir().unwrap();
    let networks = dir.path().join("networks.json");
    let fallback = dir.path().join("audit_fallback.log");
    let backend = NullAuditBackend::new();
    let recorder = backend.recorder();
    let resolver = IdentityResolver::new(CERT_PATH, TopologySource::File(networks.clone()));
    let service = service(backend, resolver, &fallback);

    // No topology file yet.
    service.register_withdrawal("B1", 0).await.unwrap();
    assert_eq!(fallback_headers(&fallback).len(), 1);

    std::fs::write(&networks, TOPOLOGY).unwrap();
    service.register_withdrawal("B2", 0).await.unwrap();

    // A later broken topology no longer matters.
    std::fs::write(&networks, "not json").unwrap();
    service.register_withdrawal("B3", 0).await.unwrap();

    let identity = NodeIdentity::new("dingo", "n4.dingocoin.org:0xBBB");
    let recorded = recorder.events();
    assert_eq!(recorded.len(), 2);
    assert!(recorded.iter().all(|(tag, _)| *tag == identity));
    assert_eq!(fallback_headers(&fallback).len(), 1);
    assert_eq!(service.mirror().identity().await, Some(identity));
}

#[tokio::test]
async fn first_network_listing_the_host_wins() {
    let topology = NetworkTopology::from_json_str(
        r#"{
            "dingo": { "authorityNodes": [{ "hostname": "shared.example.org", "walletAddress": "0x1" }] },
            "doge":  { "authorityNodes": [{ "hostname": "shared.example.org", "walletAddress": "0x2" }] }
        }"#,
    )
    .unwrap();
    let resolver = IdentityResolver::new(
        "/certs/shared.example.org/fullchain.pem",
        TopologySource::Inline(topology),
    );
    let dir = tempfile::tempdir().unwrap();
    let backend = NullAuditBackend::new();
    let recorder = backend.recorder();
    let service = service(backend, resolver, &dir.path().join("f.log"));

    service
        .register_mint_deposit_address("M1", "D1", "script")
        .await
        .unwrap();

    let (identity, event) = recorder.events().remove(0);
    assert_eq!(identity, NodeIdentity::new("dingo", "shared.example.org:0x1"));
    assert!(matches!(event, AuditEvent::MintDepositAddress { .. }));
}

#[tokio::test]
async fn unwritable_fallback_never_reaches_the_caller() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened for appending.
    let service = service(
        NullAuditBackend::unreachable(),
        inline_resolver(CERT_PATH),
        dir.path(),
    );

    let withdrawals = exercise(&service).await;
    assert_eq!(withdrawals.len(), 1);
    assert_eq!(withdrawals[0].approved_amount.as_str(), "10");
}

#[tokio::test]
async fn fallback_details_carry_the_event_fields() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = dir.path().join("audit_fallback.log");
    let service = service(
        NullAuditBackend::unreachable(),
        inline_resolver(CERT_PATH),
        &fallback,
    );

    service
        .register_mint_deposit_address("M1", "D1", "script-1")
        .await
        .unwrap();

    let content = std::fs::read_to_string(&fallback).unwrap();
    let json_start = content.find('{').unwrap();
    let details: serde_json::Value = serde_json::from_str(content[json_start..].trim()).unwrap();
    assert_eq!(details["mint_address"], "M1");
    assert_eq!(details["deposit_address"], "D1");
    assert_eq!(details["redeem_script"], "script-1");
    assert_eq!(details["approved_tax"], "0");
}

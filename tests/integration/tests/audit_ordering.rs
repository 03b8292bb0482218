//! Integration test: audit trail ordering and concurrent access.

use chrono::{Duration, TimeZone, Utc};
use futures::future::join_all;
use std::sync::Arc;

use credentia_core::{AuditAction, AuditEvent, ErrorKind};
use credentia_integration_tests::{fields_with_id, msp, scenario_fields, ManualClock};
use credentia_registry::{AuditTrail, CredentialRegistry, RegistryConfig};

#[test]
fn test_interleaved_org_logs_merge_in_time_order() {
    let t1 = Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap();
    let t2 = t1 + Duration::seconds(1);
    let t3 = t1 + Duration::seconds(2);

    let issue = AuditEvent::new("CRED1", AuditAction::Issue, msp("Org1MSP"), "tx-1", t1, 1);
    let share = AuditEvent::new("CRED1", AuditAction::Share, msp("Org1MSP"), "tx-2", t2, 2)
        .with_target(msp("Org2MSP"));
    let verify = AuditEvent::new("CRED1", AuditAction::Verify, msp("Org2MSP"), "tx-3", t3, 3);

    let orders = [
        [&issue, &share, &verify],
        [&verify, &share, &issue],
        [&share, &verify, &issue],
        [&verify, &issue, &share],
    ];
    for order in orders {
        let trail = AuditTrail::new();
        for event in order {
            trail.append(event.clone());
        }
        let timestamps: Vec<_> = trail.history("CRED1").iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![t1, t2, t3]);
    }
}

#[tokio::test]
async fn test_registry_history_follows_clock() {
    let clock = Arc::new(ManualClock::default());
    let registry = CredentialRegistry::new(RegistryConfig {
        record_verifications: true,
        ..RegistryConfig::default()
    })
    .with_clock(clock.clone());
    let org1 = msp("Org1MSP");
    let org2 = msp("Org2MSP");

    registry.issue(&org1, scenario_fields()).await.unwrap();
    clock.advance(Duration::minutes(5));
    registry.share(&org1, "CRED3001", &org2).await.unwrap();
    clock.advance(Duration::minutes(5));
    registry.verify_hash(&org2, "CRED3001").unwrap();
    clock.advance(Duration::minutes(5));
    registry.revoke(&org1, "CRED3001").await.unwrap();

    let history = registry.history("CRED3001").unwrap();
    let summary: Vec<(AuditAction, String)> = history
        .iter()
        .map(|e| (e.action, e.msp_id.to_string()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (AuditAction::Issue, "Org1MSP".to_string()),
            (AuditAction::Share, "Org1MSP".to_string()),
            (AuditAction::Verify, "Org2MSP".to_string()),
            (AuditAction::Revoke, "Org1MSP".to_string()),
        ]
    );
    assert!(history.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[tokio::test]
async fn test_clock_going_backwards_reorders_by_timestamp() {
    let clock = Arc::new(ManualClock::default());
    let registry = CredentialRegistry::default().with_clock(clock.clone());
    let org1 = msp("Org1MSP");

    registry.issue(&org1, scenario_fields()).await.unwrap();
    clock.advance(Duration::seconds(-30));
    registry.revoke(&org1, "CRED3001").await.unwrap();

    let history = registry.history("CRED3001").unwrap();
    assert_eq!(history[0].action, AuditAction::Revoke);
    assert_eq!(history[1].action, AuditAction::Issue);
}

#[tokio::test]
async fn test_history_is_idempotent() {
    let registry = CredentialRegistry::default();
    let org1 = msp("Org1MSP");
    registry.issue(&org1, scenario_fields()).await.unwrap();
    registry.share(&org1, "CRED3001", &msp("Org2MSP")).await.unwrap();

    let first = registry.history("CRED3001").unwrap();
    let second = registry.history("CRED3001").unwrap();
    assert_eq!(first, second);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_ids_proceed_in_parallel() {
    let registry = Arc::new(CredentialRegistry::default());
    let org1 = msp("Org1MSP");

    let tasks = (0..32).map(|i| {
        let registry = Arc::clone(&registry);
        let org1 = org1.clone();
        tokio::spawn(async move {
            let id = format!("CRED-{i:03}");
            registry.issue(&org1, fields_with_id(&id)).await?;
            registry.share(&org1, &id, &msp("Org2MSP")).await?;
            registry.revoke(&org1, &id).await
        })
    });

    for result in join_all(tasks).await {
        let ack = result.unwrap().unwrap();
        assert!(!ack.already_revoked);
    }

    let partition = registry.partition(&org1).unwrap();
    assert_eq!(partition.len(), 32);
    for id in partition.ids() {
        assert_eq!(registry.history(&id).unwrap().len(), 3);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_share_and_revoke_stay_consistent() {
    let registry = Arc::new(CredentialRegistry::default());
    let org1 = msp("Org1MSP");
    registry.issue(&org1, scenario_fields()).await.unwrap();

    let mut tasks = Vec::new();
    for i in 0..6 {
        let registry = Arc::clone(&registry);
        let org1 = org1.clone();
        tasks.push(tokio::spawn(async move {
            let target = msp(&format!("Org{}MSP", i + 2));
            registry
                .share(&org1, "CRED3001", &target)
                .await
                .map(|_| ())
        }));
    }
    {
        let registry = Arc::clone(&registry);
        let org1 = org1.clone();
        tasks.push(tokio::spawn(async move {
            registry.revoke(&org1, "CRED3001").await.map(|_| ())
        }));
    }

    for result in join_all(tasks).await {
        if let Err(e) = result.unwrap() {
            // Shares that lost the race against the revoke.
            assert_eq!(e.kind(), ErrorKind::InvalidState);
        }
    }

    // Every share that landed was recorded before the revoke, and every
    // resulting view carries the revocation.
    let history = registry.history("CRED3001").unwrap();
    assert_eq!(history.last().unwrap().action, AuditAction::Revoke);
    let source = registry.view(&org1, "CRED3001").unwrap();
    for target in source.share_targets() {
        let view = registry.view(&target, "CRED3001").unwrap();
        assert!(view.revoke_tx_id.is_some());
    }
    let shares = history
        .iter()
        .filter(|e| e.action == AuditAction::Share)
        .count();
    assert_eq!(shares, source.shares.len());
}

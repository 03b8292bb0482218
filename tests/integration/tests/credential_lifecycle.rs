//! Integration test: credential lifecycle across organizations.
//!
//! Drives the registry through issue, share, verify and revoke and checks
//! what each organization can see at every step.

use credentia_core::{AuditAction, CredentialState, ErrorKind};
use credentia_crypto::{digest_fields, is_digest_hex};
use credentia_integration_tests::{msp, scenario_fields, SCENARIO_DIGEST};
use credentia_registry::CredentialRegistry;

// =========================================================================
// The reference walk-through
// =========================================================================

#[tokio::test]
async fn test_reference_scenario() {
    let registry = CredentialRegistry::default();
    let org1 = msp("Org1MSP");
    let org2 = msp("Org2MSP");

    let receipt = registry.issue(&org1, scenario_fields()).await.unwrap();
    let digest = receipt.record.stored_hash.clone();
    assert!(is_digest_hex(&digest));
    assert_eq!(digest, SCENARIO_DIGEST);

    registry.share(&org1, "CRED3001", &org2).await.unwrap();

    let report = registry.verify_hash(&org2, "CRED3001").unwrap();
    assert!(report.is_hash_valid);
    assert_eq!(report.stored_hash, digest);
    assert_eq!(report.computed_hash, digest);

    registry.revoke(&org1, "CRED3001").await.unwrap();

    let actions: Vec<AuditAction> = registry
        .history("CRED3001")
        .unwrap()
        .iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(
        actions,
        vec![AuditAction::Issue, AuditAction::Share, AuditAction::Revoke]
    );
}

// =========================================================================
// Partition visibility
// =========================================================================

#[tokio::test]
async fn test_share_visibility() {
    let registry = CredentialRegistry::default();
    let org1 = msp("Org1MSP");
    let org2 = msp("Org2MSP");
    let org3 = msp("Org3MSP");

    registry.issue(&org1, scenario_fields()).await.unwrap();
    assert_eq!(
        registry.verify_hash(&org2, "CRED3001").unwrap_err().kind(),
        ErrorKind::NotFound
    );

    registry.share(&org1, "CRED3001", &org2).await.unwrap();
    assert!(registry.verify_hash(&org2, "CRED3001").unwrap().is_hash_valid);
    assert_eq!(
        registry.verify_hash(&org3, "CRED3001").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_shared_view_matches_issuer_copy() {
    let registry = CredentialRegistry::default();
    let org1 = msp("Org1MSP");
    let org2 = msp("Org2MSP");

    registry.issue(&org1, scenario_fields()).await.unwrap();
    registry.share(&org1, "CRED3001", &org2).await.unwrap();

    let source = registry.view(&org1, "CRED3001").unwrap();
    let view = registry.view(&org2, "CRED3001").unwrap();
    assert_eq!(source.credential, view.credential);
    assert_eq!(source.stored_hash, view.stored_hash);
    assert_eq!(source.issue_tx_id, view.issue_tx_id);
    assert_eq!(view.owner_msp, org1);
    assert_eq!(view.holder_msp, org2);
}

#[tokio::test]
async fn test_multiple_targets() {
    let registry = CredentialRegistry::default();
    let org1 = msp("Org1MSP");
    let targets = [msp("Org2MSP"), msp("Org3MSP"), msp("Org4MSP")];

    registry.issue(&org1, scenario_fields()).await.unwrap();
    for target in &targets {
        registry.share(&org1, "CRED3001", target).await.unwrap();
    }
    registry.revoke(&org1, "CRED3001").await.unwrap();

    for target in &targets {
        let report = registry.verify_hash(target, "CRED3001").unwrap();
        assert!(report.is_hash_valid);
        assert_eq!(report.state, CredentialState::Revoked);
    }
    assert_eq!(registry.organizations().len(), 4);
}

// =========================================================================
// Revocation
// =========================================================================

#[tokio::test]
async fn test_revocation_is_terminal() {
    let registry = CredentialRegistry::default();
    let org1 = msp("Org1MSP");
    let org2 = msp("Org2MSP");

    registry.issue(&org1, scenario_fields()).await.unwrap();
    registry.share(&org1, "CRED3001", &org2).await.unwrap();
    let ack = registry.revoke(&org1, "CRED3001").await.unwrap();
    assert!(!ack.already_revoked);

    let err = registry
        .share(&org1, "CRED3001", &msp("Org3MSP"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    // Verification still works and flags the state.
    for org in [&org1, &org2] {
        let report = registry.verify_hash(org, "CRED3001").unwrap();
        assert!(report.is_hash_valid);
        assert!(report.is_revoked());
    }

    let again = registry.revoke(&org1, "CRED3001").await.unwrap();
    assert!(again.already_revoked);
    assert_eq!(again.tx_id, ack.tx_id);
}

// =========================================================================
// Tamper detection
// =========================================================================

#[tokio::test]
async fn test_any_field_change_is_detected() {
    let source = CredentialRegistry::default();
    let org1 = msp("Org1MSP");
    let receipt = source.issue(&org1, scenario_fields()).await.unwrap();

    let edits: [(&str, fn(&mut credentia_core::CredentialFields)); 6] = [
        ("studentID", |f| f.student_id.push('0')),
        ("studentName", |f| f.student_name = "Asha  Patel".into()),
        ("university", |f| f.university = "UniB".into()),
        ("degree", |f| f.degree = "M.Tech".into()),
        ("gpa", |f| f.gpa = "8.80".into()),
        ("issueDate", |f| f.issue_date = "2025-10-02".into()),
    ];

    for (name, edit) in edits {
        let mut tampered = receipt.record.clone();
        edit(&mut tampered.credential);
        assert_ne!(digest_fields(&tampered.credential), receipt.record.stored_hash);

        let restored = CredentialRegistry::default();
        restored.restore(vec![tampered], Vec::new());
        let report = restored.verify_hash(&org1, "CRED3001").unwrap();
        assert!(!report.is_hash_valid, "edit to {name} went unnoticed");
        assert_eq!(report.finding, Some(ErrorKind::HashMismatch));
    }
}

#[tokio::test]
async fn test_unmodified_restore_verifies() {
    let source = CredentialRegistry::default();
    let org1 = msp("Org1MSP");
    let receipt = source.issue(&org1, scenario_fields()).await.unwrap();

    let restored = CredentialRegistry::default();
    restored.restore(vec![receipt.record], source.history("CRED3001").unwrap());
    let report = restored.verify_hash(&org1, "CRED3001").unwrap();
    assert!(report.is_hash_valid);
    assert!(report.finding.is_none());
}

// =========================================================================
// Input validation
// =========================================================================

#[tokio::test]
async fn test_duplicate_issue_rejected() {
    let registry = CredentialRegistry::default();
    let org1 = msp("Org1MSP");

    registry.issue(&org1, scenario_fields()).await.unwrap();
    let err = registry.issue(&org1, scenario_fields()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_values_are_not_normalized() {
    let registry = CredentialRegistry::default();
    let org1 = msp("Org1MSP");

    let mut padded = scenario_fields();
    padded.cred_id = "CRED3002".into();
    padded.student_name = " Asha Patel ".into();
    let receipt = registry.issue(&org1, padded.clone()).await.unwrap();

    assert_eq!(receipt.record.credential.student_name, " Asha Patel ");
    assert_eq!(receipt.record.stored_hash, digest_fields(&padded));
}

//! Command Dispatch Tests
//!
//! Every Command variant reaches the matching ledger call and comes back as
//! the matching Output variant.

use lineage_core::{EntryKind, Timestamp};
use lineage_engine::RevokeOutcome;
use lineage_executor::{Command, Output};

use crate::common::*;

// ============================================================================
// Queries
// ============================================================================

#[test]
fn active_operations_returns_operations() {
    let t = TestLedger::new();
    let op = t.swap(&session(), 1);

    let output = t
        .executor()
        .execute(Command::ActiveOperations { session: None })
        .unwrap();

    assert_eq!(output, Output::Operations(vec![op]));
}

#[test]
fn revoked_operations_returns_revoked() {
    let t = TestLedger::new();
    let op = t.swap(&session(), 1);
    t.ledger
        .revoke(&session(), &op.content_hash, "sovereign_recoil")
        .unwrap();

    match t
        .executor()
        .execute(Command::RevokedOperations { session: None })
        .unwrap()
    {
        Output::Revoked(revoked) => {
            assert_eq!(revoked.len(), 1);
            assert_eq!(revoked[0].operation.content_hash, op.content_hash);
        }
        other => panic!("Expected Revoked output, got {:?}", other),
    }
}

#[test]
fn operation_history_skips_snapshots() {
    let t = TestLedger::new();
    let op = t.swap(&session(), 1);
    t.ledger.snapshot(&session(), None).unwrap();
    t.ledger
        .revoke(&session(), &op.content_hash, "sovereign_recoil")
        .unwrap();

    match t
        .executor()
        .execute(Command::OperationHistory { session: None })
        .unwrap()
    {
        Output::History(entries) => {
            let kinds: Vec<_> = entries.iter().map(|e| e.kind()).collect();
            assert_eq!(
                kinds,
                vec![EntryKind::Operation, EntryKind::Revocation]
            );
        }
        other => panic!("Expected History output, got {:?}", other),
    }
}

#[test]
fn fusion_timeline_follows_active_operations() {
    let t = TestLedger::new();
    t.swap(&session(), 1);
    t.advance(1);
    t.swap(&session(), 2);

    match t
        .executor()
        .execute(Command::FusionTimeline { session: None })
        .unwrap()
    {
        Output::Timeline(points) => {
            let paths: Vec<_> = points.iter().map(|p| p.fusion_path.clone()).collect();
            assert_eq!(paths, vec![vec![1], vec![2]]);
        }
        other => panic!("Expected Timeline output, got {:?}", other),
    }
}

#[test]
fn lineage_at_returns_snapshot_state() {
    let t = TestLedger::new();
    t.swap(&session(), 5);
    t.ledger.snapshot(&session(), Some("five".into())).unwrap();

    let output = t
        .executor()
        .execute(Command::LineageAt {
            session: None,
            at: Timestamp::from_datetime(epoch()),
        })
        .unwrap();

    match output {
        Output::Lineage(state) => {
            assert_eq!(state.lineage.fusion_path, vec![5]);
            assert_eq!(state.note.as_deref(), Some("five"));
        }
        other => panic!("Expected Lineage output, got {:?}", other),
    }
}

#[test]
fn snapshot_listing_and_last_snapshot() {
    let t = TestLedger::new();
    t.ledger.snapshot(&session(), Some("a".into())).unwrap();
    t.advance(1);
    let last = t.ledger.snapshot(&session(), Some("b".into())).unwrap();
    let executor = t.executor();

    match executor.execute(Command::Snapshots { session: None }).unwrap() {
        Output::Snapshots(records) => assert_eq!(records.len(), 2),
        other => panic!("Expected Snapshots output, got {:?}", other),
    }
    match executor
        .execute(Command::LastSnapshot { session: None })
        .unwrap()
    {
        Output::LastSnapshot(record) => assert_eq!(record.hash, last.content_hash),
        other => panic!("Expected LastSnapshot output, got {:?}", other),
    }
}

#[test]
fn last_snapshot_without_any_is_not_found() {
    let t = TestLedger::new();
    let err = t
        .executor()
        .execute(Command::LastSnapshot { session: None })
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn audit_counts_entries() {
    let t = TestLedger::new();
    let op = t.swap(&session(), 1);
    t.swap(&session(), 2);
    t.ledger
        .revoke(&session(), &op.content_hash, "sovereign_recoil")
        .unwrap();
    t.ledger.snapshot(&session(), None).unwrap();

    match t.executor().execute(Command::Audit { session: None }).unwrap() {
        Output::Audit(report) => {
            assert_eq!(report.total_operations, 2);
            assert_eq!(report.active_operations, 1);
            assert_eq!(report.revocations, 1);
            assert_eq!(report.snapshots, 1);
            assert!(report.integrity.is_valid());
            assert_eq!(report.lineage.fusion_path, vec![2]);
        }
        other => panic!("Expected Audit output, got {:?}", other),
    }
}

// ============================================================================
// Mutations
// ============================================================================

#[test]
fn snapshot_appends_one_entry() {
    let t = TestLedger::new();
    let before = t.entry_count();

    let output = t
        .executor()
        .execute(Command::Snapshot {
            session: Some(other_session()),
            note: Some("τ".into()),
        })
        .unwrap();

    match output {
        Output::SnapshotTaken(entry) => {
            assert_eq!(entry.session_id, other_session());
            assert_eq!(entry.kind(), EntryKind::Snapshot);
        }
        other => panic!("Expected SnapshotTaken output, got {:?}", other),
    }
    assert_eq!(t.entry_count(), before + 1);
}

#[test]
fn revoke_without_reason_uses_default() {
    let t = TestLedger::new();
    let op = t.swap(&session(), 1);

    let output = t
        .executor()
        .execute(Command::Revoke {
            session: None,
            hash: op.content_hash.clone(),
            reason: None,
        })
        .unwrap();

    match output {
        Output::Revocation(RevokeOutcome::Revoked { entry }) => {
            let revocation = entry.as_revocation().unwrap();
            assert_eq!(revocation.revoked_hash, op.content_hash);
            assert_eq!(revocation.reason, "sovereign_recoil");
        }
        other => panic!("Expected Revocation output, got {:?}", other),
    }
}

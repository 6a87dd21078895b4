//! Determinism, revocation, hashing and fail-closed properties.

use lineage_core::{Error, Lineage, Step, ValidationError, Word};
use lineage_engine::RevokeOutcome;
use proptest::prelude::*;

use crate::common::*;

/// One step of a generated history: an operation with the given fusion
/// value, optionally followed by revoking an earlier operation.
#[derive(Debug, Clone)]
struct Action {
    fusion: u8,
    revoke: Option<usize>,
    tick: bool,
}

fn arb_action() -> impl Strategy<Value = Action> {
    (any::<u8>(), prop::option::of(0usize..16), any::<bool>()).prop_map(
        |(fusion, revoke, tick)| Action {
            fusion,
            revoke,
            tick,
        },
    )
}

fn play(t: &TestLedger, actions: &[Action]) {
    let mut hashes = Vec::new();
    for action in actions {
        if action.tick {
            t.advance(1);
        }
        let entry = t.swap(&session(), action.fusion);
        hashes.push(entry.content_hash);
        if let Some(target) = action.revoke {
            let hash = &hashes[target % hashes.len()];
            t.ledger.revoke(&session(), hash, "sovereign_recoil").unwrap();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn resolution_is_deterministic(actions in prop::collection::vec(arb_action(), 0..12)) {
        let t = TestLedger::new();
        play(&t, &actions);

        let first = t.ledger.lineage(&session()).unwrap();
        let second = t.ledger.lineage(&session()).unwrap();
        let reloaded = t.reopen().lineage(&session()).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &reloaded);
    }

    #[test]
    fn every_stored_hash_round_trips(note in "\\PC{0,40}", reason in "\\PC{1,40}") {
        let t = TestLedger::new();
        let op = t.swap(&session(), 3);
        t.ledger.revoke(&session(), &op.content_hash, reason).unwrap();
        t.ledger.snapshot(&session(), Some(note)).unwrap();

        for entry in t.reopen().all_entries().unwrap() {
            prop_assert_eq!(entry.recompute_hash().unwrap(), entry.content_hash.clone());
        }
        prop_assert!(t.ledger.verify().unwrap().is_valid());
    }

    #[test]
    fn out_of_range_generator_is_rejected(index in 3usize..64) {
        let t = TestLedger::new();
        let before = t.entry_count();

        let err = t.ledger.append_operation(
            &session(),
            Word::new(vec![Step::positive(index)]),
            e123(),
            e123(),
            None,
        ).unwrap_err();

        let rejected = matches!(
            err,
            Error::Validation(ValidationError::GeneratorOutOfRange { .. })
        );
        prop_assert!(rejected);
        prop_assert_eq!(t.entry_count(), before);
    }

    #[test]
    fn exponent_other_than_unit_is_rejected(exponent in -8i64..8) {
        prop_assume!(exponent != 1 && exponent != -1);
        let t = TestLedger::new();
        t.swap(&session(), 1);
        let before = t.entry_count();

        let err = t.ledger.append_operation(
            &session(),
            Word::new(vec![Step::new("B1", exponent)]),
            e123(),
            e123(),
            None,
        ).unwrap_err();

        let rejected = matches!(
            err,
            Error::Validation(ValidationError::InvalidExponent { .. })
        );
        prop_assert!(rejected);
        prop_assert_eq!(t.entry_count(), before);
    }
}

// ============================================================================
// Revocation
// ============================================================================

#[test]
fn revoked_operation_stays_in_history() {
    let t = TestLedger::new();
    let kept = t.swap(&session(), 1);
    let dropped = t.swap(&session(), 2);

    t.ledger
        .revoke(&session(), &dropped.content_hash, "sovereign_recoil")
        .unwrap();

    let active: Vec<_> = t
        .ledger
        .active_operations(&session())
        .unwrap()
        .into_iter()
        .map(|e| e.content_hash)
        .collect();
    assert_eq!(active, vec![kept.content_hash]);
    assert!(t
        .ledger
        .operation_history(&session())
        .unwrap()
        .iter()
        .any(|e| e.content_hash == dropped.content_hash));
}

#[test]
fn revoking_unknown_hash_is_not_an_error() {
    let t = TestLedger::new();
    t.swap(&session(), 1);
    let before = t.entry_count();

    let outcome = t
        .ledger
        .revoke(&session(), &"0".repeat(64), "sovereign_recoil")
        .unwrap();

    assert!(matches!(outcome, RevokeOutcome::NoOp { .. }));
    assert_eq!(t.entry_count(), before);
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn back_to_back_snapshots_capture_the_same_state() {
    let t = TestLedger::new();
    t.swap(&session(), 4);

    let first = t.ledger.snapshot(&session(), None).unwrap();
    t.advance(5);
    let second = t.ledger.snapshot(&session(), None).unwrap();

    let a = first.as_snapshot().unwrap();
    let b = second.as_snapshot().unwrap();
    assert_eq!(a.lineage_state, b.lineage_state);
    assert_eq!(a.total_operations, b.total_operations);
    assert_ne!(first.content_hash, second.content_hash);
}

#[test]
fn snapshot_does_not_change_resolution() {
    let t = TestLedger::new();
    t.swap(&session(), 4);
    let before = t.ledger.lineage(&session()).unwrap();

    t.ledger.snapshot(&session(), Some("checkpoint".into())).unwrap();

    assert_eq!(t.ledger.lineage(&session()).unwrap(), before);
    assert_eq!(
        t.ledger.last_snapshot(&session()).unwrap().snapshot.lineage_state.lineage,
        Lineage::new(["E2", "E1", "E3"], vec![4])
    );
}

#[test]
fn lineage_at_uses_latest_snapshot_not_after_time() {
    let t = TestLedger::new();
    t.swap(&session(), 1);
    t.ledger.snapshot(&session(), Some("one".into())).unwrap();
    t.advance(60);
    t.swap(&session(), 2);
    t.ledger.snapshot(&session(), Some("two".into())).unwrap();

    let early = lineage_core::Timestamp::from_datetime(epoch() + chrono::Duration::seconds(30));
    let state = t.ledger.lineage_at(&session(), &early).unwrap();
    assert_eq!(state.note.as_deref(), Some("one"));
    assert_eq!(state.lineage.fusion_path, vec![1]);

    let before_any = lineage_core::Timestamp::from_datetime(epoch() - chrono::Duration::seconds(1));
    assert!(t
        .ledger
        .lineage_at(&session(), &before_any)
        .unwrap_err()
        .is_not_found());
}

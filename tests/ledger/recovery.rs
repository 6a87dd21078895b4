//! Reopen, torn-tail and tamper detection over the ledger file.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;

use lineage_core::{Attestation, CorruptionError, Error, ValidationError};
use lineage_engine::{AccessMode, Ledger, LedgerConfig};

use crate::common::*;

fn append_raw(t: &TestLedger, bytes: &[u8]) {
    let mut file = OpenOptions::new()
        .append(true)
        .open(t.ledger.path())
        .unwrap();
    file.write_all(bytes).unwrap();
    file.sync_all().unwrap();
}

#[test]
fn reopened_writer_continues_the_chain() {
    let t = TestLedger::new();
    let first = t.swap(&session(), 1);
    let config = t.ledger.config().clone();
    drop(t.ledger);

    let ledger = Ledger::open(config).unwrap();
    assert_eq!(ledger.recovery().entries, 1);
    let entry = ledger.snapshot(&session(), None).unwrap();

    assert_eq!(entry.prev_hash, first.content_hash);
    assert!(ledger.verify().unwrap().is_valid());
}

#[test]
fn torn_tail_is_invisible_then_repaired() {
    let t = TestLedger::new();
    t.swap(&session(), 1);
    let intact = fs::metadata(t.ledger.path()).unwrap().len();
    append_raw(&t, br#"{"session_id":"session-1","timestamp":"2025-12"#);

    // Readers skip the partial record.
    let reader = t.reopen();
    assert_eq!(reader.entry_count().unwrap(), 1);
    assert!(reader.recovery().torn_tail.is_some());
    assert_eq!(reader.lineage(&session()).unwrap().fusion_path, vec![1]);

    // A writer truncates it before appending.
    let writer = Ledger::open(t.ledger.config().clone()).unwrap();
    let torn = writer.recovery().torn_tail.unwrap();
    assert_eq!(torn.offset, intact);
    assert_eq!(fs::metadata(t.ledger.path()).unwrap().len(), intact);

    writer.snapshot(&session(), None).unwrap();
    assert!(writer.verify().unwrap().is_valid());
    assert_eq!(writer.entry_count().unwrap(), 2);
}

#[test]
fn non_finite_attestation_is_rejected_and_never_reaches_the_file() {
    let t = TestLedger::new();
    let kept = t.swap(&session(), 1);
    let len = fs::metadata(t.ledger.path()).unwrap().len();

    for value in [f64::NAN, f64::INFINITY] {
        let attestation = Attestation {
            digest: "sha256:abc".into(),
            summary: BTreeMap::from([("vitality".to_string(), value)]),
        };
        let err = t
            .ledger
            .append_operation(&session(), reversal_word(), e123(), e321(), Some(attestation))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::NonFiniteSummaryValue { .. })
        ));
    }
    assert_eq!(fs::metadata(t.ledger.path()).unwrap().len(), len);

    let next = t.swap(&session(), 2);
    assert_eq!(next.prev_hash, kept.content_hash);

    let reopened = Ledger::open(t.ledger.config().clone()).unwrap();
    assert!(reopened.recovery().torn_tail.is_none());
    assert_eq!(reopened.entry_count().unwrap(), 2);
    assert_eq!(reopened.lineage(&session()).unwrap().fusion_path, vec![2]);
}

#[test]
fn edited_entry_fails_verification() {
    let t = TestLedger::new();
    let op = t.swap(&session(), 1);
    t.ledger
        .revoke(&session(), &op.content_hash, "sovereign_recoil")
        .unwrap();

    let text = fs::read_to_string(t.ledger.path()).unwrap();
    fs::write(
        t.ledger.path(),
        text.replace("sovereign_recoil", "sovereign_recall"),
    )
    .unwrap();

    let report = t.reopen().verify().unwrap();
    assert!(!report.is_valid());
    assert!(report
        .failures
        .iter()
        .any(|f| matches!(f, CorruptionError::HashMismatch { .. })));
}

#[test]
fn deleted_entry_breaks_the_chain() {
    let t = TestLedger::new();
    t.swap(&session(), 1);
    t.swap(&session(), 2);
    t.swap(&session(), 3);

    let text = fs::read_to_string(t.ledger.path()).unwrap();
    let kept: Vec<&str> = text
        .lines()
        .enumerate()
        .filter(|(i, _)| *i != 1)
        .map(|(_, line)| line)
        .collect();
    fs::write(t.ledger.path(), format!("{}\n", kept.join("\n"))).unwrap();

    let ledger = t.reopen();
    let report = ledger.verify().unwrap();
    assert!(report
        .failures
        .iter()
        .any(|f| matches!(f, CorruptionError::ChainBroken { position: 1, .. })));
    assert!(matches!(
        ledger.verify_session(&session()).unwrap_err(),
        Error::Corruption(CorruptionError::ChainBroken { .. })
    ));
}

#[test]
fn read_only_ledger_rejects_every_mutation() {
    let t = TestLedger::new();
    let op = t.swap(&session(), 1);
    let before = fs::metadata(t.ledger.path()).unwrap().len();
    let reader = t.reopen();

    assert!(reader.is_read_only());
    assert!(matches!(
        reader.snapshot(&session(), None).unwrap_err(),
        Error::ReadOnly
    ));
    assert!(matches!(
        reader
            .revoke(&session(), &op.content_hash, "sovereign_recoil")
            .unwrap_err(),
        Error::ReadOnly
    ));
    assert!(matches!(
        reader
            .append_operation(&session(), reversal_word(), e123(), e321(), None)
            .unwrap_err(),
        Error::ReadOnly
    ));
    assert_eq!(fs::metadata(t.ledger.path()).unwrap().len(), before);
    assert_eq!(reader.active_operations(&session()).unwrap().len(), 1);
}

#[test]
fn read_only_open_of_missing_file_fails() {
    let t = TestLedger::new();
    let config = LedgerConfig::new(t.dir.path().join("missing.jsonl"))
        .access_mode(AccessMode::ReadOnly);

    let err = Ledger::open(config).err().unwrap();

    assert!(err.is_storage());
}

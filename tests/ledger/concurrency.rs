//! Concurrent writers and readers on one ledger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use lineage_core::SessionId;
use lineage_engine::SessionProfile;

use crate::common::*;

#[test]
fn concurrent_writers_keep_every_chain_intact() {
    let t = TestLedger::with_config(|c| c.default_profile(SessionProfile::new(3, vec![0])));
    let threads = 4;
    let per_thread = 25;

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let ledger = Arc::clone(&t.ledger);
            thread::spawn(move || {
                let session = SessionId::new(format!("writer-{}", i));
                for n in 0..per_thread {
                    ledger
                        .append_operation(
                            &session,
                            reversal_word(),
                            e123(),
                            lineage_core::Lineage::new(["E3", "E2", "E1"], vec![n as u8]),
                            None,
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let report = t.ledger.verify().unwrap();
    assert!(report.is_valid(), "{:?}", report.failures);
    assert_eq!(report.entries_checked, threads * per_thread);
    assert_eq!(report.sessions_checked, threads);
    for i in 0..threads {
        let session = SessionId::new(format!("writer-{}", i));
        assert_eq!(
            t.ledger.lineage(&session).unwrap().fusion_path,
            vec![(per_thread - 1) as u8]
        );
    }
}

#[test]
fn readers_see_a_valid_prefix_while_writing() {
    let t = TestLedger::new();
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let ledger = Arc::clone(&t.ledger);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut seen = 0;
                while !done.load(Ordering::Acquire) {
                    let entries = ledger.entries(&session()).unwrap();
                    assert!(entries.len() >= seen, "entries never disappear");
                    seen = entries.len();
                    ledger.verify_session(&session()).unwrap();
                }
            })
        })
        .collect();

    for n in 0..50u8 {
        t.swap(&session(), n);
    }
    done.store(true, Ordering::Release);
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(t.entry_count(), 50);
    assert_eq!(t.ledger.lineage(&session()).unwrap().fusion_path, vec![49]);
}

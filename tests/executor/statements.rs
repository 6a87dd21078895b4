//! Statement Tests
//!
//! The statement language end to end: keyword case, quoting, session
//! defaulting and the errors that must stop a statement before it touches
//! the ledger.

use lineage_core::{Error, ParseError, SessionId};
use lineage_executor::Output;

use crate::common::*;

#[test]
fn keywords_are_case_insensitive() {
    let t = TestLedger::new();
    t.swap(&session(), 1);
    let executor = t.executor();

    let upper = executor.run("SHOW ACTIVE OPERATIONS FOR session-1").unwrap();
    let lower = executor.run("show active operations for session-1").unwrap();

    assert_eq!(upper, lower);
}

#[test]
fn session_values_keep_their_case() {
    let t = TestLedger::new();
    t.swap(&session(), 1);

    let executor = t.executor();

    let err = executor.run("AUDIT SESSION Session-1").unwrap_err();
    assert!(err.is_not_found());

    let executed = executor.run("SHOW ACTIVE OPERATIONS FOR Session-1").unwrap();
    assert_eq!(executed.session, SessionId::from("Session-1"));
    assert_eq!(executed.output, Output::Operations(Vec::new()));
}

#[test]
fn quoted_non_ascii_session_is_one_token() {
    let t = TestLedger::new();
    t.swap(&other_session(), 9);

    let executed = t
        .executor()
        .run(r#"AUDIT SESSION "session-τ-001""#)
        .unwrap();

    assert_eq!(executed.session, other_session());
    match executed.output {
        Output::Audit(report) => assert_eq!(report.lineage.fusion_path, vec![9]),
        other => panic!("Expected Audit output, got {:?}", other),
    }
}

#[test]
fn omitted_for_uses_and_reports_default_session() {
    let t = TestLedger::new();
    let executor = t.executor();

    let executed = executor.run(r#"SNAPSHOT LINEAGE NOTE "nightly""#).unwrap();

    assert_eq!(executed.session, session());
    assert_eq!(t.ledger.snapshots(&session()).unwrap().len(), 1);
}

#[test]
fn switching_default_session_redirects_statements() {
    let t = TestLedger::new();
    let mut executor = t.executor();
    executor.set_default_session(other_session());

    let executed = executor.run("SNAPSHOT").unwrap();

    assert_eq!(executed.session, other_session());
    assert!(t.ledger.snapshots(&session()).unwrap().is_empty());
    assert_eq!(t.ledger.snapshots(&other_session()).unwrap().len(), 1);
}

#[test]
fn revoke_statement_with_note() {
    let t = TestLedger::new();
    let op = t.swap(&session(), 1);

    t.executor()
        .run(&format!(
            r#"REVOKE {} FOR session-1 NOTE "withdrawn consent";"#,
            op.content_hash
        ))
        .unwrap();

    let revoked = t.ledger.revoked_operations(&session()).unwrap();
    assert_eq!(revoked[0].reason, "withdrawn consent");
}

#[test]
fn lineage_at_accepts_loose_timestamps() {
    let t = TestLedger::new();
    t.swap(&session(), 3);
    t.ledger.snapshot(&session(), None).unwrap();

    let executed = t
        .executor()
        .run(r#"SHOW LINEAGE FOR session-1 AT "2025-12-25 21:30:00""#)
        .unwrap();

    match executed.output {
        Output::Lineage(state) => assert_eq!(state.lineage.fusion_path, vec![3]),
        other => panic!("Expected Lineage output, got {:?}", other),
    }
}

#[test]
fn outputs_serialize_with_their_session() {
    let t = TestLedger::new();
    t.swap(&session(), 1);

    let executed = t.executor().run("SHOW FUSION TIMELINE").unwrap();
    let value = serde_json::to_value(&executed).unwrap();

    assert_eq!(value["session"], "session-1");
    assert_eq!(value["output"]["output"], "timeline");
    assert_eq!(value["output"]["data"][0]["fusion_path"][0], 1);
}

// ============================================================================
// Rejections
// ============================================================================

fn assert_rejected(statement: &str) -> ParseError {
    let t = TestLedger::new();
    t.swap(&session(), 1);
    let before = t.entry_count();

    let err = t.executor().run(statement).unwrap_err();

    assert_eq!(t.entry_count(), before, "{} must not write", statement);
    match err {
        Error::Parse(e) => e,
        other => panic!("Expected parse error for {}, got {:?}", statement, other),
    }
}

#[test]
fn each_malformed_statement_has_its_own_error() {
    assert!(matches!(assert_rejected(""), ParseError::Empty));
    assert!(matches!(
        assert_rejected("DELETE FOR session-1"),
        ParseError::UnknownVerb(_)
    ));
    assert!(matches!(
        assert_rejected("SHOW BANANAS FOR session-1"),
        ParseError::UnknownSubject { .. }
    ));
    assert!(matches!(
        assert_rejected("SHOW LINEAGE FOR session-1"),
        ParseError::MissingClause { clause: "AT", .. }
    ));
    assert!(matches!(
        assert_rejected("REVOKE FOR session-1"),
        ParseError::MissingArgument { .. }
    ));
    assert!(matches!(
        assert_rejected(r#"SNAPSHOT NOTE "unterminated"#),
        ParseError::UnterminatedQuote(_)
    ));
    assert!(matches!(
        assert_rejected("SNAPSHOT FOR a FOR b"),
        ParseError::DuplicateClause("FOR")
    ));
    assert!(matches!(
        assert_rejected(r#"SHOW LINEAGE AT "yesterday""#),
        ParseError::InvalidTimestamp(_)
    ));
}

#[test]
fn missing_session_without_default_is_rejected() {
    let t = TestLedger::new();
    let executor = t.executor().with_default_session(None);

    let err = executor.run("SHOW SNAPSHOTS").unwrap_err();

    assert!(matches!(
        err,
        Error::Parse(ParseError::MissingClause { clause: "FOR", .. })
    ));
    assert_eq!(executor.default_session(), None::<&SessionId>);
}

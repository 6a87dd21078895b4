//! Output formatting for human and JSON modes.

use lineage_core::{EntryBody, Error, LedgerEntry, Lineage};
use lineage_engine::{IntegrityReport, RevokeOutcome, SnapshotRecord};
use lineage_executor::{Executed, Output};

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Aligned text
    Human,
    /// One JSON document per result
    Json,
}

fn short(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}

fn json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

/// Format the result of a statement.
pub fn format_output(executed: &Executed, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => json(executed),
        OutputMode::Human => format!(
            "[session: {}]\n{}",
            executed.session,
            format_human(&executed.output)
        ),
    }
}

/// Format an error.
pub fn format_error(error: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => json(&serde_json::json!({
            "error": error_kind(error),
            "message": error.to_string(),
        })),
        OutputMode::Human => format!("(error) {}", error),
    }
}

fn error_kind(error: &Error) -> &'static str {
    match error {
        Error::Parse(_) => "parse",
        Error::Validation(_) => "validation",
        Error::Corruption(_) => "corruption",
        Error::Storage(_) | Error::Io(_) => "storage",
        Error::Serialization(_) => "serialization",
        Error::NotFound(_) => "not_found",
        Error::ReadOnly => "read_only",
        Error::Config(_) => "config",
    }
}

/// Format a single appended entry.
pub fn format_entry(entry: &LedgerEntry, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => json(entry),
        OutputMode::Human => format!("appended {}", history_line(entry)),
    }
}

/// Format a whole-ledger verification.
pub fn format_integrity(report: &IntegrityReport, mode: OutputMode) -> String {
    if mode == OutputMode::Json {
        return json(report);
    }
    let mut out = format!(
        "{} entries in {} sessions: {}",
        report.entries_checked,
        report.sessions_checked,
        if report.is_valid() { "OK" } else { "FAILED" }
    );
    for failure in &report.failures {
        out.push_str(&format!("\n  {}", failure));
    }
    out
}

fn format_human(output: &Output) -> String {
    match output {
        Output::Operations(entries) => list(entries, "(no active operations)", operation_line),
        Output::History(entries) => list(entries, "(no history)", history_line),
        Output::Revoked(revoked) => list(revoked, "(no revoked operations)", |r| {
            format!(
                "{}  {}  revoked {} by {}: {}",
                r.operation.timestamp,
                short(&r.operation.content_hash),
                r.revoked_at,
                short(&r.revoked_by),
                r.reason
            )
        }),
        Output::Timeline(points) => list(points, "(empty timeline)", |p| {
            format!("{}  {}  {:?}", p.timestamp, short(&p.hash), p.fusion_path)
        }),
        Output::Lineage(state) => {
            let mut out = lineage_lines(&state.lineage);
            if let Some(note) = &state.note {
                out.push_str(&format!("\nnote:         {}", note));
            }
            out
        }
        Output::Snapshots(records) => list(records, "(no snapshots)", snapshot_line),
        Output::LastSnapshot(record) => format!(
            "{}\n{}",
            snapshot_line(record),
            lineage_lines(&record.snapshot.lineage_state.lineage)
        ),
        Output::Audit(report) => format!(
            "operations:   {} ({} active)\n\
             revocations:  {}\n\
             snapshots:    {}\n\
             integrity:    {}\n\
             {}",
            report.total_operations,
            report.active_operations,
            report.revocations,
            report.snapshots,
            format_integrity(&report.integrity, OutputMode::Human),
            lineage_lines(&report.lineage)
        ),
        Output::SnapshotTaken(entry) => format!("snapshot {} recorded", entry.content_hash),
        Output::Revocation(RevokeOutcome::Revoked { entry }) => match &entry.body {
            EntryBody::Revocation(r) => format!("revoked {} ({})", r.revoked_hash, r.reason),
            _ => format!("revocation {} recorded", entry.content_hash),
        },
        Output::Revocation(RevokeOutcome::NoOp { conflict }) => {
            format!("(no-op) {}", conflict)
        }
    }
}

fn list<T>(items: &[T], empty: &str, line: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    items.iter().map(line).collect::<Vec<_>>().join("\n")
}

fn lineage_lines(lineage: &Lineage) -> String {
    format!(
        "events_order: {}\nfusion_path:  {:?}",
        if lineage.events_order.is_empty() {
            "(none)".to_string()
        } else {
            lineage.events_order.join(" -> ")
        },
        lineage.fusion_path
    )
}

fn operation_line(entry: &LedgerEntry) -> String {
    match entry.as_operation() {
        Some(op) => format!(
            "{}  {}  {}  => {}",
            entry.timestamp,
            short(&entry.content_hash),
            op.word,
            op.after.events_order.join(" ")
        ),
        None => history_line(entry),
    }
}

fn history_line(entry: &LedgerEntry) -> String {
    let detail = match &entry.body {
        EntryBody::Operation(op) => op.word.to_string(),
        EntryBody::Revocation(r) => format!("-> {} ({})", short(&r.revoked_hash), r.reason),
        EntryBody::Snapshot(s) => s.lineage_state.note.clone().unwrap_or_default(),
    };
    format!(
        "{}  {:<10}  {}  {}",
        entry.timestamp,
        entry.kind().as_str(),
        short(&entry.content_hash),
        detail
    )
}

fn snapshot_line(record: &SnapshotRecord) -> String {
    format!(
        "{}  {}  ops={} active={} revoked={}{}",
        record.timestamp,
        short(&record.hash),
        record.snapshot.total_operations,
        record.snapshot.active_operations,
        record.snapshot.revocations,
        record
            .snapshot
            .lineage_state
            .note
            .as_ref()
            .map(|n| format!("  \"{}\"", n))
            .unwrap_or_default()
    )
}

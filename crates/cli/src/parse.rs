//! ArgMatches / input line → action conversion.
//!
//! - `exec` and bare REPL lines → `CliAction::Statement`
//! - `append` → `CliAction::Append` with its JSON arguments decoded
//! - `verify`, `sessions` → whole-ledger actions
//! - REPL-only meta-commands → [`MetaCommand`] via [`check_meta_command`]

use clap::ArgMatches;
use lineage_core::{Attestation, Error, Lineage, Result, SessionId, Word};

/// The result of parsing user input.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// A statement for the executor.
    Statement(String),
    /// Validate and append an operation.
    Append {
        word: Word,
        before: Lineage,
        after: Lineage,
        attestation: Option<Attestation>,
    },
    /// Verify every entry and chain.
    Verify,
    /// List sessions.
    Sessions,
}

/// REPL meta-commands.
#[derive(Debug, PartialEq)]
pub enum MetaCommand {
    Use { session: SessionId },
    Help,
    Quit,
}

/// Check for REPL meta-commands before treating a line as a statement.
///
/// Returns `Some(MetaCommand)` if the line is a meta-command, `None` otherwise.
pub fn check_meta_command(line: &str) -> Option<MetaCommand> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next()?;

    match cmd.to_ascii_lowercase().as_str() {
        "quit" | "exit" | "\\q" => Some(MetaCommand::Quit),
        "help" | "\\?" => Some(MetaCommand::Help),
        "use" => {
            let session = parts.next()?;
            if parts.next().is_some() {
                return None;
            }
            Some(MetaCommand::Use {
                session: SessionId::from(session),
            })
        }
        _ => None,
    }
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction> {
    let (sub_name, sub_matches) = matches
        .subcommand()
        .ok_or_else(|| Error::Config("no command provided".to_string()))?;

    match sub_name {
        "exec" => {
            let words: Vec<String> = sub_matches
                .get_many::<String>("statement")
                .map(|values| values.map(String::as_str).map(quote_word).collect())
                .unwrap_or_default();
            Ok(CliAction::Statement(words.join(" ")))
        }
        "append" => parse_append(sub_matches),
        "verify" => Ok(CliAction::Verify),
        "sessions" => Ok(CliAction::Sessions),
        other => Err(Error::Config(format!("unknown command: {}", other))),
    }
}

/// Re-quote a shell argument so the statement tokenizer sees one token.
///
/// The shell has already removed the user's quotes; an argument holding
/// whitespace or quote characters would otherwise split or open a quote.
fn quote_word(word: &str) -> String {
    let plain = !word.is_empty()
        && !word
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\'' || c == '\\');
    if plain {
        return word.to_string();
    }
    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push('"');
    for c in word.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

// =========================================================================
// Append
// =========================================================================

fn parse_append(matches: &ArgMatches) -> Result<CliAction> {
    let word: Word = required(matches, "word")?.parse()?;
    let before = parse_lineage(required(matches, "before")?)?;
    let after = parse_lineage(required(matches, "after")?)?;
    let attestation = matches
        .get_one::<String>("attestation")
        .map(|raw| serde_json::from_str::<Attestation>(raw))
        .transpose()?;

    Ok(CliAction::Append {
        word,
        before,
        after,
        attestation,
    })
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| Error::Config(format!("missing --{}", name)))
}

/// Decode a lineage given as JSON.
pub fn parse_lineage(raw: &str) -> Result<Lineage> {
    Ok(serde_json::from_str(raw)?)
}

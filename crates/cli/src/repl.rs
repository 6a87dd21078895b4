//! Interactive shell and pipe mode.
//!
//! Both read one statement per line. A failing statement prints its error
//! and the loop carries on; only the pipe mode turns failures into a
//! nonzero exit code.

use std::io::{self, BufRead};
use std::path::PathBuf;

use lineage_executor::Executor;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::warn;

use crate::format::{format_error, format_output, OutputMode};
use crate::parse::{check_meta_command, MetaCommand};

const HELP: &str = "\
Statements (FOR <session> may be omitted once a session is selected):
  SHOW ACTIVE OPERATIONS [FOR s]
  SHOW REVOKED OPERATIONS [FOR s]
  SHOW OPERATION HISTORY [FOR s]
  SHOW FUSION TIMELINE [FOR s]
  SHOW LINEAGE [FOR s] AT <timestamp>
  SHOW SNAPSHOTS [FOR s]
  SHOW LAST SNAPSHOT [FOR s]
  AUDIT SESSION <s>
  SNAPSHOT LINEAGE [FOR s] [NOTE \"text\"]
  REVOKE <hash> [FOR s] [NOTE \"reason\"]
Meta-commands:
  use <session>   select the default session
  help            this text
  quit | exit     leave the shell";

enum Step {
    Continue { ok: bool },
    Quit,
}

fn handle_line(executor: &mut Executor, line: &str, mode: OutputMode) -> Step {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Step::Continue { ok: true };
    }

    if let Some(meta) = check_meta_command(line) {
        return match meta {
            MetaCommand::Quit => Step::Quit,
            MetaCommand::Help => {
                println!("{}", HELP);
                Step::Continue { ok: true }
            }
            MetaCommand::Use { session } => {
                executor.set_default_session(session);
                Step::Continue { ok: true }
            }
        };
    }

    match executor.run(line) {
        Ok(executed) => {
            println!("{}", format_output(&executed, mode));
            Step::Continue { ok: true }
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            Step::Continue { ok: false }
        }
    }
}

fn prompt(executor: &Executor) -> String {
    match executor.default_session() {
        Some(session) => format!("lineage:{}> ", session),
        None => "lineage> ".to_string(),
    }
}

fn history_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".lineage_history"))
}

/// Run the interactive shell until `quit` or end of input.
pub fn run_repl(executor: &mut Executor, mode: OutputMode) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("(error) failed to start line editor: {}", e);
            return;
        }
    };
    let history = history_path();
    if let Some(path) = &history {
        // A missing history file is normal on first run.
        let _ = editor.load_history(path);
    }

    loop {
        match editor.readline(&prompt(executor)) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                if let Step::Quit = handle_line(executor, &line, mode) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("(error) {}", e);
                break;
            }
        }
    }

    if let Some(path) = &history {
        if let Err(e) = editor.save_history(path) {
            warn!(error = %e, "failed to save shell history");
        }
    }
}

/// Execute statements read from stdin, one per line.
///
/// Returns 0 when every statement succeeded, 1 otherwise.
pub fn run_pipe(executor: &mut Executor, mode: OutputMode) -> i32 {
    let stdin = io::stdin();
    let mut failed = false;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("(error) failed to read stdin: {}", e);
                return 1;
            }
        };
        match handle_line(executor, &line, mode) {
            Step::Quit => break,
            Step::Continue { ok } => failed |= !ok,
        }
    }

    i32::from(failed)
}

//! Lineage CLI: query and append to a lineage ledger.
//!
//! Three modes:
//! - **Shell mode**: `lineage [flags] exec STATEMENT...` (or `append`,
//!   `verify`, `sessions`), run once and exit
//! - **REPL mode**: `lineage [flags]`, interactive prompt when stdin is a TTY
//! - **Pipe mode**: `echo "AUDIT SESSION s" | lineage`, one statement per line
//!
//! Exit codes: 0 success, 1 rejected or failed command, 2 integrity failure.

mod commands;
mod format;
mod parse;
mod repl;

use std::io::IsTerminal;
use std::path::Path;
use std::process;
use std::sync::Arc;

use lineage_core::{Error, Result, SessionId};
use lineage_engine::{AccessMode, Ledger, LedgerConfig};
use lineage_executor::Executor;
use lineage_storage::DurabilityMode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_entry, format_error, format_integrity, format_output, OutputMode};
use parse::{matches_to_action, CliAction};

const DEFAULT_CONFIG: &str = "lineage.toml";
const DEFAULT_LEDGER: &str = "lineage-ledger.jsonl";

fn main() {
    let cli = build_cli();
    let matches = cli.get_matches();

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_error(&e, output_mode));
            process::exit(1);
        }
    };

    init_tracing(config.log_level.as_deref());

    let ledger = match Ledger::open(config) {
        Ok(ledger) => ledger,
        Err(e) => {
            eprintln!("{}", format_error(&e, output_mode));
            process::exit(1);
        }
    };
    let recovery = ledger.recovery();
    info!(
        path = %ledger.path().display(),
        entries = recovery.entries,
        sessions = recovery.sessions,
        "ledger opened"
    );

    let mut executor = Executor::new(Arc::new(ledger));

    if matches.subcommand().is_some() {
        let exit_code = run_shell_mode(&matches, &executor, output_mode);
        process::exit(exit_code);
    } else if std::io::stdin().is_terminal() {
        repl::run_repl(&mut executor, output_mode);
    } else {
        let exit_code = repl::run_pipe(&mut executor, output_mode);
        process::exit(exit_code);
    }
}

/// `RUST_LOG` wins over the configured level; logs go to stderr so they
/// never mix with command output.
fn init_tracing(configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(configured.unwrap_or("warn")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(matches: &clap::ArgMatches) -> Result<LedgerConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => LedgerConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG).is_file() => LedgerConfig::load(DEFAULT_CONFIG)?,
        None => LedgerConfig::new(DEFAULT_LEDGER),
    };

    if let Some(path) = matches.get_one::<String>("ledger") {
        config.path = path.into();
    }
    if let Some(session) = matches.get_one::<String>("session") {
        config.default_session = Some(session.clone());
    }
    if matches.get_flag("read-only") {
        config.access_mode = AccessMode::ReadOnly;
    }
    if matches.get_flag("relaxed") {
        config.durability = DurabilityMode::Relaxed;
    }
    Ok(config)
}

fn run_shell_mode(matches: &clap::ArgMatches, executor: &Executor, mode: OutputMode) -> i32 {
    let action = match matches_to_action(matches) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            return 1;
        }
    };
    debug!(?action, "shell action");

    match action {
        CliAction::Statement(statement) => match executor.run(&statement) {
            Ok(executed) => {
                println!("{}", format_output(&executed, mode));
                0
            }
            Err(e) => {
                eprintln!("{}", format_error(&e, mode));
                1
            }
        },
        CliAction::Append {
            word,
            before,
            after,
            attestation,
        } => {
            let appended = session_for_append(executor).and_then(|session| {
                executor
                    .ledger()
                    .append_operation(&session, word, before, after, attestation)
            });
            match appended {
                Ok(entry) => {
                    println!("{}", format_entry(&entry, mode));
                    0
                }
                Err(e) => {
                    eprintln!("{}", format_error(&e, mode));
                    1
                }
            }
        }
        CliAction::Verify => match executor.ledger().verify() {
            Ok(report) => {
                println!("{}", format_integrity(&report, mode));
                if report.is_valid() {
                    0
                } else {
                    2
                }
            }
            Err(e) => {
                eprintln!("{}", format_error(&e, mode));
                if e.is_corruption() {
                    2
                } else {
                    1
                }
            }
        },
        CliAction::Sessions => match executor.ledger().sessions() {
            Ok(sessions) => {
                match mode {
                    OutputMode::Json => println!(
                        "{}",
                        serde_json::to_string_pretty(&sessions).unwrap_or_default()
                    ),
                    OutputMode::Human if sessions.is_empty() => println!("(no sessions)"),
                    OutputMode::Human => {
                        for session in &sessions {
                            println!("{}", session);
                        }
                    }
                }
                0
            }
            Err(e) => {
                eprintln!("{}", format_error(&e, mode));
                1
            }
        },
    }
}

fn session_for_append(executor: &Executor) -> Result<SessionId> {
    executor.default_session().cloned().ok_or_else(|| {
        Error::Config("append needs a session: pass --session or set default_session".into())
    })
}

//! clap command tree.

use clap::{Arg, ArgAction, Command};

/// Build the top-level command.
pub fn build_cli() -> Command {
    Command::new("lineage")
        .about("Tamper-evident lineage ledger")
        .long_about(
            "Tamper-evident lineage ledger.\n\n\
             Without a subcommand, starts an interactive shell when stdin is a \
             terminal and reads one statement per line otherwise.",
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("TOML configuration file (default: ./lineage.toml if present)"),
        )
        .arg(
            Arg::new("ledger")
                .long("ledger")
                .short('l')
                .value_name("PATH")
                .help("Ledger file, overriding the configured path"),
        )
        .arg(
            Arg::new("session")
                .long("session")
                .short('s')
                .value_name("SESSION")
                .help("Default session for statements without FOR"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print results as JSON"),
        )
        .arg(
            Arg::new("read-only")
                .long("read-only")
                .action(ArgAction::SetTrue)
                .help("Open the ledger without a writer"),
        )
        .arg(
            Arg::new("relaxed")
                .long("relaxed")
                .action(ArgAction::SetTrue)
                .help("Skip fsync after each append"),
        )
        .subcommand(
            Command::new("exec")
                .about("Run one statement, e.g. SHOW ACTIVE OPERATIONS FOR session-1")
                .arg(
                    Arg::new("statement")
                        .required(true)
                        .num_args(1..)
                        .value_name("STATEMENT"),
                ),
        )
        .subcommand(
            Command::new("append")
                .about("Validate and append an operation")
                .arg(
                    Arg::new("word")
                        .long("word")
                        .short('w')
                        .required(true)
                        .value_name("WORD")
                        .help("Steps such as \"B2 B1^-1 B2\""),
                )
                .arg(
                    Arg::new("before")
                        .long("before")
                        .required(true)
                        .value_name("JSON")
                        .help("Lineage before, {\"events_order\": [...], \"fusion_path\": [...]}"),
                )
                .arg(
                    Arg::new("after")
                        .long("after")
                        .required(true)
                        .value_name("JSON")
                        .help("Lineage after"),
                )
                .arg(
                    Arg::new("attestation")
                        .long("attestation")
                        .value_name("JSON")
                        .help("Attestation, {\"digest\": \"...\", \"summary\": {...}}"),
                ),
        )
        .subcommand(Command::new("verify").about("Check every content hash and session chain"))
        .subcommand(Command::new("sessions").about("List sessions present in the ledger"))
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

use crate::models::{TxKind, TxStatus};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn yes_arg() -> Arg {
    Arg::new("yes")
        .long("yes")
        .short('y')
        .action(ArgAction::SetTrue)
        .help("Skip confirmation prompts")
}

fn tx_command() -> Command {
    // Field arguments default to blank so the ledger can report what is missing
    // for the chosen type rather than clap rejecting them up front.
    let add = Command::new("add")
        .about("Record a BUY, SELL, DEPOSIT or WITHDRAW")
        .arg(
            Arg::new("type")
                .long("type")
                .short('t')
                .value_parser(value_parser!(TxKind))
                .default_value("BUY"),
        )
        .arg(Arg::new("date").long("date").default_value(""))
        .arg(Arg::new("pair").long("pair").default_value(""))
        .arg(
            Arg::new("price")
                .long("price")
                .allow_hyphen_values(true)
                .default_value("")
                .help("Unit price, or the cash amount for DEPOSIT/WITHDRAW"),
        )
        .arg(
            Arg::new("amount")
                .long("amount")
                .allow_hyphen_values(true)
                .default_value(""),
        )
        .arg(
            Arg::new("fee")
                .long("fee")
                .allow_hyphen_values(true)
                .default_value(""),
        )
        .arg(
            Arg::new("status")
                .long("status")
                .value_parser(value_parser!(TxStatus))
                .help("OPEN or CLOSED for SELL; ignored for other types"),
        )
        .arg(Arg::new("note").long("note").default_value(""));

    let list = json_args(
        Command::new("list")
            .about("Show the ledger with running balances")
            .arg(
                Arg::new("type")
                    .long("type")
                    .short('t')
                    .value_parser(value_parser!(TxKind)),
            )
            .arg(Arg::new("pair").long("pair"))
            .arg(
                Arg::new("match")
                    .long("match")
                    .help("Regex matched against pair and note"),
            )
            .arg(
                Arg::new("limit")
                    .long("limit")
                    .value_parser(value_parser!(usize))
                    .help("Only the most recent N rows"),
            ),
    );

    let rm = Command::new("rm")
        .about("Delete a transaction by id and rebuild balances")
        .arg(
            Arg::new("id")
                .long("id")
                .required(true)
                .value_parser(value_parser!(u64)),
        )
        .arg(yes_arg());

    Command::new("tx")
        .about("Ledger transactions")
        .subcommand_required(true)
        .subcommand(add)
        .subcommand(list)
        .subcommand(rm)
}

pub fn build_cli() -> Command {
    Command::new("coinledger")
        .version(crate_version!())
        .about("Single-user crypto trade ledger")
        .subcommand(Command::new("init").about("Create the local ledger store"))
        .subcommand(tx_command())
        .subcommand(json_args(
            Command::new("dashboard").about("Portfolio value, P&L, ROI and recent activity"),
        ))
        .subcommand(json_args(
            Command::new("stats").about("Win rate, profit factor, per-pair and monthly stats"),
        ))
        .subcommand(
            Command::new("export")
                .about("Export the ledger to a spreadsheet")
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .default_value("xlsx")
                        .help("xlsx|csv|json"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .help("Output file (default Crypto_Portfolio_<date>.<ext>)"),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Restore history from a JSON export")
                .subcommand_required(true)
                .subcommand(
                    Command::new("history")
                        .arg(Arg::new("path").long("path").required(true))
                        .arg(yes_arg()),
                ),
        )
        .subcommand(
            Command::new("clear")
                .about("Delete every transaction")
                .arg(yes_arg()),
        )
        .subcommand(
            Command::new("config")
                .about("Display settings")
                .subcommand_required(true)
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set-lang")
                        .about("Export header language")
                        .arg(Arg::new("lang").required(true).help("th|en")),
                )
                .subcommand(
                    Command::new("set-symbol")
                        .about("Currency symbol used in views")
                        .arg(Arg::new("symbol").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored history for inconsistencies"))
}

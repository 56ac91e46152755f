// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use coinledger::cli;
use coinledger::commands::{statistics, transactions};
use coinledger::db::{self, HISTORY_KEY};
use coinledger::models::{TxKind, TxStatus};
use rusqlite::{Connection, params};
use std::io::Cursor;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run_tx(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["coinledger", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(conn, tx_m)
    } else {
        panic!("no tx subcommand");
    }
}

fn rm_answering(conn: &Connection, id: &str, answers: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from(["coinledger", "tx", "rm", "--id", id]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle_with_input(conn, tx_m, &mut Cursor::new(answers))
    } else {
        panic!("no tx subcommand");
    }
}

fn raw_value(conn: &Connection) -> Option<String> {
    conn.query_row(
        "SELECT value FROM storage WHERE key=?1",
        params![HISTORY_KEY],
        |r| r.get(0),
    )
    .ok()
}

fn seed(conn: &Connection) {
    run_tx(conn, &["add", "--type", "deposit", "--date", "2025-01-01", "--price", "1000"]).unwrap();
    run_tx(
        conn,
        &[
            "add", "--type", "BUY", "--date", "2025-01-02", "--pair", "BTC/USDT", "--price",
            "100", "--amount", "1", "--fee", "1",
        ],
    )
    .unwrap();
    run_tx(
        conn,
        &[
            "add", "--type", "BUY", "--date", "2025-01-03", "--pair", "BTC/USDT", "--price",
            "200", "--amount", "1", "--fee", "2",
        ],
    )
    .unwrap();
    run_tx(
        conn,
        &[
            "add", "--type", "sell", "--date", "2025-01-04", "--pair", "BTC/USDT", "--price",
            "250", "--amount", "1", "--fee", "1", "--status", "closed", "--note", "take profit",
        ],
    )
    .unwrap();
}

#[test]
fn add_through_cli_persists_rebuilt_history() {
    let conn = setup();
    seed(&conn);

    let history = db::load_history(&conn).unwrap();
    assert_eq!(history.len(), 4);
    let sell = &history[3];
    assert_eq!(sell.kind, TxKind::Sell);
    assert_eq!(sell.status, TxStatus::Closed);
    assert_eq!(sell.realized_pnl, 47.0);
    assert_eq!(sell.note, "take profit");
    // 1000 - 101 - 202 + 249
    assert_eq!(sell.cash_balance, 946.0);
    assert_eq!(sell.capital_balance, 1000.0);
    assert_eq!(sell.profit_balance, 47.0);
    assert_eq!(sell.portfolio_value, 1993.0);
}

#[test]
fn missing_field_is_rejected_without_touching_store() {
    let conn = setup();
    seed(&conn);
    let before = db::load_history(&conn).unwrap();

    let err = run_tx(&conn, &["add", "--type", "BUY", "--date", "2025-02-01", "--price", "5"])
        .unwrap_err();
    assert!(err.to_string().contains("pair is required"));

    let err = run_tx(&conn, &["add", "--type", "WITHDRAW", "--price", "5"]).unwrap_err();
    assert!(err.to_string().contains("date is required"));

    assert_eq!(db::load_history(&conn).unwrap(), before);
}

#[test]
fn malformed_date_is_rejected() {
    let conn = setup();
    let err = run_tx(&conn, &["add", "--type", "DEPOSIT", "--date", "01/02/2025", "--price", "5"])
        .unwrap_err();
    assert!(err.to_string().contains("Invalid date"));
    assert!(db::load_history(&conn).unwrap().is_empty());
}

#[test]
fn unpadded_date_is_stored_zero_padded() {
    let conn = setup();
    run_tx(&conn, &["add", "--type", "DEPOSIT", "--date", "2025-1-5", "--price", "10"]).unwrap();
    run_tx(&conn, &["add", "--type", "DEPOSIT", "--date", " 2025-01-20 ", "--price", "5"])
        .unwrap();

    let history = db::load_history(&conn).unwrap();
    assert_eq!(history[0].date, "2025-01-05");
    assert_eq!(history[1].date, "2025-01-20");

    let months = statistics::monthly_stats(&history);
    assert_eq!(months.len(), 1);
    assert_eq!(months[0].month, "2025-01");
    assert_eq!(months[0].deposits, 15.0);
}

#[test]
fn declined_rm_keeps_history_and_stored_value() {
    let conn = setup();
    seed(&conn);
    let before = db::load_history(&conn).unwrap();
    let raw_before = raw_value(&conn);

    // No at the first prompt.
    rm_answering(&conn, "2", "n\n").unwrap();
    assert_eq!(db::load_history(&conn).unwrap(), before);
    assert_eq!(raw_value(&conn), raw_before);

    // Yes, then no at the second prompt.
    rm_answering(&conn, "2", "y\nn\n").unwrap();
    assert_eq!(db::load_history(&conn).unwrap(), before);
    assert_eq!(raw_value(&conn), raw_before);

    // Input ends after the first answer.
    rm_answering(&conn, "2", "yes\n").unwrap();
    assert_eq!(raw_value(&conn), raw_before);
}

#[test]
fn rm_accepted_twice_deletes_row() {
    let conn = setup();
    seed(&conn);
    rm_answering(&conn, "1", "y\nyes\n").unwrap();
    let history = db::load_history(&conn).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].kind, TxKind::Buy);
    assert_eq!(history[0].id, 1);
}

#[test]
fn rm_with_yes_renumbers_remaining_rows() {
    let conn = setup();
    seed(&conn);

    run_tx(&conn, &["rm", "--id", "2", "--yes"]).unwrap();
    let history = db::load_history(&conn).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(
        history.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    // The stored SELL keeps the P&L it was resolved with.
    assert_eq!(history[2].realized_pnl, 47.0);
    assert_eq!(history[2].cash_balance, 1000.0 - 202.0 + 249.0);
}

#[test]
fn rm_of_unknown_id_leaves_history_alone() {
    let conn = setup();
    seed(&conn);
    let before = db::load_history(&conn).unwrap();
    run_tx(&conn, &["rm", "--id", "42", "--yes"]).unwrap();
    assert_eq!(db::load_history(&conn).unwrap(), before);
}

#[test]
fn list_filters_keep_ledger_order() {
    let conn = setup();
    seed(&conn);
    let history = db::load_history(&conn).unwrap();

    let matches =
        cli::build_cli().get_matches_from(["coinledger", "tx", "list", "--type", "buy"]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let Some(("list", list_m)) = tx_m.subcommand() else {
        panic!("no list subcommand");
    };
    let rows = transactions::filter_rows(&history, list_m).unwrap();
    assert_eq!(rows.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 3]);

    let matches = cli::build_cli().get_matches_from([
        "coinledger", "tx", "list", "--match", "profit", "--limit", "1",
    ]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let Some(("list", list_m)) = tx_m.subcommand() else {
        panic!("no list subcommand");
    };
    let rows = transactions::filter_rows(&history, list_m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 4);

    let matches =
        cli::build_cli().get_matches_from(["coinledger", "tx", "list", "--limit", "2"]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let Some(("list", list_m)) = tx_m.subcommand() else {
        panic!("no list subcommand");
    };
    let rows = transactions::filter_rows(&history, list_m).unwrap();
    assert_eq!(rows.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 4]);
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use coinledger::commands::exporter::{self, ExportFormat};
use coinledger::ledger::add_transaction;
use coinledger::models::{Transaction, TransactionEntry, TxKind, TxStatus};
use coinledger::utils::HeaderLang;
use coinledger::{cli, db};
use rusqlite::Connection;
use tempfile::tempdir;

fn history() -> Vec<Transaction> {
    let mut deposit = TransactionEntry::new(TxKind::Deposit, "2025-06-01");
    deposit.price = "1000".into();
    let mut buy = TransactionEntry::new(TxKind::Buy, "2025-06-02");
    buy.pair = "BTC/USDT".into();
    buy.price = "100".into();
    buy.amount = "2".into();
    buy.fee = "0.5".into();
    let mut sell = TransactionEntry::new(TxKind::Sell, "2025-06-03");
    sell.pair = "BTC/USDT".into();
    sell.price = "120".into();
    sell.amount = "2".into();
    sell.status = Some(TxStatus::Closed);
    sell.note = "said \"done\", closed".into();
    [deposit, buy, sell]
        .iter()
        .fold(Vec::new(), |h, e| add_transaction(&h, e).unwrap())
}

fn setup(history: &[Transaction]) -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    db::save_history(&conn, history).unwrap();
    conn
}

#[test]
fn default_file_name_embeds_iso_date() {
    let date = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
    assert_eq!(
        exporter::default_file_name(date, ExportFormat::Xlsx),
        "Crypto_Portfolio_2025-07-04.xlsx"
    );
    assert_eq!(
        exporter::default_file_name(date, ExportFormat::Csv),
        "Crypto_Portfolio_2025-07-04.csv"
    );
}

#[test]
fn rows_follow_history_order_and_columns() {
    let h = history();
    let rows: Vec<[String; 15]> = h.iter().map(exporter::export_row).collect();
    assert_eq!(rows.len(), h.len());
    for (row, t) in rows.iter().zip(&h) {
        assert_eq!(row[0], t.id.to_string());
        assert_eq!(row[1], t.date);
        assert_eq!(row[2], t.kind.as_str());
        assert_eq!(row[3], t.pair);
        assert_eq!(row[6].parse::<f64>().unwrap(), t.total_value);
        assert_eq!(row[8].parse::<f64>().unwrap(), t.realized_pnl);
        assert_eq!(row[9], t.status.as_str());
        assert_eq!(row[13].parse::<f64>().unwrap(), t.portfolio_value);
        assert_eq!(row[14], t.note);
    }
    assert_eq!(rows[2][8], "39.5");
}

#[test]
fn csv_has_bom_plain_headers_and_quoted_cells() {
    let h = history();
    let mut buf = Vec::new();
    exporter::write_csv(&mut buf, &h, HeaderLang::English).unwrap();

    assert!(buf.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8(buf[3..].to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1 + h.len());
    assert_eq!(
        lines[0],
        "ID,Date,Type,Pair,Price,Amount,TotalValue,Fee,ProfitLoss,Status,CashBalance,CapitalBalance,ProfitBalance,PortfolioValue,Note"
    );
    assert!(lines[1].starts_with("\"1\",\"2025-06-01\",\"DEPOSIT\",\"-\",\"1000\""));
    assert!(lines[3].ends_with("\"said \"\"done\"\", closed\""));

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), h.len());
    assert_eq!(&records[2][14], "said \"done\", closed");
}

#[test]
fn thai_headers_are_default() {
    let conn = setup(&[]);
    assert_eq!(coinledger::utils::get_header_lang(&conn).unwrap(), HeaderLang::Thai);
    let headers = exporter::headers(HeaderLang::Thai);
    assert_eq!(headers[0], "ID");
    assert_eq!(headers[1], "วันที่");
    assert_eq!(headers.len(), exporter::COLUMN_WIDTHS.len());
}

#[test]
fn xlsx_export_writes_workbook() {
    let conn = setup(&history());
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("ledger.xlsx");
    let out_str = out_path.to_string_lossy().to_string();

    let matches = cli::build_cli().get_matches_from([
        "coinledger", "export", "--format", "xlsx", "--out", &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&conn, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let bytes = std::fs::read(&out_path).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn json_export_matches_stored_history() {
    let h = history();
    let conn = setup(&h);
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("ledger.json");
    let out_str = out_path.to_string_lossy().to_string();

    let matches = cli::build_cli().get_matches_from([
        "coinledger", "export", "-f", "json", "-o", &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&conn, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let contents = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(db::decode_history(&contents).unwrap(), h);
}

#[test]
fn export_rejects_unknown_format() {
    let conn = setup(&history());
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    let matches = cli::build_cli().get_matches_from([
        "coinledger", "export", "--format", "xml", "--out", &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        assert!(exporter::handle(&conn, export_m).is_err());
    } else {
        panic!("no export subcommand");
    }
    assert!(!out_path.exists());
}

#[test]
fn export_failure_is_reported() {
    let conn = setup(&history());
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("missing-dir").join("ledger.csv");
    let out_str = out_path.to_string_lossy().to_string();

    let matches = cli::build_cli().get_matches_from([
        "coinledger", "export", "--format", "csv", "--out", &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        let err = exporter::handle(&conn, export_m).unwrap_err();
        assert!(format!("{:#}", err).contains("export failed"));
    } else {
        panic!("no export subcommand");
    }
    assert_eq!(db::load_history(&conn).unwrap(), history());
}

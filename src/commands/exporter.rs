// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_history;
use crate::errors::LedgerError;
use crate::models::Transaction;
use crate::utils::{HeaderLang, fmt_num, get_header_lang};
use anyhow::{Result, anyhow};
use chrono::{NaiveDate, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use rusqlite::Connection;
use rust_xlsxwriter::Workbook;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const SHEET_NAME: &str = "Trade Ledger";
pub const COLUMN_WIDTHS: [u16; 15] = [5, 12, 10, 12, 12, 15, 15, 12, 15, 10, 15, 15, 15, 15, 20];

const HEADERS_EN: [&str; 15] = [
    "ID",
    "Date",
    "Type",
    "Pair",
    "Price",
    "Amount",
    "TotalValue",
    "Fee",
    "ProfitLoss",
    "Status",
    "CashBalance",
    "CapitalBalance",
    "ProfitBalance",
    "PortfolioValue",
    "Note",
];

const HEADERS_TH: [&str; 15] = [
    "ID",
    "วันที่",
    "ประเภท",
    "คู่เทรด",
    "ราคา",
    "จำนวน",
    "มูลค่ารวม",
    "ค่าธรรมเนียม",
    "กำไร/ขาดทุน",
    "สถานะ",
    "เงินสดคงเหลือ",
    "เงินทุนสุทธิ",
    "กำไรสะสม",
    "มูลค่าพอร์ต",
    "หมายเหตุ",
];

const BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(anyhow!("Unknown format: {} (use xlsx|csv|json)", other)),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

pub fn headers(lang: HeaderLang) -> [&'static str; 15] {
    match lang {
        HeaderLang::Thai => HEADERS_TH,
        HeaderLang::English => HEADERS_EN,
    }
}

pub fn default_file_name(date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "Crypto_Portfolio_{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// One export row per transaction, in the fixed column order.
pub fn export_row(t: &Transaction) -> [String; 15] {
    [
        t.id.to_string(),
        t.date.clone(),
        t.kind.to_string(),
        t.pair.clone(),
        fmt_num(t.price),
        fmt_num(t.amount),
        fmt_num(t.total_value),
        fmt_num(t.fee),
        fmt_num(t.realized_pnl),
        t.status.to_string(),
        fmt_num(t.cash_balance),
        fmt_num(t.capital_balance),
        fmt_num(t.profit_balance),
        fmt_num(t.portfolio_value),
        t.note.clone(),
    ]
}

/// BOM, a bare header line, then every data cell double-quoted.
pub fn write_csv<W: Write>(
    mut out: W,
    history: &[Transaction],
    lang: HeaderLang,
) -> std::result::Result<(), LedgerError> {
    out.write_all(BOM).map_err(LedgerError::export)?;
    out.write_all(headers(lang).join(",").as_bytes())
        .map_err(LedgerError::export)?;
    out.write_all(b"\n").map_err(LedgerError::export)?;

    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);
    for t in history {
        wtr.write_record(export_row(t)).map_err(LedgerError::export)?;
    }
    wtr.flush().map_err(LedgerError::export)?;
    Ok(())
}

pub fn build_workbook(
    history: &[Transaction],
    lang: HeaderLang,
) -> std::result::Result<Workbook, LedgerError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(LedgerError::export)?;

    for (col, (title, width)) in headers(lang).iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        sheet.write_string(0, col, *title).map_err(LedgerError::export)?;
        sheet.set_column_width(col, width).map_err(LedgerError::export)?;
    }

    for (i, t) in history.iter().enumerate() {
        let row = i as u32 + 1;
        let numbers = [
            (0, t.id as f64),
            (4, t.price),
            (5, t.amount),
            (6, t.total_value),
            (7, t.fee),
            (8, t.realized_pnl),
            (10, t.cash_balance),
            (11, t.capital_balance),
            (12, t.profit_balance),
            (13, t.portfolio_value),
        ];
        for (col, v) in numbers {
            sheet.write_number(row, col, v).map_err(LedgerError::export)?;
        }
        let strings = [
            (1, t.date.as_str()),
            (2, t.kind.as_str()),
            (3, t.pair.as_str()),
            (9, t.status.as_str()),
            (14, t.note.as_str()),
        ];
        for (col, v) in strings {
            sheet.write_string(row, col, v).map_err(LedgerError::export)?;
        }
    }
    Ok(workbook)
}

pub fn export_to_path(
    history: &[Transaction],
    format: ExportFormat,
    lang: HeaderLang,
    path: &Path,
) -> std::result::Result<(), LedgerError> {
    match format {
        ExportFormat::Xlsx => {
            let mut workbook = build_workbook(history, lang)?;
            workbook.save(path).map_err(LedgerError::export)?;
        }
        ExportFormat::Csv => {
            let file = std::fs::File::create(path).map_err(LedgerError::export)?;
            write_csv(std::io::BufWriter::new(file), history, lang)?;
        }
        ExportFormat::Json => {
            let raw = serde_json::to_string_pretty(history).map_err(LedgerError::export)?;
            std::fs::write(path, raw).map_err(LedgerError::export)?;
        }
    }
    Ok(())
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.as_str())
        .unwrap_or("xlsx");
    let format = ExportFormat::parse(fmt)?;
    let out = match sub.get_one::<String>("out") {
        Some(p) => PathBuf::from(p.trim()),
        None => PathBuf::from(default_file_name(Utc::now().date_naive(), format)),
    };

    let history = load_history(conn)?;
    let lang = get_header_lang(conn)?;
    if let Err(e) = export_to_path(&history, format, lang, &out) {
        error!(error = %e, path = %out.display(), "export failed");
        return Err(anyhow!(e).context(format!("Could not export to {}", out.display())));
    }
    info!(rows = history.len(), path = %out.display(), "exported ledger");
    println!("Exported {} transactions to {}", history.len(), out.display());
    Ok(())
}

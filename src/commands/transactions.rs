// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{load_history, save_history};
use crate::ledger;
use crate::models::{Transaction, TransactionEntry, TxKind, TxStatus};
use crate::utils::{
    confirm_twice, fmt_money, get_currency_symbol, maybe_print_json, parse_date, pretty_table,
};
use anyhow::{Context, Result};
use regex::Regex;
use rusqlite::Connection;
use std::io::BufRead;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let stdin = std::io::stdin();
    handle_with_input(conn, m, &mut stdin.lock())
}

/// Same as [`handle`], with confirmation answers read from `input`.
pub fn handle_with_input<R: BufRead>(
    conn: &Connection,
    m: &clap::ArgMatches,
    input: &mut R,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub, input)?,
        _ => {}
    }
    Ok(())
}

fn arg(sub: &clap::ArgMatches, name: &str) -> String {
    sub.get_one::<String>(name).cloned().unwrap_or_default()
}

pub fn entry_from_args(sub: &clap::ArgMatches) -> Result<TransactionEntry> {
    let kind = sub
        .get_one::<TxKind>("type")
        .copied()
        .unwrap_or(TxKind::Buy);
    let raw_date = arg(sub, "date");
    let date = match raw_date.trim() {
        "" => String::new(),
        d => parse_date(d)?.format("%Y-%m-%d").to_string(),
    };
    Ok(TransactionEntry {
        date,
        kind,
        pair: arg(sub, "pair"),
        price: arg(sub, "price"),
        amount: arg(sub, "amount"),
        fee: arg(sub, "fee"),
        status: sub.get_one::<TxStatus>("status").copied(),
        note: arg(sub, "note"),
    })
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let entry = entry_from_args(sub)?;
    let history = load_history(conn)?;
    let updated = ledger::add_transaction(&history, &entry)?;
    save_history(conn, &updated)?;

    let symbol = get_currency_symbol(conn)?;
    if let Some(tx) = updated.last() {
        info!(id = tx.id, kind = %tx.kind, "recorded transaction");
        println!(
            "Recorded #{} {} {} total {} (portfolio {})",
            tx.id,
            tx.kind,
            tx.pair,
            fmt_money(tx.total_value, &symbol),
            fmt_money(tx.portfolio_value, &symbol)
        );
    }
    Ok(())
}

fn remove<R: BufRead>(conn: &Connection, sub: &clap::ArgMatches, input: &mut R) -> Result<()> {
    let id = *sub.get_one::<u64>("id").context("id missing")?;
    let assume_yes = sub.get_flag("yes");
    let history = load_history(conn)?;
    let Some(target) = history.iter().find(|t| t.id == id) else {
        println!("No transaction with id {}", id);
        return Ok(());
    };

    let symbol = get_currency_symbol(conn)?;
    let summary = format!(
        "Delete transaction #{} ({} {} {} on {}, value {})?",
        target.id,
        target.kind,
        target.pair,
        target.status,
        target.date,
        fmt_money(target.total_value, &symbol)
    );
    let second = "Are you sure? This cannot be undone.";
    if !confirm_twice(input, &summary, second, assume_yes)? {
        println!("Cancelled");
        return Ok(());
    }

    let updated = ledger::delete_transaction(&history, id);
    save_history(conn, &updated)?;
    info!(id, remaining = updated.len(), "deleted transaction");
    println!("Deleted transaction #{} ({} remaining)", id, updated.len());
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let history = load_history(conn)?;
    let data = filter_rows(&history, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let symbol = get_currency_symbol(conn)?;
        let rows: Vec<Vec<String>> = data.iter().map(|t| ledger_row(t, &symbol)).collect();
        println!("Transactions: {}", history.len());
        println!(
            "{}",
            pretty_table(
                &[
                    "ID", "Date", "Type", "Pair", "Price", "Amount", "Total", "Fee", "P/L",
                    "Status", "Cash", "Capital", "Profit", "Portfolio", "Note",
                ],
                rows,
            )
        );
    }
    Ok(())
}

fn ledger_row(t: &Transaction, symbol: &str) -> Vec<String> {
    let amount = if t.amount != 0.0 {
        format!("{:.8}", t.amount)
    } else {
        "-".to_string()
    };
    let pnl = if t.realized_pnl != 0.0 {
        fmt_money(t.realized_pnl, symbol)
    } else {
        "-".to_string()
    };
    vec![
        t.id.to_string(),
        t.date.clone(),
        t.kind.to_string(),
        t.pair.clone(),
        format!("{:.2}", t.price),
        amount,
        fmt_money(t.total_value, symbol),
        fmt_money(t.fee, symbol),
        pnl,
        t.status.to_string(),
        fmt_money(t.cash_balance, symbol),
        fmt_money(t.capital_balance, symbol),
        fmt_money(t.profit_balance, symbol),
        fmt_money(t.portfolio_value, symbol),
        t.note.clone(),
    ]
}

/// Apply the `list` filters. Rows keep ledger order; `--limit` keeps the newest.
pub fn filter_rows<'a>(
    history: &'a [Transaction],
    sub: &clap::ArgMatches,
) -> Result<Vec<&'a Transaction>> {
    let kind = sub.get_one::<TxKind>("type").copied();
    let pair = sub.get_one::<String>("pair").map(|s| s.trim().to_string());
    let pattern = match sub.get_one::<String>("match") {
        Some(p) => Some(Regex::new(p).with_context(|| format!("Invalid pattern '{}'", p))?),
        None => None,
    };

    let mut data: Vec<&Transaction> = history
        .iter()
        .filter(|t| kind.is_none_or(|k| t.kind == k))
        .filter(|t| {
            pair.as_deref()
                .is_none_or(|p| t.pair.eq_ignore_ascii_case(p))
        })
        .filter(|t| {
            pattern
                .as_ref()
                .is_none_or(|re| re.is_match(&t.pair) || re.is_match(&t.note))
        })
        .collect();

    if let Some(limit) = sub.get_one::<usize>("limit") {
        let skip = data.len().saturating_sub(*limit);
        data.drain(..skip);
    }
    Ok(data)
}

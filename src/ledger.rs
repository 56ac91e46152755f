// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance engine: resolves entries into transactions and rebuilds the
//! running balances over the whole history after every mutation.

use crate::errors::LedgerError;
use crate::models::{Transaction, TransactionEntry, TxKind, TxStatus};

/// Lenient numeric parse used for form fields: anything unparseable becomes 0.
pub fn coerce_number(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

fn require(kind: TxKind, field: &'static str, value: &str) -> Result<(), LedgerError> {
    if value.trim().is_empty() {
        return Err(LedgerError::MissingField { kind, field });
    }
    Ok(())
}

fn validate(entry: &TransactionEntry) -> Result<(), LedgerError> {
    let kind = entry.kind;
    require(kind, "date", &entry.date)?;
    if kind.is_cash_movement() {
        require(kind, "price", &entry.price)?;
    } else {
        require(kind, "pair", &entry.pair)?;
        require(kind, "price", &entry.price)?;
        require(kind, "amount", &entry.amount)?;
    }
    if kind == TxKind::Sell && entry.status == Some(TxStatus::Completed) {
        return Err(LedgerError::InvalidStatus {
            kind,
            status: TxStatus::Completed,
        });
    }
    Ok(())
}

pub fn cash_flow(kind: TxKind, total: f64, fee: f64) -> f64 {
    match kind {
        TxKind::Buy => -(total + fee),
        TxKind::Sell => total - fee,
        TxKind::Deposit => total,
        TxKind::Withdraw => -total,
    }
}

pub fn capital_flow(kind: TxKind, total: f64) -> f64 {
    match kind {
        TxKind::Deposit => total,
        TxKind::Withdraw => -total,
        TxKind::Buy | TxKind::Sell => 0.0,
    }
}

/// Realized P&L for a closed sell, matched against the most recent prior
/// buy on the same pair. The matched buy is not consumed.
pub fn realized_pnl(
    history: &[Transaction],
    kind: TxKind,
    status: TxStatus,
    pair: &str,
    total: f64,
    fee: f64,
) -> f64 {
    if kind != TxKind::Sell || status != TxStatus::Closed {
        return 0.0;
    }
    history
        .iter()
        .rev()
        .find(|t| t.kind == TxKind::Buy && t.pair == pair)
        .map(|last_buy| total - fee - last_buy.total_value - last_buy.fee)
        .unwrap_or(0.0)
}

fn resolve_status(entry: &TransactionEntry) -> TxStatus {
    match entry.kind {
        TxKind::Deposit | TxKind::Withdraw => TxStatus::Completed,
        TxKind::Buy => TxStatus::Open,
        TxKind::Sell => entry.status.unwrap_or(TxStatus::Closed),
    }
}

/// Turn a validated entry into a transaction with its flows filled in.
/// Balances and id are left for [`rebuild`].
pub fn resolve(
    history: &[Transaction],
    entry: &TransactionEntry,
) -> Result<Transaction, LedgerError> {
    validate(entry)?;

    let kind = entry.kind;
    let status = resolve_status(entry);
    let price = coerce_number(&entry.price);
    let fee = coerce_number(&entry.fee);
    let (pair, amount) = if kind.is_cash_movement() {
        ("-".to_string(), 0.0)
    } else {
        (entry.pair.trim().to_string(), coerce_number(&entry.amount))
    };
    let total_value = if kind.is_cash_movement() {
        price
    } else {
        price * amount
    };

    let pnl = realized_pnl(history, kind, status, &pair, total_value, fee);
    let profit_flow = if status == TxStatus::Closed { pnl } else { 0.0 };

    Ok(Transaction {
        id: history.len() as u64 + 1,
        date: entry.date.trim().to_string(),
        kind,
        pair,
        price,
        amount,
        total_value,
        fee,
        realized_pnl: pnl,
        status,
        note: entry.note.clone(),
        cash_flow: cash_flow(kind, total_value, fee),
        capital_flow: capital_flow(kind, total_value),
        profit_flow,
        cash_balance: 0.0,
        capital_balance: 0.0,
        profit_balance: 0.0,
        portfolio_value: 0.0,
    })
}

/// Validate and append `entry`, returning the rebuilt history.
/// On a validation error the input history is left as it was.
pub fn add_transaction(
    history: &[Transaction],
    entry: &TransactionEntry,
) -> Result<Vec<Transaction>, LedgerError> {
    let tx = resolve(history, entry)?;
    let mut next = Vec::with_capacity(history.len() + 1);
    next.extend_from_slice(history);
    next.push(tx);
    Ok(rebuild(next))
}

/// Remove the transaction whose current id is `target_id`. Unknown ids are a no-op.
pub fn delete_transaction(history: &[Transaction], target_id: u64) -> Vec<Transaction> {
    let remaining = history
        .iter()
        .filter(|t| t.id != target_id)
        .cloned()
        .collect();
    rebuild(remaining)
}

/// Renumber ids and fold the flows into running balances, front to back.
pub fn rebuild(mut history: Vec<Transaction>) -> Vec<Transaction> {
    let mut cash = 0.0;
    let mut capital = 0.0;
    let mut profit = 0.0;
    for (idx, tx) in history.iter_mut().enumerate() {
        cash += tx.cash_flow;
        capital += tx.capital_flow;
        profit += tx.profit_flow;
        tx.id = idx as u64 + 1;
        tx.cash_balance = cash;
        tx.capital_balance = capital;
        tx.profit_balance = profit;
        tx.portfolio_value = cash + capital + profit;
    }
    history
}

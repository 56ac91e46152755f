// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_history;
use crate::models::{Transaction, TxKind, TxStatus};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

const EPSILON: f64 = 1e-9;

fn differs(a: f64, b: f64) -> bool {
    (a - b).abs() > EPSILON
}

/// Every inconsistency found, as `(issue, detail)` pairs.
pub fn audit(history: &[Transaction]) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    let (mut cash, mut capital, mut profit) = (0.0, 0.0, 0.0);

    for (idx, t) in history.iter().enumerate() {
        let pos = idx as u64 + 1;
        if t.id != pos {
            rows.push(("id_not_dense".into(), format!("position {} has id {}", pos, t.id)));
        }

        cash += t.cash_flow;
        capital += t.capital_flow;
        profit += t.profit_flow;
        for (name, stored, expected) in [
            ("cash", t.cash_balance, cash),
            ("capital", t.capital_balance, capital),
            ("profit", t.profit_balance, profit),
        ] {
            if differs(stored, expected) {
                rows.push((
                    format!("{}_balance_drift", name),
                    format!("#{}: stored {} expected {}", t.id, stored, expected),
                ));
            }
        }
        let sum = t.cash_balance + t.capital_balance + t.profit_balance;
        if differs(t.portfolio_value, sum) {
            rows.push((
                "portfolio_mismatch".into(),
                format!("#{}: {} != {}", t.id, t.portfolio_value, sum),
            ));
        }

        let status_ok = match t.kind {
            TxKind::Deposit | TxKind::Withdraw => t.status == TxStatus::Completed,
            TxKind::Buy => t.status == TxStatus::Open,
            TxKind::Sell => t.status != TxStatus::Completed,
        };
        if !status_ok {
            rows.push((
                "status_kind_mismatch".into(),
                format!("#{}: {} with status {}", t.id, t.kind, t.status),
            ));
        }
    }
    rows
}

pub fn handle(conn: &Connection) -> Result<()> {
    let history = load_history(conn)?;
    let rows: Vec<Vec<String>> = audit(&history)
        .into_iter()
        .map(|(issue, detail)| vec![issue, detail])
        .collect();

    if rows.is_empty() {
        println!("✅ doctor: no issues found in {} transactions", history.len());
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

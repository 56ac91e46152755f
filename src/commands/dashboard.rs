// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_history;
use crate::models::{Transaction, TxKind, TxStatus};
use crate::utils::{
    fmt_money, fmt_signed_money, get_currency_symbol, maybe_print_json, pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

const RECENT_LIMIT: usize = 5;
const TOP_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_capital: f64,
    pub current_cash: f64,
    pub total_profit: f64,
    pub portfolio_value: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub total_fees: f64,
    pub roi: f64,
    pub open_positions: usize,
    pub closed_positions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairPerformance {
    pub pair: String,
    pub total_profit: f64,
    pub trades: usize,
}

#[derive(Serialize)]
struct DashboardView<'a> {
    summary: DashboardSummary,
    top_performers: Vec<PairPerformance>,
    recent_trades: Vec<&'a Transaction>,
}

pub fn summarize(history: &[Transaction]) -> DashboardSummary {
    let Some(last) = history.last() else {
        return DashboardSummary::default();
    };

    let winning_trades = history.iter().filter(|t| t.realized_pnl > 0.0).count();
    let losing_trades = history.iter().filter(|t| t.realized_pnl < 0.0).count();
    let decided = winning_trades + losing_trades;
    let total_capital = last.capital_balance;

    DashboardSummary {
        total_capital,
        current_cash: last.cash_balance,
        total_profit: last.profit_balance,
        portfolio_value: last.portfolio_value,
        total_trades: history.len(),
        winning_trades,
        losing_trades,
        win_rate: if decided > 0 {
            winning_trades as f64 / decided as f64 * 100.0
        } else {
            0.0
        },
        total_fees: history.iter().map(|t| t.fee).sum(),
        roi: if total_capital > 0.0 {
            last.profit_balance / total_capital * 100.0
        } else {
            0.0
        },
        open_positions: history
            .iter()
            .filter(|t| t.status == TxStatus::Open)
            .count(),
        closed_positions: history
            .iter()
            .filter(|t| t.status == TxStatus::Closed)
            .count(),
    }
}

/// Newest first.
pub fn recent_trades(history: &[Transaction]) -> Vec<&Transaction> {
    history.iter().rev().take(RECENT_LIMIT).collect()
}

/// Closed sells grouped by pair, best total profit first.
pub fn top_performers(history: &[Transaction]) -> Vec<PairPerformance> {
    let mut out: Vec<PairPerformance> = Vec::new();
    let mut index_by_pair: HashMap<&str, usize> = HashMap::new();
    for t in history
        .iter()
        .filter(|t| t.kind == TxKind::Sell && t.status == TxStatus::Closed)
    {
        let idx = *index_by_pair.entry(t.pair.as_str()).or_insert_with(|| {
            out.push(PairPerformance {
                pair: t.pair.clone(),
                total_profit: 0.0,
                trades: 0,
            });
            out.len() - 1
        });
        out[idx].total_profit += t.realized_pnl;
        out[idx].trades += 1;
    }
    out.sort_by(|a, b| b.total_profit.total_cmp(&a.total_profit));
    out.truncate(TOP_LIMIT);
    out
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let history = load_history(conn)?;
    let view = DashboardView {
        summary: summarize(&history),
        top_performers: top_performers(&history),
        recent_trades: recent_trades(&history),
    };
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &view)? {
        return Ok(());
    }
    if history.is_empty() {
        println!("No transactions yet. Start with `coinledger tx add`.");
        return Ok(());
    }

    let sym = get_currency_symbol(conn)?;
    let s = &view.summary;
    let overview = vec![
        vec!["Portfolio value".into(), fmt_money(s.portfolio_value, &sym)],
        vec!["Realized P&L".into(), fmt_signed_money(s.total_profit, &sym)],
        vec!["ROI".into(), format!("{:+.2}%", s.roi)],
        vec!["Cash".into(), fmt_money(s.current_cash, &sym)],
        vec!["Net capital".into(), fmt_money(s.total_capital, &sym)],
        vec!["Transactions".into(), s.total_trades.to_string()],
        vec![
            "Wins / losses".into(),
            format!("{} / {}", s.winning_trades, s.losing_trades),
        ],
        vec!["Win rate".into(), format!("{:.1}%", s.win_rate)],
        vec!["Total fees".into(), fmt_money(s.total_fees, &sym)],
        vec![
            "Open / closed".into(),
            format!("{} / {}", s.open_positions, s.closed_positions),
        ],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], overview));

    if !view.top_performers.is_empty() {
        let rows = view
            .top_performers
            .iter()
            .map(|p| {
                vec![
                    p.pair.clone(),
                    p.trades.to_string(),
                    fmt_signed_money(p.total_profit, &sym),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Pair", "Closed sells", "Profit"], rows));
    }

    let recent = view
        .recent_trades
        .iter()
        .map(|t| {
            let value = if t.realized_pnl != 0.0 {
                fmt_signed_money(t.realized_pnl, &sym)
            } else {
                fmt_money(t.total_value, &sym)
            };
            vec![t.date.clone(), t.kind.to_string(), t.pair.clone(), value]
        })
        .collect();
    println!("{}", pretty_table(&["Date", "Type", "Pair", "Value"], recent));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::add_transaction;
    use crate::models::TransactionEntry;

    fn entry(kind: TxKind, pair: &str, price: &str, amount: &str) -> TransactionEntry {
        let mut e = TransactionEntry::new(kind, "2025-04-10");
        e.pair = pair.into();
        e.price = price.into();
        e.amount = amount.into();
        e
    }

    fn build(entries: Vec<TransactionEntry>) -> Vec<Transaction> {
        entries
            .iter()
            .fold(Vec::new(), |h, e| add_transaction(&h, e).unwrap())
    }

    #[test]
    fn empty_history_is_all_zero() {
        assert_eq!(summarize(&[]), DashboardSummary::default());
        assert!(top_performers(&[]).is_empty());
    }

    #[test]
    fn summary_reads_last_balances_and_counts() {
        let h = build(vec![
            entry(TxKind::Deposit, "", "1000", ""),
            entry(TxKind::Buy, "BTC", "100", "1"),
            entry(TxKind::Sell, "BTC", "150", "1"),
            entry(TxKind::Buy, "ETH", "50", "1"),
            entry(TxKind::Sell, "ETH", "40", "1"),
        ]);
        let s = summarize(&h);
        assert_eq!(s.total_trades, 5);
        assert_eq!(s.winning_trades, 1);
        assert_eq!(s.losing_trades, 1);
        assert_eq!(s.win_rate, 50.0);
        assert_eq!(s.total_capital, 1000.0);
        assert_eq!(s.total_profit, 40.0);
        assert_eq!(s.roi, 4.0);
        assert_eq!(s.open_positions, 2);
        assert_eq!(s.closed_positions, 2);
        assert_eq!(s.portfolio_value, h[4].portfolio_value);
    }

    #[test]
    fn roi_is_zero_without_capital() {
        let h = build(vec![entry(TxKind::Buy, "BTC", "100", "1")]);
        assert_eq!(summarize(&h).roi, 0.0);
    }

    #[test]
    fn top_performers_sorted_by_profit() {
        let h = build(vec![
            entry(TxKind::Buy, "A", "100", "1"),
            entry(TxKind::Sell, "A", "110", "1"),
            entry(TxKind::Buy, "B", "100", "1"),
            entry(TxKind::Sell, "B", "130", "1"),
            entry(TxKind::Sell, "A", "105", "1"),
        ]);
        let top = top_performers(&h);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].pair, "B");
        assert_eq!(top[0].total_profit, 30.0);
        assert_eq!(top[1].pair, "A");
        assert_eq!(top[1].total_profit, 15.0);
        assert_eq!(top[1].trades, 2);
    }

    #[test]
    fn recent_trades_newest_first() {
        let h = build(
            (1..=7)
                .map(|i| entry(TxKind::Deposit, "", &i.to_string(), ""))
                .collect(),
        );
        let recent = recent_trades(&h);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].id, 7);
        assert_eq!(recent[4].id, 3);
    }
}

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

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairStat {
    pub pair: String,
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub total_profit: f64,
    pub open_positions: usize,
}

impl PairStat {
    pub fn win_rate(&self) -> f64 {
        let decided = self.wins + self.losses;
        if decided > 0 {
            self.wins as f64 / decided as f64 * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthStat {
    pub month: String,
    pub trades: usize,
    pub profit: f64,
    pub deposits: f64,
    pub withdraws: f64,
}

impl MonthStat {
    pub fn net_flow(&self) -> f64 {
        self.deposits - self.withdraws
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Insight {
    StrongProfitFactor(f64),
    HighWinRate(f64),
    LowWinRate(f64),
    PoorRiskReward,
    InsufficientData,
}

impl Insight {
    pub fn message(&self) -> String {
        match self {
            Insight::StrongProfitFactor(pf) => format!(
                "Profit factor is {:.2}; the strategy is paying for its losers well.",
                pf
            ),
            Insight::HighWinRate(rate) => {
                format!("Win rate is {:.1}%, above average. Keep it up.", rate)
            }
            Insight::LowWinRate(rate) => {
                format!("Win rate is {:.1}%. Review the trading strategy.", rate)
            }
            Insight::PoorRiskReward => {
                "Average loss exceeds average win. Tighten stop losses or widen take profits."
                    .to_string()
            }
            Insight::InsufficientData => {
                "Fewer than 5 closed trades. Aim for 20-30 before trusting these numbers."
                    .to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub closed_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub total_profit: f64,
    pub total_loss: f64,
    pub average_win: f64,
    pub average_loss: f64,
    pub profit_factor: f64,
    pub pair_stats: Vec<PairStat>,
    pub monthly_stats: Vec<MonthStat>,
    pub insights: Vec<Insight>,
}

fn mean(total: f64, n: usize) -> f64 {
    if n > 0 { total / n as f64 } else { 0.0 }
}

/// `None` for an empty history.
pub fn compute(history: &[Transaction]) -> Option<Statistics> {
    if history.is_empty() {
        return None;
    }

    let closed: Vec<&Transaction> = history
        .iter()
        .filter(|t| t.status == TxStatus::Closed && t.realized_pnl != 0.0)
        .collect();
    let wins: Vec<f64> = closed
        .iter()
        .map(|t| t.realized_pnl)
        .filter(|p| *p > 0.0)
        .collect();
    let losses: Vec<f64> = closed
        .iter()
        .map(|t| t.realized_pnl)
        .filter(|p| *p < 0.0)
        .collect();

    let total_profit: f64 = wins.iter().sum();
    let total_loss = losses.iter().sum::<f64>().abs();
    let average_win = mean(total_profit, wins.len());
    let average_loss = mean(total_loss, losses.len());
    let profit_factor = if total_loss > 0.0 {
        total_profit / total_loss
    } else {
        0.0
    };
    let win_rate = if closed.is_empty() {
        0.0
    } else {
        wins.len() as f64 / closed.len() as f64 * 100.0
    };

    let mut stats = Statistics {
        closed_trades: closed.len(),
        winning_trades: wins.len(),
        losing_trades: losses.len(),
        win_rate,
        total_profit,
        total_loss,
        average_win,
        average_loss,
        profit_factor,
        pair_stats: pair_stats(history),
        monthly_stats: monthly_stats(history),
        insights: Vec::new(),
    };
    stats.insights = insights(&stats);
    Some(stats)
}

pub fn pair_stats(history: &[Transaction]) -> Vec<PairStat> {
    let mut out: Vec<PairStat> = Vec::new();
    let mut index_by_pair: HashMap<&str, usize> = HashMap::new();
    for t in history.iter().filter(|t| !t.pair.is_empty() && t.pair != "-") {
        let idx = *index_by_pair.entry(t.pair.as_str()).or_insert_with(|| {
            out.push(PairStat {
                pair: t.pair.clone(),
                total_trades: 0,
                wins: 0,
                losses: 0,
                total_profit: 0.0,
                open_positions: 0,
            });
            out.len() - 1
        });
        let stat = &mut out[idx];
        stat.total_trades += 1;
        if t.realized_pnl > 0.0 {
            stat.wins += 1;
            stat.total_profit += t.realized_pnl;
        } else if t.realized_pnl < 0.0 {
            stat.losses += 1;
            stat.total_profit += t.realized_pnl;
        }
        if t.status == TxStatus::Open {
            stat.open_positions += 1;
        }
    }
    out.sort_by(|a, b| b.total_profit.total_cmp(&a.total_profit));
    out
}

fn month_of(date: &str) -> &str {
    date.char_indices()
        .nth(7)
        .map(|(i, _)| &date[..i])
        .unwrap_or(date)
}

/// Newest month first.
pub fn monthly_stats(history: &[Transaction]) -> Vec<MonthStat> {
    let mut out: Vec<MonthStat> = Vec::new();
    let mut index_by_month: HashMap<&str, usize> = HashMap::new();
    for t in history.iter().filter(|t| !t.date.is_empty()) {
        let month = month_of(&t.date);
        let idx = *index_by_month.entry(month).or_insert_with(|| {
            out.push(MonthStat {
                month: month.to_string(),
                trades: 0,
                profit: 0.0,
                deposits: 0.0,
                withdraws: 0.0,
            });
            out.len() - 1
        });
        let stat = &mut out[idx];
        stat.trades += 1;
        stat.profit += t.realized_pnl;
        match t.kind {
            TxKind::Deposit => stat.deposits += t.total_value,
            TxKind::Withdraw => stat.withdraws += t.total_value,
            TxKind::Buy | TxKind::Sell => {}
        }
    }
    out.sort_by(|a, b| b.month.cmp(&a.month));
    out
}

pub fn insights(stats: &Statistics) -> Vec<Insight> {
    let mut out = Vec::new();
    if stats.profit_factor > 2.0 {
        out.push(Insight::StrongProfitFactor(stats.profit_factor));
    }
    if stats.win_rate > 60.0 {
        out.push(Insight::HighWinRate(stats.win_rate));
    }
    if stats.win_rate < 40.0 && stats.closed_trades > 10 {
        out.push(Insight::LowWinRate(stats.win_rate));
    }
    if stats.average_loss > stats.average_win && stats.closed_trades > 5 {
        out.push(Insight::PoorRiskReward);
    }
    if stats.closed_trades < 5 {
        out.push(Insight::InsufficientData);
    }
    out
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let history = load_history(conn)?;
    let stats = compute(&history);
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &stats)? {
        return Ok(());
    }
    let Some(stats) = stats else {
        println!("No statistics yet. Record some trades first.");
        return Ok(());
    };

    let sym = get_currency_symbol(conn)?;
    let overview = vec![
        vec!["Closed trades".into(), stats.closed_trades.to_string()],
        vec![
            "Wins / losses".into(),
            format!("{} / {}", stats.winning_trades, stats.losing_trades),
        ],
        vec!["Win rate".into(), format!("{:.1}%", stats.win_rate)],
        vec!["Gross profit".into(), fmt_money(stats.total_profit, &sym)],
        vec!["Gross loss".into(), fmt_money(stats.total_loss, &sym)],
        vec!["Average win".into(), fmt_money(stats.average_win, &sym)],
        vec!["Average loss".into(), fmt_money(stats.average_loss, &sym)],
        vec!["Profit factor".into(), format!("{:.2}", stats.profit_factor)],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], overview));

    let pairs = stats
        .pair_stats
        .iter()
        .map(|p| {
            vec![
                p.pair.clone(),
                p.total_trades.to_string(),
                p.wins.to_string(),
                p.losses.to_string(),
                format!("{:.1}%", p.win_rate()),
                fmt_signed_money(p.total_profit, &sym),
                if p.open_positions > 0 {
                    p.open_positions.to_string()
                } else {
                    "-".to_string()
                },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Pair", "Trades", "Wins", "Losses", "Win rate", "Profit", "Open"],
            pairs
        )
    );

    let months = stats
        .monthly_stats
        .iter()
        .map(|m| {
            vec![
                m.month.clone(),
                m.trades.to_string(),
                fmt_signed_money(m.profit, &sym),
                fmt_money(m.deposits, &sym),
                fmt_money(m.withdraws, &sym),
                fmt_signed_money(m.net_flow(), &sym),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Month", "Trades", "Profit", "Deposits", "Withdraws", "Net flow"],
            months
        )
    );

    for insight in &stats.insights {
        println!("* {}", insight.message());
    }
    Ok(())
}

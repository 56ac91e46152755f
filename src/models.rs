// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxKind {
    Buy,
    Sell,
    Deposit,
    Withdraw,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Buy => "BUY",
            TxKind::Sell => "SELL",
            TxKind::Deposit => "DEPOSIT",
            TxKind::Withdraw => "WITHDRAW",
        }
    }

    /// Deposits and withdrawals move cash only; they carry no pair or quantity.
    pub fn is_cash_movement(&self) -> bool {
        matches!(self, TxKind::Deposit | TxKind::Withdraw)
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(TxKind::Buy),
            "SELL" => Ok(TxKind::Sell),
            "DEPOSIT" => Ok(TxKind::Deposit),
            "WITHDRAW" => Ok(TxKind::Withdraw),
            other => Err(format!(
                "Unknown transaction type '{}' (use BUY|SELL|DEPOSIT|WITHDRAW)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxStatus {
    Open,
    Closed,
    Completed,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Open => "OPEN",
            TxStatus::Closed => "CLOSED",
            TxStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OPEN" => Ok(TxStatus::Open),
            "CLOSED" => Ok(TxStatus::Closed),
            "COMPLETED" => Ok(TxStatus::Completed),
            other => Err(format!(
                "Unknown status '{}' (use OPEN|CLOSED|COMPLETED)",
                other
            )),
        }
    }
}

/// A resolved ledger row. Field order is the persisted JSON order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: u64,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub pair: String,
    pub price: f64,
    pub amount: f64,
    pub total_value: f64,
    pub fee: f64,
    #[serde(rename = "profitLoss")]
    pub realized_pnl: f64,
    pub status: TxStatus,
    #[serde(default)]
    pub note: String,
    pub cash_flow: f64,
    pub capital_flow: f64,
    pub profit_flow: f64,
    pub cash_balance: f64,
    pub capital_balance: f64,
    pub profit_balance: f64,
    pub portfolio_value: f64,
}

/// Raw form input. Numeric fields stay as typed so blank and garbage can be told apart.
#[derive(Debug, Clone)]
pub struct TransactionEntry {
    pub date: String,
    pub kind: TxKind,
    pub pair: String,
    pub price: String,
    pub amount: String,
    pub fee: String,
    pub status: Option<TxStatus>,
    pub note: String,
}

impl TransactionEntry {
    pub fn new(kind: TxKind, date: &str) -> Self {
        TransactionEntry {
            date: date.to_string(),
            kind,
            pair: String::new(),
            price: String::new(),
            amount: String::new(),
            fee: String::new(),
            status: None,
            note: String::new(),
        }
    }
}

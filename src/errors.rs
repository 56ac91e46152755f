// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{TxKind, TxStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{field} is required for {kind} transactions")]
    MissingField { kind: TxKind, field: &'static str },

    #[error("status {status} is not allowed for {kind} transactions")]
    InvalidStatus { kind: TxKind, status: TxStatus },

    #[error("stored history is not a valid transaction list: {0}")]
    PersistenceParse(#[from] serde_json::Error),

    #[error("export failed: {0}")]
    Export(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LedgerError {
    pub fn export<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        LedgerError::Export(err.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::MissingField { .. } | LedgerError::InvalidStatus { .. }
        )
    }
}

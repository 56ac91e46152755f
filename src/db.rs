// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::LedgerError;
use crate::models::Transaction;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Coinledger", "coinledger"));

/// Storage key the whole history lives under.
pub const HISTORY_KEY: &str = "cryptoTrades";

/// Overrides the platform data dir when set.
pub const HOME_ENV: &str = "COINLEDGER_HOME";

pub fn db_path() -> Result<PathBuf> {
    let data_dir = match std::env::var_os(HOME_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => ProjectDirs::from(APP.0, APP.1, APP.2)
            .context("Could not determine platform-specific data dir")?
            .data_dir()
            .to_path_buf(),
    };
    fs::create_dir_all(&data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("coinledger.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    debug!(path = %path.display(), "opened ledger store");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS storage(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}

/// Parse a stored history blob.
pub fn decode_history(raw: &str) -> std::result::Result<Vec<Transaction>, LedgerError> {
    Ok(serde_json::from_str(raw)?)
}

/// Load the persisted history. A blob that does not parse is logged and
/// treated as an empty history.
pub fn load_history(conn: &Connection) -> Result<Vec<Transaction>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM storage WHERE key=?1",
            params![HISTORY_KEY],
            |r| r.get(0),
        )
        .optional()?;
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    match decode_history(&raw) {
        Ok(history) => Ok(history),
        Err(e) => {
            warn!(error = %e, "Error loading trades; starting with an empty ledger");
            Ok(Vec::new())
        }
    }
}

pub fn save_history(conn: &Connection, history: &[Transaction]) -> Result<()> {
    let raw = serde_json::to_string(history).context("Serialize history")?;
    conn.execute(
        "INSERT INTO storage(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=datetime('now')",
        params![HISTORY_KEY, raw],
    )?;
    debug!(count = history.len(), "saved history");
    Ok(())
}

/// Drop the stored history key entirely.
pub fn clear_history(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM storage WHERE key=?1", params![HISTORY_KEY])?;
    Ok(())
}

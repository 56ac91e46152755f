// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{decode_history, load_history, save_history};
use crate::ledger::rebuild;
use crate::utils::confirm;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::io::BufRead;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let stdin = std::io::stdin();
    handle_with_input(conn, m, &mut stdin.lock())
}

pub fn handle_with_input<R: BufRead>(
    conn: &Connection,
    m: &clap::ArgMatches,
    input: &mut R,
) -> Result<()> {
    match m.subcommand() {
        Some(("history", sub)) => import_history(conn, sub, input),
        _ => Ok(()),
    }
}

fn import_history<R: BufRead>(
    conn: &Connection,
    sub: &clap::ArgMatches,
    input: &mut R,
) -> Result<()> {
    let path = sub.get_one::<String>("path").context("path missing")?.trim();
    let raw = std::fs::read_to_string(path).with_context(|| format!("Open JSON {}", path))?;
    let imported = decode_history(&raw).with_context(|| format!("Parse {}", path))?;

    let current = load_history(conn)?;
    if !current.is_empty() && !sub.get_flag("yes") {
        let prompt = format!(
            "Replace {} existing transactions with {} from {}?",
            current.len(),
            imported.len(),
            path
        );
        if !confirm(input, &prompt)? {
            println!("Cancelled");
            return Ok(());
        }
    }

    // Ids and balances are recomputed from the stored flows.
    let history = rebuild(imported);
    save_history(conn, &history)?;
    info!(count = history.len(), path, "imported history");
    println!("Imported {} transactions from {}", history.len(), path);
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{clear_history, load_history};
use crate::utils::confirm_twice;
use anyhow::Result;
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
    let count = load_history(conn)?.len();
    let first = format!(
        "⚠️ Delete ALL data? {} transactions will be removed and this cannot be undone.",
        count
    );
    let second = "🔴 Confirm again: delete everything?";
    if !confirm_twice(input, &first, second, m.get_flag("yes"))? {
        println!("Cancelled");
        return Ok(());
    }
    clear_history(conn)?;
    info!(count, "cleared history");
    println!("✅ Removed {} transactions", count);
    Ok(())
}

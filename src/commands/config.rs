// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::db_path;
use crate::utils::{
    HeaderLang, get_currency_symbol, get_header_lang, pretty_table, set_currency_symbol,
    set_header_lang,
};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => show(conn)?,
        Some(("set-lang", sub)) => {
            let raw = sub.get_one::<String>("lang").context("lang missing")?;
            let lang = HeaderLang::from_code(raw)?;
            set_header_lang(conn, lang)?;
            println!("Export header language set to {}", lang.code());
        }
        Some(("set-symbol", sub)) => {
            let symbol = sub
                .get_one::<String>("symbol")
                .map(|s| s.trim().to_string())
                .context("symbol missing")?;
            if symbol.is_empty() {
                return Err(anyhow!("Currency symbol cannot be blank"));
            }
            set_currency_symbol(conn, &symbol)?;
            println!("Currency symbol set to {}", symbol);
        }
        _ => {}
    }
    Ok(())
}

fn show(conn: &Connection) -> Result<()> {
    let rows = vec![
        vec!["database".into(), db_path()?.display().to_string()],
        vec!["header_lang".into(), get_header_lang(conn)?.code().to_string()],
        vec!["currency_symbol".into(), get_currency_symbol(conn)?],
    ];
    println!("{}", pretty_table(&["Setting", "Value"], rows));
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use std::io::{BufRead, Write};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "฿";

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Number rendering for export cells: plain decimals, switching to exponent
/// form (`1e+21`, `1.5e-7`) outside `1e-6 <= |v| < 1e21`. Never prints `-0`.
pub fn fmt_num(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let magnitude = v.abs();
    if !(1e-6..1e21).contains(&magnitude) && magnitude.is_finite() {
        let exp = format!("{:e}", v);
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exp,
        };
    }
    v.to_string()
}

pub fn fmt_money(v: f64, symbol: &str) -> String {
    if v < 0.0 {
        format!("-{}{:.2}", symbol, -v)
    } else {
        format!("{}{:.2}", symbol, v)
    }
}

/// Money with an explicit `+` for non-negative values, as used for P&L.
pub fn fmt_signed_money(v: f64, symbol: &str) -> String {
    if v >= 0.0 {
        format!("+{}", fmt_money(v, symbol))
    } else {
        fmt_money(v, symbol)
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// Language used for exported column headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLang {
    Thai,
    English,
}

impl HeaderLang {
    pub fn code(&self) -> &'static str {
        match self {
            HeaderLang::Thai => "th",
            HeaderLang::English => "en",
        }
    }

    pub fn from_code(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "th" => Ok(HeaderLang::Thai),
            "en" => Ok(HeaderLang::English),
            other => Err(anyhow!("Unknown header language '{}' (use th|en)", other)),
        }
    }
}

pub fn get_header_lang(conn: &Connection) -> Result<HeaderLang> {
    match get_setting(conn, "header_lang")? {
        Some(code) => HeaderLang::from_code(&code),
        None => Ok(HeaderLang::Thai),
    }
}

pub fn set_header_lang(conn: &Connection, lang: HeaderLang) -> Result<()> {
    set_setting(conn, "header_lang", lang.code())
}

pub fn get_currency_symbol(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "currency_symbol")?
        .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()))
}

pub fn set_currency_symbol(conn: &Connection, symbol: &str) -> Result<()> {
    set_setting(conn, "currency_symbol", symbol)
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Ask a yes/no question, reading the answer from `input`.
/// Anything but `y`/`yes` (including end of input) is a no.
pub fn confirm<R: BufRead>(input: &mut R, prompt: &str) -> Result<bool> {
    print!("{} [y/N]: ", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Two consecutive prompts, both of which must be accepted. `assume_yes` skips both.
pub fn confirm_twice<R: BufRead>(
    input: &mut R,
    first: &str,
    second: &str,
    assume_yes: bool,
) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    Ok(confirm(input, first)? && confirm(input, second)?)
}

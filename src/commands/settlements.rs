// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Marketplace settlement import. Unlike the product upsert this is a
//! destructive full refresh: every import wipes the settlements table
//! first, so two identical imports converge but manual edits between
//! imports are lost.

use crate::sheet::{self, HeaderResolution};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("import", sub)) => {
            let path = sub.get_one::<String>("path").unwrap().trim();
            let summary = import_settlements(conn, path)?;
            println!("{}", summary.render());
            Ok(())
        }
        Some(("list", sub)) => list(conn, sub),
        _ => Ok(()),
    }
}

#[derive(Debug, Default, Serialize)]
pub struct SettlementSummary {
    pub imported: usize,
    pub matched: usize,
    pub skipped: usize,
}

impl SettlementSummary {
    pub fn render(&self) -> String {
        format!(
            "Settlement import complete: {} row(s) imported, {} matched to catalog, {} skipped.",
            self.imported, self.matched, self.skipped
        )
    }
}

/// Source dates are DD/MM/YYYY; unparseable cells become NULL and the row
/// still imports.
fn parse_settlement_date(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y")
        .ok()
        .map(|d| d.to_string())
}

/// Unparseable numeric cells default to zero; thousands separators in
/// quoted cells are tolerated.
fn decimal_or_zero(raw: &str) -> Decimal {
    raw.trim().replace(',', "").parse().unwrap_or(Decimal::ZERO)
}

/// Heuristic catalog match: the first 24 characters of the settlement's
/// product description against the first 24 characters of each title,
/// case-insensitive.
fn title_prefix_match(details: &str, titles: &[String]) -> bool {
    let prefix = prefix24(details);
    if prefix.is_empty() {
        return false;
    }
    titles.iter().any(|t| prefix24(t) == prefix)
}

fn prefix24(s: &str) -> String {
    s.trim().chars().take(24).collect::<String>().to_lowercase()
}

pub fn import_settlements(conn: &mut Connection, path: &str) -> Result<SettlementSummary> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Open settlement CSV {}", path))?;

    // full refresh happens before header validation; a structurally bad
    // file still leaves the table empty
    conn.execute("DELETE FROM settlements", [])?;

    // enumerate before dropping blanks so reported line numbers match the
    // physical file
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());
    let header = lines
        .next()
        .map(|(_, l)| l)
        .ok_or_else(|| anyhow!("Settlement CSV {} has no header row", path))?;
    let headers = sheet::resolve_headers(&sheet::tokenize_line(header), sheet::SETTLEMENT_COLUMNS);
    if !headers.missing.is_empty() {
        return Err(anyhow!(
            "Missing required column(s): {}",
            headers.missing.join(", ")
        ));
    }

    let titles = product_titles(conn)?;
    let mut summary = SettlementSummary::default();
    for (idx, line) in lines {
        let line_no = idx + 1;
        let cells = sheet::tokenize_line(line);
        match insert_row(conn, &cells, &headers, &titles) {
            Ok(matched) => {
                summary.imported += 1;
                if matched {
                    summary.matched += 1;
                }
            }
            Err(e) => {
                summary.skipped += 1;
                eprintln!("settlement line {}: {:#}", line_no, e);
            }
        }
    }
    Ok(summary)
}

fn insert_row(
    conn: &Connection,
    cells: &[String],
    headers: &HeaderResolution,
    titles: &[String],
) -> Result<bool> {
    let date = parse_settlement_date(headers.field(cells, "date"));
    let details = headers.field(cells, "product_details");
    let matched = title_prefix_match(details, titles);
    // TODO: derive avg_cog from the matched product's price history; the
    // source system recorded zero here even on a match, kept until product
    // guidance says otherwise.
    let avg_cog = Decimal::ZERO;

    conn.execute(
        "INSERT INTO settlements(date, status, kind, order_ref, product_details,
                                 charges, rebates, fees, other, avg_cog, total)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
        params![
            date,
            headers.field(cells, "status"),
            headers.field(cells, "kind"),
            headers.field(cells, "order_ref"),
            details,
            decimal_or_zero(headers.field(cells, "charges")).to_string(),
            decimal_or_zero(headers.field(cells, "rebates")).to_string(),
            decimal_or_zero(headers.field(cells, "fees")).to_string(),
            decimal_or_zero(headers.field(cells, "other")).to_string(),
            avg_cog.to_string(),
            decimal_or_zero(headers.field(cells, "total")).to_string(),
        ],
    )?;
    Ok(matched)
}

fn product_titles(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT title FROM products")?;
    let mut rows = stmt.query([])?;
    let mut titles = Vec::new();
    while let Some(r) = rows.next()? {
        titles.push(r.get::<_, String>(0)?);
    }
    Ok(titles)
}

#[derive(Serialize)]
struct SettlementRow {
    date: String,
    status: String,
    kind: String,
    order_ref: String,
    product_details: String,
    total: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = sub.get_one::<String>("month");

    let mut sql = String::from(
        "SELECT date, status, kind, order_ref, product_details, total FROM settlements WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(m) = month {
        sql.push_str(" AND substr(date,1,7)=?");
        params_vec.push(m.clone());
    }
    sql.push_str(" ORDER BY date, id");

    let mut stmt = conn.prepare(&sql)?;
    let prm: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(prm))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let date: Option<String> = r.get(0)?;
        data.push(SettlementRow {
            date: date.unwrap_or_default(),
            status: r.get(1)?,
            kind: r.get(2)?,
            order_ref: r.get(3)?,
            product_details: r.get(4)?,
            total: r.get(5)?,
        });
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|s| {
                vec![
                    s.date.clone(),
                    s.status.clone(),
                    s.kind.clone(),
                    s.order_ref.clone(),
                    s.product_details.clone(),
                    s.total.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Status", "Type", "Order", "Product details", "Total"],
                rows,
            )
        );
    }
    Ok(())
}

// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Product (ASIN) CSV import: create-or-update-or-skip reconciliation by
//! natural key. Rows run strictly sequentially with no wrapping
//! transaction; reimporting from the start is the recovery path and the
//! upsert is idempotent per key.

use crate::sheet::{self, AsinRow, ImportSummary};
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("asins", sub)) => {
            let path = sub.get_one::<String>("path").unwrap().trim();
            let summary = import_asins(conn, path)?;
            println!("{}", summary.render());
            Ok(())
        }
        Some(("template", sub)) => {
            let out = sub.get_one::<String>("out").unwrap();
            write_template(out)
        }
        _ => Ok(()),
    }
}

/// Write the canonical import header row, no data rows.
pub fn write_template(out: &str) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(out).with_context(|| format!("Write template {}", out))?;
    wtr.write_record(sheet::TEMPLATE_HEADERS)?;
    wtr.flush()?;
    println!("Wrote import template to {}", out);
    Ok(())
}

enum Reconciled {
    Created,
    Updated,
}

pub fn import_asins(conn: &Connection, path: &str) -> Result<ImportSummary> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Open CSV {}", path))?;
    // enumerate before dropping blanks so reported line numbers match the
    // physical file
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());
    let header = lines
        .next()
        .map(|(_, l)| l)
        .ok_or_else(|| anyhow!("CSV {} has no header row", path))?;

    let headers = sheet::resolve_headers(&sheet::tokenize_line(header), sheet::ASIN_COLUMNS);
    if !headers.missing.is_empty() {
        // structural failure: reject before any row, reporting every gap
        return Err(anyhow!(
            "Missing required column(s): {}",
            headers.missing.join(", ")
        ));
    }

    let mut summary = ImportSummary::default();
    for (idx, line) in lines {
        let line_no = idx + 1; // 1-based physical line
        let cells = sheet::tokenize_line(line);
        let errors = sheet::check_asin_row(&cells, &headers);
        if !errors.is_empty() {
            let reasons: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            summary.skipped += 1;
            summary
                .errors
                .push(format!("line {}: {}", line_no, reasons.join("; ")));
            continue;
        }
        let row = AsinRow::from_cells(&cells, &headers);
        match reconcile(conn, &row) {
            Ok(Reconciled::Created) => {
                summary.imported += 1;
                if row.has_pricing() {
                    // best-effort: a failed history append never fails the row
                    if let Err(e) = append_price_history(conn, &row) {
                        eprintln!("price history for {}: {:#}", row.asin, e);
                    }
                }
            }
            Ok(Reconciled::Updated) => summary.updated += 1,
            Err(e) => {
                summary.skipped += 1;
                summary.errors.push(format!("{}: {:#}", row.asin, e));
            }
        }
    }
    Ok(summary)
}

/// Lookup by ASIN, then field-level overwrite on hit or insert on miss.
fn reconcile(conn: &Connection, row: &AsinRow) -> Result<Reconciled> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT asin FROM products WHERE asin=?1",
            params![row.asin],
            |r| r.get(0),
        )
        .optional()?;
    if existing.is_some() {
        conn.execute(
            "UPDATE products SET title=?1, brand=?2, image_url=?3, kind=?4, pack=?5,
                                 category=?6, weight=?7, weight_unit=?8, fnsku=?9
             WHERE asin=?10",
            params![
                row.title,
                row.brand,
                row.image_url,
                row.kind.as_str(),
                row.pack,
                row.category.as_str(),
                row.weight.map(|w| w.to_string()),
                row.weight_unit,
                row.fnsku,
                row.asin,
            ],
        )?;
        Ok(Reconciled::Updated)
    } else {
        conn.execute(
            "INSERT INTO products(asin, title, brand, image_url, kind, pack, category,
                                  weight, weight_unit, fnsku)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
            params![
                row.asin,
                row.title,
                row.brand,
                row.image_url,
                row.kind.as_str(),
                row.pack,
                row.category.as_str(),
                row.weight.map(|w| w.to_string()),
                row.weight_unit,
                row.fnsku,
            ],
        )?;
        Ok(Reconciled::Created)
    }
}

fn append_price_history(conn: &Connection, row: &AsinRow) -> Result<()> {
    conn.execute(
        "INSERT INTO price_history(asin, buy_price, sell_price, est_fee) VALUES (?1,?2,?3,?4)",
        params![
            row.asin,
            row.buy_price.to_string(),
            row.sell_price.to_string(),
            row.est_fee.to_string()
        ],
    )?;
    Ok(())
}

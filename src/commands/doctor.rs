// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::products::fetch_products;
use crate::utils::{get_placeholder, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();

    // 1) Line items pointing at a missing product
    let mut stmt = conn.prepare(
        "SELECT DISTINCT asin FROM order_items EXCEPT SELECT asin FROM products",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let asin: String = r.get(0)?;
        rows.push(vec!["item_without_product".into(), asin]);
    }

    // 2) Malformed natural keys
    let mut stmt2 = conn.prepare("SELECT asin FROM products WHERE length(asin) != 10")?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let asin: String = r.get(0)?;
        rows.push(vec!["bad_asin_length".into(), asin]);
    }

    // 3) Settlement rows whose source date never parsed
    let undated: i64 =
        conn.query_row("SELECT COUNT(*) FROM settlements WHERE date IS NULL", [], |r| {
            r.get(0)
        })?;
    if undated > 0 {
        rows.push(vec!["undated_settlements".into(), undated.to_string()]);
    }

    // 4) Incomplete catalog entries
    let placeholder = get_placeholder(conn)?;
    let incomplete = fetch_products(conn)?
        .iter()
        .filter(|p| p.is_incomplete(&placeholder))
        .count();
    if incomplete > 0 {
        rows.push(vec!["incomplete_products".into(), incomplete.to_string()]);
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

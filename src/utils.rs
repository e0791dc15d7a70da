// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::collections::HashMap;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    chrono::NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
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

pub fn id_for_supplier(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM suppliers WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Supplier '{}' not found", name))?;
    Ok(id)
}

// Placeholder sentinel for implicitly-created product stubs; a product
// field equal to this text still counts as incomplete.
pub fn get_placeholder(conn: &Connection) -> Result<String> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='placeholder_text'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.unwrap_or_else(|| "Unknown".to_string()))
}

pub fn set_placeholder(conn: &Connection, text: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('placeholder_text', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![text],
    )?;
    Ok(())
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

/// Committed spend per YYYY-MM month: item cost plus shipping for every
/// purchase order ordered in that month, regardless of status. Figures are
/// summed in Decimal from the stored text truths.
pub fn spend_by_month(conn: &Connection) -> Result<HashMap<String, Decimal>> {
    let mut map: HashMap<String, Decimal> = HashMap::new();

    let mut stmt =
        conn.prepare("SELECT substr(ordered_date,1,7), shipping_cost FROM purchase_orders")?;
    let mut rows = stmt.query([])?;
    while let Some(r) = rows.next()? {
        let month: String = r.get(0)?;
        let shipping_s: String = r.get(1)?;
        let shipping = parse_decimal(&shipping_s)
            .with_context(|| format!("Invalid shipping cost in month {}", month))?;
        *map.entry(month).or_insert(Decimal::ZERO) += shipping;
    }

    let mut stmt = conn.prepare(
        "SELECT substr(o.ordered_date,1,7), i.quantity, i.buy_price
         FROM order_items i JOIN purchase_orders o ON i.order_id=o.id",
    )?;
    let mut rows = stmt.query([])?;
    while let Some(r) = rows.next()? {
        let month: String = r.get(0)?;
        let qty: i64 = r.get(1)?;
        let buy_s: String = r.get(2)?;
        let buy = parse_decimal(&buy_s)
            .with_context(|| format!("Invalid buy price in month {}", month))?;
        *map.entry(month).or_insert(Decimal::ZERO) += buy * Decimal::from(qty);
    }

    Ok(map)
}

pub fn monthly_spend(conn: &Connection, month: &str) -> Result<Decimal> {
    Ok(spend_by_month(conn)?
        .get(month)
        .copied()
        .unwrap_or(Decimal::ZERO))
}

pub fn budgets_by_month(conn: &Connection) -> Result<HashMap<String, Decimal>> {
    let mut stmt = conn.prepare("SELECT month, amount FROM budgets")?;
    let mut rows = stmt.query([])?;
    let mut map = HashMap::new();
    while let Some(r) = rows.next()? {
        let month: String = r.get(0)?;
        let amount_s: String = r.get(1)?;
        let amount = parse_decimal(&amount_s)
            .with_context(|| format!("Invalid budget amount for {}", month))?;
        map.insert(month, amount);
    }
    Ok(map)
}

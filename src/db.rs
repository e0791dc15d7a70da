// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.restockops", "Restock", "restock"));

pub fn data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let dir = proj.data_dir().to_path_buf();
    fs::create_dir_all(&dir).context("Failed to create data dir")?;
    Ok(dir)
}

pub fn db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("restock.sqlite"))
}

/// Directory for receipt files attached to purchase orders, one
/// subdirectory per order id (`po-<id>/`).
pub fn receipts_dir() -> Result<PathBuf> {
    let dir = data_dir()?.join("receipts");
    fs::create_dir_all(&dir).context("Failed to create receipts dir")?;
    Ok(dir)
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS suppliers(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    -- Natural key is the 10-character ASIN; derived values (completeness,
    -- per-item figures) are never persisted.
    CREATE TABLE IF NOT EXISTS products(
        asin TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        brand TEXT NOT NULL,
        image_url TEXT NOT NULL,
        kind TEXT NOT NULL DEFAULT 'Single' CHECK(kind IN ('Single','Bundle')),
        pack INTEGER NOT NULL DEFAULT 1,
        category TEXT NOT NULL DEFAULT 'Stock' CHECK(category IN ('Stock','Other')),
        shipped INTEGER NOT NULL DEFAULT 0,
        stored INTEGER NOT NULL DEFAULT 0,
        weight TEXT,
        weight_unit TEXT,
        fnsku TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS purchase_orders(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ordered_date TEXT NOT NULL,
        delivery_date TEXT,
        supplier_id INTEGER NOT NULL,
        po_number TEXT NOT NULL,
        category TEXT,
        payment_method TEXT,
        status TEXT NOT NULL DEFAULT 'pending' CHECK(status IN
            ('pending','ordered','partially_delivered','fully_received','collected','complete')),
        shipping_cost TEXT NOT NULL DEFAULT '0',
        notes TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(supplier_id) REFERENCES suppliers(id)
    );
    CREATE INDEX IF NOT EXISTS idx_purchase_orders_date ON purchase_orders(ordered_date);

    CREATE TABLE IF NOT EXISTS order_items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        order_id INTEGER NOT NULL,
        asin TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        buy_price TEXT NOT NULL DEFAULT '0',
        sell_price TEXT NOT NULL DEFAULT '0',
        est_fee TEXT NOT NULL DEFAULT '0',
        FOREIGN KEY(order_id) REFERENCES purchase_orders(id) ON DELETE CASCADE,
        FOREIGN KEY(asin) REFERENCES products(asin)
    );
    CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        month TEXT NOT NULL UNIQUE, -- YYYY-MM
        amount TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS price_history(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        asin TEXT NOT NULL,
        buy_price TEXT NOT NULL DEFAULT '0',
        sell_price TEXT NOT NULL DEFAULT '0',
        est_fee TEXT NOT NULL DEFAULT '0',
        recorded_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(asin) REFERENCES products(asin) ON DELETE CASCADE
    );

    -- Marketplace settlement rows; the whole table is replaced on import.
    CREATE TABLE IF NOT EXISTS settlements(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT, -- NULL when the source cell did not parse
        status TEXT NOT NULL,
        kind TEXT NOT NULL,
        order_ref TEXT NOT NULL,
        product_details TEXT NOT NULL,
        charges TEXT NOT NULL DEFAULT '0',
        rebates TEXT NOT NULL DEFAULT '0',
        fees TEXT NOT NULL DEFAULT '0',
        other TEXT NOT NULL DEFAULT '0',
        avg_cog TEXT NOT NULL DEFAULT '0',
        total TEXT NOT NULL DEFAULT '0'
    );
    CREATE INDEX IF NOT EXISTS idx_settlements_date ON settlements(date);
    "#,
    )?;
    Ok(())
}

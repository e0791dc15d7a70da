// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use restock::{cli, commands::exporter};
use rusqlite::Connection;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE suppliers(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE);
        CREATE TABLE products(
            asin TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            brand TEXT NOT NULL,
            image_url TEXT NOT NULL,
            kind TEXT NOT NULL DEFAULT 'Single',
            pack INTEGER NOT NULL DEFAULT 1,
            category TEXT NOT NULL DEFAULT 'Stock',
            shipped INTEGER NOT NULL DEFAULT 0,
            stored INTEGER NOT NULL DEFAULT 0,
            weight TEXT,
            weight_unit TEXT,
            fnsku TEXT
        );
        CREATE TABLE purchase_orders(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ordered_date TEXT NOT NULL,
            supplier_id INTEGER NOT NULL,
            po_number TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            shipping_cost TEXT NOT NULL DEFAULT '0'
        );
        CREATE TABLE order_items(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id INTEGER NOT NULL,
            asin TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            buy_price TEXT NOT NULL DEFAULT '0',
            sell_price TEXT NOT NULL DEFAULT '0',
            est_fee TEXT NOT NULL DEFAULT '0'
        );
        "#,
    )
    .unwrap();
    conn.execute(
        "INSERT INTO products(asin, title, brand, image_url) VALUES
         ('B000123456', 'Widget, Deluxe', 'Acme', 'https://img/a.jpg')",
        [],
    )
    .unwrap();
    conn
}

fn run_export(conn: &Connection, args: &[&str]) {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(args.iter().copied());
    if let Some(("export", sub)) = matches.subcommand() {
        exporter::handle(conn, sub).unwrap();
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn products_export_csv_quotes_embedded_commas() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out = dir.path().join("products.csv");
    run_export(
        &conn,
        &["restock", "export", "products", "--format", "csv", "--out", out.to_str().unwrap()],
    );
    let text = std::fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("asin,title,brand"));
    let row = lines.next().unwrap();
    assert!(row.contains("\"Widget, Deluxe\""));
}

#[test]
fn products_export_json_is_an_array_of_objects() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out = dir.path().join("products.json");
    run_export(
        &conn,
        &["restock", "export", "products", "--format", "json", "--out", out.to_str().unwrap()],
    );
    let text = std::fs::read_to_string(&out).unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["asin"], "B000123456");
    assert_eq!(arr[0]["pack"], 1);
}

#[test]
fn orders_export_includes_orders_without_items() {
    let conn = base_conn();
    conn.execute("INSERT INTO suppliers(name) VALUES('S1')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO purchase_orders(ordered_date, supplier_id, po_number) VALUES('2025-08-05', 1, 'PO-1')",
        [],
    )
    .unwrap();
    let dir = tempdir().unwrap();
    let out = dir.path().join("orders.csv");
    run_export(
        &conn,
        &["restock", "export", "orders", "--format", "csv", "--out", out.to_str().unwrap()],
    );
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.lines().nth(1).unwrap().starts_with("1,2025-08-05,S1,PO-1,pending"));
}

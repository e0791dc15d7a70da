// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use restock::commands::settlements;
use rusqlite::Connection;
use std::io::Write;
use tempfile::NamedTempFile;

const HEADER: &str = "date/time,transaction status,transaction type,order id,product details,\
total product charges,total promotional rebates,amazon fees,other,total (GBP)";

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE products(
            asin TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            brand TEXT NOT NULL DEFAULT '',
            image_url TEXT NOT NULL DEFAULT ''
        );
        CREATE TABLE settlements(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT,
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
        "#,
    )
    .unwrap();
    conn
}

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn import_parses_dates_and_defaults_bad_numbers_to_zero() {
    let mut conn = base_conn();
    let file = csv_file(&format!(
        "{}\n\
         15/02/2025,Released,Order,111-0000001,Some Product,12.99,0,-2.50,0,10.49\n\
         not-a-date,Released,Refund,111-0000002,Other Product,abc,0,0,0,-3.00\n",
        HEADER
    ));
    let summary = settlements::import_settlements(&mut conn, file.path().to_str().unwrap()).unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.skipped, 0);

    let (date, charges): (Option<String>, String) = conn
        .query_row(
            "SELECT date, charges FROM settlements WHERE order_ref='111-0000001'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(date.unwrap(), "2025-02-15");
    assert_eq!(charges, "12.99");

    // unparseable date imports with NULL; unparseable amount becomes 0
    let (date, charges): (Option<String>, String) = conn
        .query_row(
            "SELECT date, charges FROM settlements WHERE order_ref='111-0000002'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert!(date.is_none());
    assert_eq!(charges, "0");
}

#[test]
fn reimport_fully_replaces_the_table() {
    let mut conn = base_conn();
    let first = csv_file(&format!(
        "{}\n\
         01/01/2025,Released,Order,AAA-1,First Product,1,0,0,0,1\n\
         02/01/2025,Released,Order,AAA-2,First Product,2,0,0,0,2\n",
        HEADER
    ));
    settlements::import_settlements(&mut conn, first.path().to_str().unwrap()).unwrap();

    let second = csv_file(&format!(
        "{}\n\
         03/01/2025,Released,Order,BBB-1,Second Product,3,0,0,0,3\n",
        HEADER
    ));
    settlements::import_settlements(&mut conn, second.path().to_str().unwrap()).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM settlements", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
    let old: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM settlements WHERE order_ref LIKE 'AAA-%'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(old, 0);
}

#[test]
fn structurally_bad_file_still_wipes_the_table() {
    let mut conn = base_conn();
    let good = csv_file(&format!(
        "{}\n01/01/2025,Released,Order,AAA-1,P,1,0,0,0,1\n",
        HEADER
    ));
    settlements::import_settlements(&mut conn, good.path().to_str().unwrap()).unwrap();

    let bad = csv_file("date,order id\n01/01/2025,AAA-2\n");
    let err =
        settlements::import_settlements(&mut conn, bad.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("Missing required column(s)"));

    // delete-all runs before header validation; this is the documented
    // full-refresh hazard
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM settlements", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn product_description_prefix_matches_catalog_titles() {
    let mut conn = base_conn();
    conn.execute(
        "INSERT INTO products(asin, title) VALUES ('B000123456', 'Acme Widget Deluxe Edition Pack of 12')",
        [],
    )
    .unwrap();

    // first 24 chars agree case-insensitively; the tail differs
    let file = csv_file(&format!(
        "{}\n\
         01/01/2025,Released,Order,AAA-1,ACME WIDGET DELUXE EDITion bundle,5,0,0,0,5\n\
         01/01/2025,Released,Order,AAA-2,Totally Different Thing,5,0,0,0,5\n",
        HEADER
    ));
    let summary = settlements::import_settlements(&mut conn, file.path().to_str().unwrap()).unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.matched, 1);

    // the cost-of-goods backfill is still the source's placeholder
    let cog: String = conn
        .query_row(
            "SELECT avg_cog FROM settlements WHERE order_ref='AAA-1'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(cog, "0");
}

#[test]
fn quoted_amounts_with_thousands_separators_parse() {
    let mut conn = base_conn();
    let file = csv_file(&format!(
        "{}\n01/01/2025,Released,Order,AAA-1,Big Order,\"1,234.56\",0,0,0,\"1,234.56\"\n",
        HEADER
    ));
    let summary = settlements::import_settlements(&mut conn, file.path().to_str().unwrap()).unwrap();
    assert_eq!(summary.imported, 1);
    let total: String = conn
        .query_row("SELECT total FROM settlements", [], |r| r.get(0))
        .unwrap();
    assert_eq!(total, "1234.56");
}

// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use restock::{cli, commands::budgets, metrics, utils};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE budgets(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            month TEXT NOT NULL UNIQUE,
            amount TEXT NOT NULL
        );
        CREATE TABLE suppliers(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE);
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
    conn
}

fn set_budget(conn: &Connection, month: &str, amount: &str) {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "restock", "budget", "set", "--month", month, "--amount", amount,
    ]);
    if let Some(("budget", sub)) = matches.subcommand() {
        budgets::handle(conn, sub).unwrap();
    } else {
        panic!("no budget subcommand");
    }
}

#[test]
fn budget_set_is_one_row_per_month_with_replace() {
    let conn = base_conn();
    set_budget(&conn, "2025-08", "1000");
    set_budget(&conn, "2025-08", "1500");

    let (count, amount): (i64, String) = conn
        .query_row(
            "SELECT COUNT(*), amount FROM budgets WHERE month='2025-08'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(amount, "1500");
}

#[test]
fn budget_set_rejects_malformed_month() {
    let conn = base_conn();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "restock", "budget", "set", "--month", "2025-19", "--amount", "100",
    ]);
    if let Some(("budget", sub)) = matches.subcommand() {
        let err = budgets::handle(&conn, sub).unwrap_err();
        assert!(err.to_string().contains("Invalid month '2025-19'"));
    } else {
        panic!("no budget subcommand");
    }
}

#[test]
fn monthly_spend_sums_item_cost_plus_shipping() {
    let conn = base_conn();
    conn.execute("INSERT INTO suppliers(name) VALUES('S1')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO purchase_orders(ordered_date, supplier_id, po_number, shipping_cost)
         VALUES('2025-08-05', 1, 'PO-1', '4.50')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO order_items(order_id, asin, quantity, buy_price, sell_price, est_fee)
         VALUES(1, 'B000123456', 3, '2.00', '5.00', '0.50')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO purchase_orders(ordered_date, supplier_id, po_number, shipping_cost)
         VALUES('2025-07-20', 1, 'PO-2', '0')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO order_items(order_id, asin, quantity, buy_price)
         VALUES(2, 'B000123457', 10, '1.25')",
        [],
    )
    .unwrap();

    // 3 * 2.00 + 4.50 shipping
    let aug = utils::monthly_spend(&conn, "2025-08").unwrap();
    assert_eq!(format!("{:.2}", aug), "10.50");
    let jul = utils::monthly_spend(&conn, "2025-07").unwrap();
    assert_eq!(format!("{:.2}", jul), "12.50");
    assert_eq!(utils::monthly_spend(&conn, "2025-06").unwrap(), Decimal::ZERO);
}

#[test]
fn month_history_combines_budgets_and_spend_from_the_store() {
    let conn = base_conn();
    conn.execute("INSERT INTO suppliers(name) VALUES('S1')", [])
        .unwrap();
    set_budget(&conn, "2025-07", "500");
    conn.execute(
        "INSERT INTO purchase_orders(ordered_date, supplier_id, po_number, shipping_cost)
         VALUES('2025-06-10', 1, 'PO-1', '0')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO order_items(order_id, asin, quantity, buy_price)
         VALUES(1, 'B000123456', 4, '30.00')",
        [],
    )
    .unwrap();

    let budgets_map = utils::budgets_by_month(&conn).unwrap();
    let spend_map = utils::spend_by_month(&conn).unwrap();
    let history = metrics::month_history(&budgets_map, &spend_map, "2025-08").unwrap();

    let months: Vec<&str> = history.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(months, vec!["2025-05", "2025-06", "2025-07"]);
    assert_eq!(format!("{:.2}", history[1].spend), "120.00");
    assert_eq!(history[1].budget, Decimal::ZERO);
    assert_eq!(format!("{:.2}", history[2].budget), "500.00");

    conn.execute("DELETE FROM budgets", []).unwrap();
    conn.execute("DELETE FROM purchase_orders", []).unwrap();
    conn.execute("DELETE FROM order_items", []).unwrap();

    // with no data at all, three prior months are synthesized with zeros
    let empty = metrics::month_history(
        &utils::budgets_by_month(&conn).unwrap(),
        &utils::spend_by_month(&conn).unwrap(),
        "2025-08",
    )
    .unwrap();
    assert_eq!(empty.len(), 3);
    assert!(empty.iter().all(|m| m.budget.is_zero() && m.spend.is_zero()));
}

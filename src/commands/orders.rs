// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::metrics::{self, ItemFigures};
use crate::models::{OrderItem, OrderStatus, ProductKind, PurchaseOrder};
use crate::utils::{
    get_placeholder, id_for_supplier, maybe_print_json, parse_date, parse_decimal, pretty_table,
};
use anyhow::{anyhow, Result};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("add-item", sub)) => add_item(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("set-status", sub)) => set_status(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let supplier = sub.get_one::<String>("supplier").unwrap();
    let po_number = sub.get_one::<String>("po-number").unwrap();
    let delivery = sub
        .get_one::<String>("delivery")
        .map(|s| parse_date(s))
        .transpose()?;
    let shipping = match sub.get_one::<String>("shipping") {
        Some(s) => parse_decimal(s)?,
        None => Decimal::ZERO,
    };
    let supplier_id = id_for_supplier(conn, supplier)?;
    conn.execute(
        "INSERT INTO purchase_orders(ordered_date, delivery_date, supplier_id, po_number,
                                     category, payment_method, shipping_cost, notes)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
        params![
            date.to_string(),
            delivery.map(|d| d.to_string()),
            supplier_id,
            po_number,
            sub.get_one::<String>("category"),
            sub.get_one::<String>("payment"),
            shipping.to_string(),
            sub.get_one::<String>("notes"),
        ],
    )?;
    let id = conn.last_insert_rowid();
    println!("Created purchase order #{} ({} at '{}')", id, po_number, supplier);
    Ok(())
}

/// Ensure a product row exists for `asin`, creating an incomplete stub with
/// placeholder fields when it does not. Returns true when a stub was made.
pub fn ensure_product_stub(conn: &Connection, asin: &str) -> Result<bool> {
    let known: Option<String> = conn
        .query_row(
            "SELECT asin FROM products WHERE asin=?1",
            params![asin],
            |r| r.get(0),
        )
        .optional()?;
    if known.is_some() {
        return Ok(false);
    }
    let placeholder = get_placeholder(conn)?;
    conn.execute(
        "INSERT INTO products(asin, title, brand, image_url) VALUES (?1,?2,?2,?2)",
        params![asin, placeholder],
    )?;
    Ok(true)
}

fn add_item(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let order_id = *sub.get_one::<i64>("order").unwrap();
    let asin = sub.get_one::<String>("asin").unwrap().trim();
    if asin.chars().count() != 10 {
        return Err(anyhow!("ASIN '{}' must be exactly 10 characters", asin));
    }
    let qty = *sub.get_one::<i64>("qty").unwrap();
    let dec_arg = |name: &str| -> Result<Decimal> {
        match sub.get_one::<String>(name) {
            Some(s) => parse_decimal(s),
            None => Ok(Decimal::ZERO),
        }
    };
    let buy = dec_arg("buy")?;
    let sell = dec_arg("sell")?;
    let fee = dec_arg("fee")?;

    let exists: Option<i64> = conn
        .query_row(
            "SELECT id FROM purchase_orders WHERE id=?1",
            params![order_id],
            |r| r.get(0),
        )
        .optional()?;
    if exists.is_none() {
        return Err(anyhow!("Purchase order #{} not found", order_id));
    }

    if ensure_product_stub(conn, asin)? {
        println!("Created incomplete product stub for {}", asin);
    }
    conn.execute(
        "INSERT INTO order_items(order_id, asin, quantity, buy_price, sell_price, est_fee)
         VALUES (?1,?2,?3,?4,?5,?6)",
        params![
            order_id,
            asin,
            qty,
            buy.to_string(),
            sell.to_string(),
            fee.to_string()
        ],
    )?;
    println!("Added {} x{} to order #{}", asin, qty, order_id);
    Ok(())
}

pub fn fetch_order(conn: &Connection, id: i64) -> Result<PurchaseOrder> {
    let mut stmt = conn.prepare(
        "SELECT id, ordered_date, delivery_date, supplier_id, po_number, category,
                payment_method, status, shipping_cost, notes
         FROM purchase_orders WHERE id=?1",
    )?;
    let order = stmt
        .query_row(params![id], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, Option<String>>(2)?,
                r.get::<_, i64>(3)?,
                r.get::<_, String>(4)?,
                r.get::<_, Option<String>>(5)?,
                r.get::<_, Option<String>>(6)?,
                r.get::<_, String>(7)?,
                r.get::<_, String>(8)?,
                r.get::<_, Option<String>>(9)?,
            ))
        })
        .optional()?
        .ok_or_else(|| anyhow!("Purchase order #{} not found", id))?;
    let (id, ordered, delivery, supplier_id, po_number, category, payment, status, shipping, notes) =
        order;
    Ok(PurchaseOrder {
        id,
        ordered_date: parse_date(&ordered)?,
        delivery_date: delivery.map(|d| parse_date(&d)).transpose()?,
        supplier_id,
        po_number,
        category,
        payment_method: payment,
        status: status.parse::<OrderStatus>()?,
        shipping_cost: parse_decimal(&shipping)?,
        notes,
    })
}

pub fn fetch_items(conn: &Connection, order_id: i64) -> Result<Vec<OrderItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, order_id, asin, quantity, buy_price, sell_price, est_fee
         FROM order_items WHERE order_id=?1 ORDER BY id",
    )?;
    let mut rows = stmt.query(params![order_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let buy_s: String = r.get(4)?;
        let sell_s: String = r.get(5)?;
        let fee_s: String = r.get(6)?;
        out.push(OrderItem {
            id: r.get(0)?,
            order_id: r.get(1)?,
            asin: r.get(2)?,
            quantity: r.get(3)?,
            buy_price: parse_decimal(&buy_s)?,
            sell_price: parse_decimal(&sell_s)?,
            est_fee: parse_decimal(&fee_s)?,
        });
    }
    Ok(out)
}

pub fn item_figures(item: &OrderItem) -> ItemFigures {
    metrics::item_figures(item.quantity, item.buy_price, item.sell_price, item.est_fee)
}

#[derive(Serialize)]
struct OrderListRow {
    id: i64,
    ordered: String,
    supplier: String,
    po_number: String,
    status: String,
    items: usize,
    cost: String,
    profit: String,
    roi: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = sub.get_one::<String>("month");
    let status_filter = sub
        .get_one::<String>("status")
        .map(|s| s.parse::<OrderStatus>())
        .transpose()?;

    let mut sql = String::from(
        "SELECT o.id, o.ordered_date, s.name, o.po_number, o.status, o.shipping_cost
         FROM purchase_orders o JOIN suppliers s ON o.supplier_id=s.id WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(m) = month {
        sql.push_str(" AND substr(o.ordered_date,1,7)=?");
        params_vec.push(m.clone());
    }
    if let Some(st) = status_filter {
        sql.push_str(" AND o.status=?");
        params_vec.push(st.as_str().to_string());
    }
    sql.push_str(" ORDER BY o.ordered_date DESC, o.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let prm: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(prm))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let ordered: String = r.get(1)?;
        let supplier: String = r.get(2)?;
        let po_number: String = r.get(3)?;
        let status: String = r.get(4)?;
        let shipping_s: String = r.get(5)?;

        let items = fetch_items(conn, id)?;
        let figures: Vec<ItemFigures> = items.iter().map(item_figures).collect();
        let totals = metrics::order_totals(&figures, parse_decimal(&shipping_s)?);
        data.push(OrderListRow {
            id,
            ordered,
            supplier,
            po_number,
            status,
            items: items.len(),
            cost: format!("{:.2}", totals.cost),
            profit: format!("{:.2}", totals.profit),
            roi: format!("{:.1}", totals.roi),
        });
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|o| {
                vec![
                    o.id.to_string(),
                    o.ordered.clone(),
                    o.supplier.clone(),
                    o.po_number.clone(),
                    o.status.clone(),
                    o.items.to_string(),
                    o.cost.clone(),
                    o.profit.clone(),
                    o.roi.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["#", "Ordered", "Supplier", "PO", "Status", "Items", "Cost", "Profit", "ROI %"],
                rows,
            )
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("order").unwrap();
    let order = fetch_order(conn, id)?;
    let supplier: String = conn.query_row(
        "SELECT name FROM suppliers WHERE id=?1",
        params![order.supplier_id],
        |r| r.get(0),
    )?;
    println!(
        "Order #{} {} at '{}' ({}, ordered {})",
        order.id,
        order.po_number,
        supplier,
        order.status.as_str(),
        order.ordered_date
    );
    if let Some(d) = order.delivery_date {
        println!("  delivery: {}", d);
    }
    if let Some(n) = &order.notes {
        println!("  notes: {}", n);
    }

    let items = fetch_items(conn, id)?;
    let mut figures = Vec::new();
    let mut rows = Vec::new();
    for item in &items {
        let f = item_figures(item);
        // display quantity converts ordered units into saleable packs
        let (kind_s, pack): (String, i64) = conn.query_row(
            "SELECT kind, pack FROM products WHERE asin=?1",
            params![item.asin],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        let kind = kind_s.parse::<ProductKind>()?;
        rows.push(vec![
            item.asin.clone(),
            item.quantity.to_string(),
            metrics::display_quantity(item.quantity, kind, pack).to_string(),
            format!("{:.2}", item.buy_price),
            format!("{:.2}", item.sell_price),
            format!("{:.2}", item.est_fee),
            format!("{:.2}", f.cost),
            format!("{:.2}", f.profit),
            format!("{:.1}", f.roi),
        ]);
        figures.push(f);
    }
    println!(
        "{}",
        pretty_table(
            &["ASIN", "Units", "Packs", "Buy", "Sell", "Fee", "Cost", "Profit", "ROI %"],
            rows,
        )
    );
    let totals = metrics::order_totals(&figures, order.shipping_cost);
    println!(
        "Totals: cost {:.2} (incl. {:.2} shipping), profit {:.2}, ROI {:.1}%",
        totals.cost, order.shipping_cost, totals.profit, totals.roi
    );
    Ok(())
}

fn set_status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("order").unwrap();
    let status = sub.get_one::<String>("status").unwrap().parse::<OrderStatus>()?;
    let n = conn.execute(
        "UPDATE purchase_orders SET status=?1 WHERE id=?2",
        params![status.as_str(), id],
    )?;
    if n == 0 {
        return Err(anyhow!("Purchase order #{} not found", id));
    }
    println!("Order #{} is now {}", id, status.as_str());
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("order").unwrap();
    let n = conn.execute("DELETE FROM purchase_orders WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(anyhow!("Purchase order #{} not found", id));
    }
    println!("Removed order #{} and its items", id);
    Ok(())
}

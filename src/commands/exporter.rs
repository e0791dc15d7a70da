// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("products", sub)) => export_products(conn, sub),
        Some(("orders", sub)) => export_orders(conn, sub),
        _ => Ok(()),
    }
}

fn export_products(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare(
        "SELECT asin, title, brand, image_url, kind, pack, category, shipped, stored,
                weight, weight_unit, fnsku
         FROM products ORDER BY asin",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, i64>(5)?,
            r.get::<_, String>(6)?,
            r.get::<_, i64>(7)?,
            r.get::<_, i64>(8)?,
            r.get::<_, Option<String>>(9)?,
            r.get::<_, Option<String>>(10)?,
            r.get::<_, Option<String>>(11)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "asin", "title", "brand", "image_url", "type", "pack", "category", "shipped",
                "stored", "weight", "weight_unit", "fnsku",
            ])?;
            for row in rows {
                let (asin, title, brand, image, kind, pack, cat, shipped, stored, w, wu, f) = row?;
                wtr.write_record([
                    asin,
                    title,
                    brand,
                    image,
                    kind,
                    pack.to_string(),
                    cat,
                    shipped.to_string(),
                    stored.to_string(),
                    w.unwrap_or_default(),
                    wu.unwrap_or_default(),
                    f.unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (asin, title, brand, image, kind, pack, cat, shipped, stored, w, wu, f) = row?;
                items.push(json!({
                    "asin": asin, "title": title, "brand": brand, "image_url": image,
                    "type": kind, "pack": pack, "category": cat,
                    "shipped": shipped, "stored": stored,
                    "weight": w, "weight_unit": wu, "fnsku": f
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported products to {}", out);
    Ok(())
}

fn export_orders(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare(
        "SELECT o.id, o.ordered_date, s.name, o.po_number, o.status, o.shipping_cost,
                i.asin, i.quantity, i.buy_price, i.sell_price, i.est_fee
         FROM purchase_orders o
         JOIN suppliers s ON o.supplier_id=s.id
         LEFT JOIN order_items i ON i.order_id=o.id
         ORDER BY o.ordered_date, o.id, i.id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, Option<String>>(6)?,
            r.get::<_, Option<i64>>(7)?,
            r.get::<_, Option<String>>(8)?,
            r.get::<_, Option<String>>(9)?,
            r.get::<_, Option<String>>(10)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "order", "ordered", "supplier", "po_number", "status", "shipping", "asin",
                "quantity", "buy_price", "sell_price", "est_fee",
            ])?;
            for row in rows {
                let (id, d, sup, po, st, ship, asin, qty, buy, sell, fee) = row?;
                wtr.write_record([
                    id.to_string(),
                    d,
                    sup,
                    po,
                    st,
                    ship,
                    asin.unwrap_or_default(),
                    qty.map(|q| q.to_string()).unwrap_or_default(),
                    buy.unwrap_or_default(),
                    sell.unwrap_or_default(),
                    fee.unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (id, d, sup, po, st, ship, asin, qty, buy, sell, fee) = row?;
                items.push(json!({
                    "order": id, "ordered": d, "supplier": sup, "po_number": po,
                    "status": st, "shipping": ship, "asin": asin, "quantity": qty,
                    "buy_price": buy, "sell_price": sell, "est_fee": fee
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported orders to {}", out);
    Ok(())
}

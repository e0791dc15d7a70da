// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Product, ProductCategory, ProductKind};
use crate::utils::{get_placeholder, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("stock", sub)) => stock(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let asin = sub.get_one::<String>("asin").unwrap().trim();
    if asin.chars().count() != 10 {
        return Err(anyhow!("ASIN '{}' must be exactly 10 characters", asin));
    }
    let title = sub.get_one::<String>("title").unwrap();
    let brand = sub.get_one::<String>("brand").unwrap();
    let image = sub.get_one::<String>("image").unwrap();
    let kind = match sub.get_one::<String>("type") {
        Some(s) => s.parse::<ProductKind>()?,
        None => ProductKind::Single,
    };
    let pack = *sub.get_one::<i64>("pack").unwrap_or(&1);
    let category = match sub.get_one::<String>("category") {
        Some(s) => s.parse::<ProductCategory>()?,
        None => ProductCategory::Stock,
    };
    let weight = sub
        .get_one::<String>("weight")
        .map(|s| parse_decimal(s))
        .transpose()?;
    conn.execute(
        "INSERT INTO products(asin, title, brand, image_url, kind, pack, category, weight, weight_unit, fnsku)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
        params![
            asin,
            title,
            brand,
            image,
            kind.as_str(),
            pack.max(1),
            category.as_str(),
            weight.map(|w| w.to_string()),
            sub.get_one::<String>("weight-unit"),
            sub.get_one::<String>("fnsku"),
        ],
    )?;
    println!("Added product {} '{}'", asin, title);
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let asin = sub.get_one::<String>("asin").unwrap().trim();
    let mut sets: Vec<String> = Vec::new();
    let mut vals: Vec<String> = Vec::new();

    let mut push = |col: &str, val: String| {
        sets.push(format!("{}=?{}", col, vals.len() + 1));
        vals.push(val);
    };
    if let Some(v) = sub.get_one::<String>("title") {
        push("title", v.clone());
    }
    if let Some(v) = sub.get_one::<String>("brand") {
        push("brand", v.clone());
    }
    if let Some(v) = sub.get_one::<String>("image") {
        push("image_url", v.clone());
    }
    if let Some(v) = sub.get_one::<String>("type") {
        push("kind", v.parse::<ProductKind>()?.as_str().to_string());
    }
    if let Some(v) = sub.get_one::<i64>("pack") {
        push("pack", v.max(&1).to_string());
    }
    if let Some(v) = sub.get_one::<String>("category") {
        push("category", v.parse::<ProductCategory>()?.as_str().to_string());
    }
    if let Some(v) = sub.get_one::<String>("weight") {
        push("weight", parse_decimal(v)?.to_string());
    }
    if let Some(v) = sub.get_one::<String>("weight-unit") {
        push("weight_unit", v.clone());
    }
    if let Some(v) = sub.get_one::<String>("fnsku") {
        push("fnsku", v.clone());
    }
    if sets.is_empty() {
        return Err(anyhow!("Nothing to update for {}", asin));
    }
    let sql = format!(
        "UPDATE products SET {} WHERE asin=?{}",
        sets.join(", "),
        vals.len() + 1
    );
    vals.push(asin.to_string());
    let n = conn.execute(
        &sql,
        rusqlite::params_from_iter(vals.iter().map(|s| s as &dyn rusqlite::ToSql)),
    )?;
    if n == 0 {
        return Err(anyhow!("Product '{}' not found", asin));
    }
    println!("Updated product {}", asin);
    Ok(())
}

#[derive(Serialize)]
struct ProductRow {
    asin: String,
    title: String,
    brand: String,
    kind: String,
    pack: i64,
    category: String,
    shipped: i64,
    stored: i64,
    incomplete: bool,
}

pub fn fetch_products(conn: &Connection) -> Result<Vec<Product>> {
    let mut stmt = conn.prepare(
        "SELECT asin, title, brand, image_url, kind, pack, category, shipped, stored,
                weight, weight_unit, fnsku
         FROM products ORDER BY asin",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let kind_s: String = r.get(4)?;
        let cat_s: String = r.get(6)?;
        let weight_s: Option<String> = r.get(9)?;
        out.push(Product {
            asin: r.get(0)?,
            title: r.get(1)?,
            brand: r.get(2)?,
            image_url: r.get(3)?,
            kind: kind_s.parse()?,
            pack: r.get(5)?,
            category: cat_s.parse()?,
            shipped: r.get(7)?,
            stored: r.get(8)?,
            weight: weight_s.map(|s| parse_decimal(&s)).transpose()?,
            weight_unit: r.get(10)?,
            fnsku: r.get(11)?,
        });
    }
    Ok(out)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let only_incomplete = sub.get_flag("incomplete");
    let pattern = sub
        .get_one::<String>("match")
        .map(|p| Regex::new(p).with_context(|| format!("Invalid regex pattern '{}'", p)))
        .transpose()?;

    let placeholder = get_placeholder(conn)?;
    let mut data = Vec::new();
    for p in fetch_products(conn)? {
        let incomplete = p.is_incomplete(&placeholder);
        if only_incomplete && !incomplete {
            continue;
        }
        if let Some(ref re) = pattern {
            if !re.is_match(&p.title) {
                continue;
            }
        }
        data.push(ProductRow {
            asin: p.asin,
            title: p.title,
            brand: p.brand,
            kind: p.kind.as_str().to_string(),
            pack: p.pack,
            category: p.category.as_str().to_string(),
            shipped: p.shipped,
            stored: p.stored,
            incomplete,
        });
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|p| {
                vec![
                    p.asin.clone(),
                    p.title.clone(),
                    p.brand.clone(),
                    p.kind.clone(),
                    p.pack.to_string(),
                    p.category.clone(),
                    p.shipped.to_string(),
                    p.stored.to_string(),
                    (if p.incomplete { "yes" } else { "" }).to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ASIN", "Title", "Brand", "Type", "Pack", "Category", "Shipped", "Stored", "Incomplete"],
                rows,
            )
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let asin = sub.get_one::<String>("asin").unwrap().trim();
    let p = fetch_products(conn)?
        .into_iter()
        .find(|p| p.asin == asin)
        .ok_or_else(|| anyhow!("Product '{}' not found", asin))?;
    let placeholder = get_placeholder(conn)?;
    println!("{} '{}' by {}", p.asin, p.title, p.brand);
    println!("  image: {}", p.image_url);
    println!("  type: {} (pack {})", p.kind.as_str(), p.pack);
    println!("  category: {}", p.category.as_str());
    println!("  shipped: {}  stored: {}", p.shipped, p.stored);
    if let Some(w) = p.weight {
        println!("  weight: {} {}", w, p.weight_unit.as_deref().unwrap_or(""));
    }
    if let Some(f) = &p.fnsku {
        println!("  fnsku: {}", f);
    }
    if p.is_incomplete(&placeholder) {
        println!("  ** incomplete: fill in title, brand, and image **");
    }

    let mut stmt = conn.prepare(
        "SELECT recorded_at, buy_price, sell_price, est_fee FROM price_history
         WHERE asin=?1 ORDER BY recorded_at DESC",
    )?;
    let rows = stmt.query_map(params![asin], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (at, buy, sell, fee) = row?;
        data.push(vec![at, buy, sell, fee]);
    }
    if !data.is_empty() {
        println!(
            "{}",
            pretty_table(&["Recorded", "Buy", "Sell", "Est Fee"], data)
        );
    }
    Ok(())
}

fn stock(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let asin = sub.get_one::<String>("asin").unwrap().trim();
    let shipped = sub.get_one::<i64>("shipped");
    let stored = sub.get_one::<i64>("stored");
    if shipped.is_none() && stored.is_none() {
        return Err(anyhow!("Provide --shipped and/or --stored"));
    }
    let mut touched = 0;
    if let Some(s) = shipped {
        touched = conn.execute(
            "UPDATE products SET shipped=?1 WHERE asin=?2",
            params![s, asin],
        )?;
    }
    if let Some(s) = stored {
        touched = conn.execute(
            "UPDATE products SET stored=?1 WHERE asin=?2",
            params![s, asin],
        )?;
    }
    if touched == 0 {
        return Err(anyhow!("Product '{}' not found", asin));
    }
    println!("Updated stock counts for {}", asin);
    Ok(())
}

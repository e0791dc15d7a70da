// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::orders::{fetch_items, item_figures};
use crate::metrics::{self, ItemFigures};
use crate::models::OrderStatus;
use crate::utils::{
    budgets_by_month, maybe_print_json, parse_date, parse_decimal, pretty_table, spend_by_month,
};
use anyhow::Result;
use chrono::Datelike;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("totals", sub)) => totals(conn, sub)?,
        Some(("months", sub)) => months(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct TotalsRow {
    id: i64,
    ordered: String,
    po_number: String,
    status: String,
    cost: String,
    profit: String,
    roi: String,
}

fn totals(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = sub.get_one::<String>("month");
    let finalized_only = sub.get_flag("finalized");

    let mut stmt = conn.prepare(
        "SELECT id, ordered_date, po_number, status, shipping_cost
         FROM purchase_orders ORDER BY ordered_date, id",
    )?;
    let mut rows = stmt.query([])?;

    let mut data = Vec::new();
    let mut grand = Vec::new();
    let mut grand_shipping = rust_decimal::Decimal::ZERO;
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let ordered: String = r.get(1)?;
        let po_number: String = r.get(2)?;
        let status_s: String = r.get(3)?;
        let shipping_s: String = r.get(4)?;

        if let Some(m) = month {
            if !ordered.starts_with(m.as_str()) {
                continue;
            }
        }
        let status = status_s.parse::<OrderStatus>()?;
        if finalized_only && !status.is_finalized() {
            continue;
        }
        let shipping = parse_decimal(&shipping_s)?;
        let figures: Vec<ItemFigures> =
            fetch_items(conn, id)?.iter().map(item_figures).collect();
        let t = metrics::order_totals(&figures, shipping);
        data.push(TotalsRow {
            id,
            ordered,
            po_number,
            status: status_s,
            cost: format!("{:.2}", t.cost),
            profit: format!("{:.2}", t.profit),
            roi: format!("{:.1}", t.roi),
        });
        grand.extend(figures);
        grand_shipping += shipping;
    }
    let grand_totals = metrics::order_totals(&grand, grand_shipping);

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.ordered.clone(),
                    t.po_number.clone(),
                    t.status.clone(),
                    t.cost.clone(),
                    t.profit.clone(),
                    t.roi.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["#", "Ordered", "PO", "Status", "Cost", "Profit", "ROI %"], rows)
        );
        println!(
            "Overall: cost {:.2}, profit {:.2}, ROI {:.1}%",
            grand_totals.cost, grand_totals.profit, grand_totals.roi
        );
    }
    Ok(())
}

fn months(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let today = match sub.get_one::<String>("as-of") {
        Some(s) => parse_date(s)?,
        None => chrono::Utc::now().date_naive(),
    };
    let current = format!("{:04}-{:02}", today.year(), today.month());

    let budgets = budgets_by_month(conn)?;
    let spend = spend_by_month(conn)?;
    let history = metrics::month_history(&budgets, &spend, &current)?;

    if !maybe_print_json(json_flag, jsonl_flag, &history)? {
        let rows: Vec<Vec<String>> = history
            .iter()
            .map(|m| {
                vec![
                    m.month.clone(),
                    format!("{:.2}", m.budget),
                    format!("{:.2}", m.spend),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Month", "Budget", "Spend"], rows));
    }
    Ok(())
}

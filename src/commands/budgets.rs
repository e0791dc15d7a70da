// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::metrics;
use crate::utils::{
    maybe_print_json, monthly_spend, parse_date, parse_decimal, parse_month, pretty_table,
};
use anyhow::Result;
use chrono::Datelike;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", _)) => list(conn)?,
        Some(("report", sub)) => report(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    // one budget per month, replace on conflict
    conn.execute(
        "INSERT INTO budgets(month, amount) VALUES (?1,?2)
         ON CONFLICT(month) DO UPDATE SET amount=excluded.amount",
        params![month, amount.to_string()],
    )?;
    println!("Budget set for {} = {}", month, amount);
    Ok(())
}

fn list(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("SELECT month, amount FROM budgets ORDER BY month DESC")?;
    let rows = stmt.query_map([], |r| {
        Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (m, a) = row?;
        data.push(vec![m, a]);
    }
    println!("{}", pretty_table(&["Month", "Budget"], data));
    Ok(())
}

#[derive(Serialize)]
struct PacingReport {
    month: String,
    budget: String,
    spend: String,
    remaining: String,
    percentage: String,
    days_left: i64,
    daily_target: String,
}

fn report(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let today = match sub.get_one::<String>("as-of") {
        Some(s) => parse_date(s)?,
        None => chrono::Utc::now().date_naive(),
    };
    let month = format!("{:04}-{:02}", today.year(), today.month());

    let budget_s: Option<String> = conn
        .query_row(
            "SELECT amount FROM budgets WHERE month=?1",
            params![month],
            |r| r.get(0),
        )
        .optional()?;
    let budget = match budget_s {
        Some(s) => parse_decimal(&s)?,
        None => Decimal::ZERO,
    };
    let spend = monthly_spend(conn, &month)?;
    let pacing = metrics::budget_pacing(budget, spend, today);
    // negative remainders clamp at display time only
    let remaining_disp = pacing.remaining.max(Decimal::ZERO);

    let out = PacingReport {
        month: month.clone(),
        budget: format!("{:.2}", budget),
        spend: format!("{:.2}", spend),
        remaining: format!("{:.2}", remaining_disp),
        percentage: format!("{:.1}", pacing.percentage),
        days_left: pacing.days_left,
        daily_target: format!("{:.2}", pacing.daily_target),
    };
    if !maybe_print_json(json_flag, jsonl_flag, &out)? {
        println!(
            "{}",
            pretty_table(
                &["Month", "Budget", "Spend", "Remaining", "Used %", "Days left", "Daily target"],
                vec![vec![
                    out.month,
                    out.budget,
                    out.spend,
                    out.remaining,
                    out.percentage,
                    out.days_left.to_string(),
                    out.daily_target,
                ]],
            )
        );
    }
    Ok(())
}

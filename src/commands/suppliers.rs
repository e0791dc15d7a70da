// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::{anyhow, Result};
use rusqlite::{params, Connection};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            conn.execute("INSERT INTO suppliers(name) VALUES (?1)", params![name])?;
            println!("Added supplier '{}'", name);
        }
        Some(("list", _)) => {
            let mut stmt =
                conn.prepare("SELECT name, created_at FROM suppliers ORDER BY name")?;
            let rows = stmt.query_map([], |r| {
                Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (n, c) = row?;
                data.push(vec![n, c]);
            }
            println!("{}", pretty_table(&["Name", "Created"], data));
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let referenced: i64 = conn.query_row(
                "SELECT COUNT(*) FROM purchase_orders o JOIN suppliers s ON o.supplier_id=s.id WHERE s.name=?1",
                params![name],
                |r| r.get(0),
            )?;
            if referenced > 0 {
                return Err(anyhow!(
                    "Supplier '{}' is referenced by {} purchase order(s)",
                    name,
                    referenced
                ));
            }
            conn.execute("DELETE FROM suppliers WHERE name=?1", params![name])?;
            println!("Removed supplier '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::utils::pretty_table;
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("attach", sub)) => attach(conn, sub)?,
        Some(("list", sub)) => list(sub)?,
        Some(("rm", sub)) => rm(sub)?,
        _ => {}
    }
    Ok(())
}

// Receipts live on disk only; the association is the `po-<id>` directory
// naming convention, not a table.
fn order_dir(order_id: i64) -> Result<PathBuf> {
    Ok(db::receipts_dir()?.join(format!("po-{}", order_id)))
}

fn attach(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let order_id = *sub.get_one::<i64>("order").unwrap();
    let file = sub.get_one::<String>("file").unwrap();
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
    let src = Path::new(file);
    let name = src
        .file_name()
        .ok_or_else(|| anyhow!("'{}' has no file name", file))?;
    let dir = order_dir(order_id)?;
    fs::create_dir_all(&dir).with_context(|| format!("Create {}", dir.display()))?;
    let dest = dir.join(name);
    fs::copy(src, &dest).with_context(|| format!("Copy {} -> {}", file, dest.display()))?;
    println!("Attached {} to order #{}", dest.display(), order_id);
    Ok(())
}

fn list(sub: &clap::ArgMatches) -> Result<()> {
    let order_id = sub.get_one::<i64>("order");
    let root = db::receipts_dir()?;
    let mut data = Vec::new();
    let dirs: Vec<PathBuf> = match order_id {
        Some(id) => vec![order_dir(*id)?],
        None => {
            let mut v = Vec::new();
            if root.is_dir() {
                for entry in fs::read_dir(&root)? {
                    let p = entry?.path();
                    if p.is_dir() {
                        v.push(p);
                    }
                }
                v.sort();
            }
            v
        }
    };
    for dir in dirs {
        if !dir.is_dir() {
            continue;
        }
        let scope = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        for entry in fs::read_dir(&dir)? {
            let p = entry?.path();
            if p.is_file() {
                data.push(vec![
                    scope.clone(),
                    p.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    p.display().to_string(),
                ]);
            }
        }
    }
    println!("{}", pretty_table(&["Order", "File", "Path"], data));
    Ok(())
}

fn rm(sub: &clap::ArgMatches) -> Result<()> {
    let order_id = *sub.get_one::<i64>("order").unwrap();
    let file = sub.get_one::<String>("file").unwrap();
    let path = order_dir(order_id)?.join(file);
    if !path.is_file() {
        return Err(anyhow!("No receipt '{}' for order #{}", file, order_id));
    }
    fs::remove_file(&path).with_context(|| format!("Remove {}", path.display()))?;
    println!("Removed receipt '{}' from order #{}", file, order_id);
    Ok(())
}

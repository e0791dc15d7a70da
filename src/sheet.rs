// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Loose-spreadsheet layer: line tokenizer, header reconciliation against a
//! canonical column table, and per-row validation. Everything here is pure;
//! callers own file I/O and the record store.

use crate::models::{ProductCategory, ProductKind};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Split one CSV line into fields. A `"` toggles quote state and is never
/// emitted; `,` outside quotes ends the field. Embedded-quote escaping is
/// not supported (known limitation of the source format). An unterminated
/// quote simply ends the field at end of line. Callers trim fields and
/// filter blank lines before whole-file parsing.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut cur)),
            _ => cur.push(ch),
        }
    }
    fields.push(cur);
    fields
}

/// One canonical column and the human-authored header variations that map
/// to it. Matching is first-variation, first-header wins, so order the
/// variations from most to least specific.
pub struct Column {
    pub canonical: &'static str,
    pub variations: &'static [&'static str],
    pub required: bool,
}

/// Product (ASIN) import columns. `Size` is the pack count of a bundle.
pub const ASIN_COLUMNS: &[Column] = &[
    Column { canonical: "asin", variations: &["asin"], required: true },
    Column { canonical: "image_url", variations: &["imageurl", "image"], required: true },
    Column { canonical: "title", variations: &["title", "productname"], required: true },
    Column { canonical: "type", variations: &["type"], required: true },
    Column { canonical: "pack", variations: &["size", "pack"], required: true },
    Column { canonical: "brand", variations: &["brand"], required: true },
    Column { canonical: "category", variations: &["category"], required: false },
    Column { canonical: "buy_price", variations: &["buyprice", "buy"], required: false },
    Column { canonical: "sell_price", variations: &["sellprice", "sell"], required: false },
    Column { canonical: "est_fee", variations: &["estfee", "fee"], required: false },
    Column { canonical: "weight_unit", variations: &["weightunit", "unit"], required: false },
    Column { canonical: "weight", variations: &["weight"], required: false },
    Column { canonical: "fnsku", variations: &["fnsku"], required: false },
];

/// Fixed marketplace settlement schema; every column is required. The
/// total column is the one whose header carries the currency tag.
pub const SETTLEMENT_COLUMNS: &[Column] = &[
    Column { canonical: "date", variations: &["date"], required: true },
    Column { canonical: "status", variations: &["transactionstatus"], required: true },
    Column { canonical: "kind", variations: &["transactiontype"], required: true },
    Column { canonical: "order_ref", variations: &["orderid"], required: true },
    Column { canonical: "product_details", variations: &["productdetails"], required: true },
    Column { canonical: "charges", variations: &["totalproductcharges"], required: true },
    Column { canonical: "rebates", variations: &["totalpromotionalrebates"], required: true },
    Column { canonical: "fees", variations: &["amazonfees"], required: true },
    Column { canonical: "other", variations: &["other"], required: true },
    Column { canonical: "total", variations: &["total(gbp)", "totalgbp", "gbp"], required: true },
];

/// Canonical header row written by the template export; these are the
/// spellings the reconciler maps straight back onto `ASIN_COLUMNS`.
pub const TEMPLATE_HEADERS: &[&str] = &[
    "ASIN", "Image URL", "Title", "Type", "Size", "Brand", "Category", "Buy Price", "Sell Price",
    "Est Fee", "Weight", "Weight Unit", "FNSKU",
];

fn normalize(s: &str) -> String {
    s.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect()
}

#[derive(Debug)]
pub struct HeaderResolution {
    index_of: HashMap<&'static str, usize>,
    pub missing: Vec<&'static str>,
}

impl HeaderResolution {
    pub fn index(&self, canonical: &str) -> Option<usize> {
        self.index_of.get(canonical).copied()
    }

    /// Trimmed cell for a canonical column, or "" when the column is
    /// unmapped or the row is short.
    pub fn field<'a>(&self, cells: &'a [String], canonical: &str) -> &'a str {
        self.index(canonical)
            .and_then(|i| cells.get(i))
            .map(|s| s.trim())
            .unwrap_or("")
    }
}

/// Map tokenized header cells onto a canonical column table. A header cell
/// matches when its normalized form equals or contains a normalized
/// variation; the leftmost matching cell wins per canonical column. All
/// missing required names are reported together so a structural failure
/// surfaces in one message.
pub fn resolve_headers(cells: &[String], table: &[Column]) -> HeaderResolution {
    let normalized: Vec<String> = cells.iter().map(|c| normalize(c)).collect();
    let mut index_of = HashMap::new();
    let mut missing = Vec::new();
    for col in table {
        let hit = normalized.iter().position(|h| {
            col.variations.iter().any(|v| h.contains(&normalize(v)))
        });
        match hit {
            Some(i) => {
                index_of.insert(col.canonical, i);
            }
            None if col.required => missing.push(col.canonical),
            None => {}
        }
    }
    HeaderResolution { index_of, missing }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("missing ASIN")]
    MissingKey,
    #[error("ASIN '{0}' must be exactly 10 characters")]
    BadKeyLength(String),
    #[error("invalid {field} '{value}'")]
    BadEnum { field: &'static str, value: String },
    #[error("{field} '{value}' is not a number")]
    BadNumber { field: &'static str, value: String },
    #[error("{field} '{value}' is not a whole number")]
    BadInteger { field: &'static str, value: String },
}

/// Check one extracted product row. All violations are collected; nothing
/// short-circuits, so a row breaking two rules reports both.
pub fn check_asin_row(cells: &[String], headers: &HeaderResolution) -> Vec<RowError> {
    let mut errors = Vec::new();

    let asin = headers.field(cells, "asin");
    if asin.is_empty() {
        errors.push(RowError::MissingKey);
    } else if asin.chars().count() != 10 {
        errors.push(RowError::BadKeyLength(asin.to_string()));
    }

    let kind = headers.field(cells, "type");
    if !kind.is_empty() && kind.parse::<ProductKind>().is_err() {
        errors.push(RowError::BadEnum { field: "type", value: kind.to_string() });
    }
    let category = headers.field(cells, "category");
    if !category.is_empty() && category.parse::<ProductCategory>().is_err() {
        errors.push(RowError::BadEnum { field: "category", value: category.to_string() });
    }

    // pack is a unit count; a fractional size must fail here rather than
    // collapse to the default in `from_cells`
    let pack = headers.field(cells, "pack");
    if !pack.is_empty() && pack.parse::<i64>().is_err() {
        errors.push(RowError::BadInteger { field: "pack", value: pack.to_string() });
    }

    for field in ["weight", "buy_price", "sell_price", "est_fee"] {
        let raw = headers.field(cells, field);
        if !raw.is_empty() && raw.parse::<Decimal>().is_err() {
            errors.push(RowError::BadNumber { field, value: raw.to_string() });
        }
    }

    errors
}

/// A product row that passed validation. Stringly-typed cell maps never
/// cross this boundary; defaults are applied here.
#[derive(Debug, Clone)]
pub struct AsinRow {
    pub asin: String,
    pub title: String,
    pub brand: String,
    pub image_url: String,
    pub kind: ProductKind,
    pub pack: i64,
    pub category: ProductCategory,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub est_fee: Decimal,
    pub weight: Option<Decimal>,
    pub weight_unit: Option<String>,
    pub fnsku: Option<String>,
}

impl AsinRow {
    /// Build the typed row from validated cells. Caller must have run
    /// `check_asin_row` first; fields that failed to parse here would have
    /// been rejected there, so parse failures fall back to defaults.
    pub fn from_cells(cells: &[String], headers: &HeaderResolution) -> AsinRow {
        let dec = |name: &str| {
            headers
                .field(cells, name)
                .parse::<Decimal>()
                .unwrap_or(Decimal::ZERO)
        };
        let opt = |name: &str| {
            let v = headers.field(cells, name);
            if v.is_empty() { None } else { Some(v.to_string()) }
        };
        AsinRow {
            asin: headers.field(cells, "asin").to_string(),
            title: headers.field(cells, "title").to_string(),
            brand: headers.field(cells, "brand").to_string(),
            image_url: headers.field(cells, "image_url").to_string(),
            kind: headers
                .field(cells, "type")
                .parse()
                .unwrap_or(ProductKind::Single),
            pack: headers.field(cells, "pack").parse().unwrap_or(1).max(1),
            category: headers
                .field(cells, "category")
                .parse()
                .unwrap_or(ProductCategory::Stock),
            buy_price: dec("buy_price"),
            sell_price: dec("sell_price"),
            est_fee: dec("est_fee"),
            weight: headers.field(cells, "weight").parse::<Decimal>().ok(),
            weight_unit: opt("weight_unit"),
            fnsku: opt("fnsku"),
        }
    }

    pub fn has_pricing(&self) -> bool {
        !self.buy_price.is_zero() || !self.sell_price.is_zero() || !self.est_fee.is_zero()
    }
}

/// Outcome tally of one import attempt, rendered as a single summary.
#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl ImportSummary {
    pub fn render(&self) -> String {
        let mut out = format!(
            "Imported {}, updated {}, skipped {}.",
            self.imported, self.updated, self.skipped
        );
        if !self.errors.is_empty() {
            out.push_str(&format!("\n{} row(s) had problems:", self.errors.len()));
            for e in &self.errors {
                out.push_str(&format!("\n  - {}", e));
            }
        }
        out
    }
}

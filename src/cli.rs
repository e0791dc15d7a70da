// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("restock")
        .about("Reselling operations: product catalog, purchase orders, budgets, settlement imports")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Initialize the database and print its path"))
        .subcommand(
            Command::new("supplier")
                .about("Manage suppliers")
                .subcommand(
                    Command::new("add")
                        .about("Add a supplier")
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(Command::new("list").about("List suppliers"))
                .subcommand(
                    Command::new("rm")
                        .about("Remove a supplier")
                        .arg(Arg::new("name").long("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("product")
                .about("Manage the ASIN catalog")
                .subcommand(
                    Command::new("add")
                        .about("Add a product")
                        .arg(Arg::new("asin").long("asin").required(true))
                        .arg(Arg::new("title").long("title").required(true))
                        .arg(Arg::new("brand").long("brand").required(true))
                        .arg(Arg::new("image").long("image").required(true))
                        .arg(Arg::new("type").long("type").help("Single|Bundle"))
                        .arg(
                            Arg::new("pack")
                                .long("pack")
                                .value_parser(value_parser!(i64))
                                .help("Units per bundle"),
                        )
                        .arg(Arg::new("category").long("category").help("Stock|Other"))
                        .arg(Arg::new("weight").long("weight"))
                        .arg(Arg::new("weight-unit").long("weight-unit"))
                        .arg(Arg::new("fnsku").long("fnsku")),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Update product fields")
                        .arg(Arg::new("asin").long("asin").required(true))
                        .arg(Arg::new("title").long("title"))
                        .arg(Arg::new("brand").long("brand"))
                        .arg(Arg::new("image").long("image"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("pack").long("pack").value_parser(value_parser!(i64)))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("weight").long("weight"))
                        .arg(Arg::new("weight-unit").long("weight-unit"))
                        .arg(Arg::new("fnsku").long("fnsku")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List products")
                        .arg(
                            Arg::new("incomplete")
                                .long("incomplete")
                                .action(ArgAction::SetTrue)
                                .help("Only products missing title, brand, or image"),
                        )
                        .arg(
                            Arg::new("match")
                                .long("match")
                                .help("Regex filter on title"),
                        ),
                ))
                .subcommand(
                    Command::new("show")
                        .about("Show one product with its pricing history")
                        .arg(Arg::new("asin").long("asin").required(true)),
                )
                .subcommand(
                    Command::new("stock")
                        .about("Set shipped/stored counts")
                        .arg(Arg::new("asin").long("asin").required(true))
                        .arg(
                            Arg::new("shipped")
                                .long("shipped")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("stored")
                                .long("stored")
                                .value_parser(value_parser!(i64)),
                        ),
                ),
        )
        .subcommand(
            Command::new("po")
                .about("Manage purchase orders")
                .subcommand(
                    Command::new("add")
                        .about("Create a purchase order")
                        .arg(Arg::new("date").long("date").required(true).help("YYYY-MM-DD"))
                        .arg(Arg::new("supplier").long("supplier").required(true))
                        .arg(Arg::new("po-number").long("po-number").required(true))
                        .arg(Arg::new("delivery").long("delivery").help("YYYY-MM-DD"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("payment").long("payment"))
                        .arg(Arg::new("shipping").long("shipping"))
                        .arg(Arg::new("notes").long("notes")),
                )
                .subcommand(
                    Command::new("add-item")
                        .about("Add a line item; unknown ASINs create an incomplete stub product")
                        .arg(
                            Arg::new("order")
                                .long("order")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("asin").long("asin").required(true))
                        .arg(
                            Arg::new("qty")
                                .long("qty")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("buy").long("buy"))
                        .arg(Arg::new("sell").long("sell"))
                        .arg(Arg::new("fee").long("fee")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List purchase orders with derived totals")
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(Arg::new("status").long("status")),
                ))
                .subcommand(
                    Command::new("show")
                        .about("Show one order with per-item figures")
                        .arg(
                            Arg::new("order")
                                .long("order")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(
                    Command::new("set-status")
                        .about("Move an order through its lifecycle")
                        .arg(
                            Arg::new("order")
                                .long("order")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("status").long("status").required(true)),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete an order and its items")
                        .arg(
                            Arg::new("order")
                                .long("order")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly purchase budgets")
                .subcommand(
                    Command::new("set")
                        .about("Set (or replace) one month's budget")
                        .arg(Arg::new("month").long("month").required(true).help("YYYY-MM"))
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(Command::new("list").about("List budgets"))
                .subcommand(json_flags(
                    Command::new("report")
                        .about("Pacing for the current month")
                        .arg(Arg::new("as-of").long("as-of").help("Treat this date as today (YYYY-MM-DD)")),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Derived reports")
                .subcommand(json_flags(
                    Command::new("totals")
                        .about("Per-order cost/profit/ROI")
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(
                            Arg::new("finalized")
                                .long("finalized")
                                .action(ArgAction::SetTrue)
                                .help("Only fully_received, collected, complete orders"),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("months")
                        .about("Budget vs spend for the three months before the current one")
                        .arg(Arg::new("as-of").long("as-of").help("Treat this date as today (YYYY-MM-DD)")),
                )),
        )
        .subcommand(
            Command::new("import")
                .about("CSV imports")
                .subcommand(
                    Command::new("asins")
                        .about("Upsert products from a loosely-formatted CSV")
                        .arg(Arg::new("path").long("path").required(true)),
                )
                .subcommand(
                    Command::new("template")
                        .about("Write the canonical ASIN import header row")
                        .arg(Arg::new("out").long("out").default_value("asin_template.csv")),
                ),
        )
        .subcommand(
            Command::new("settlement")
                .about("Marketplace settlement data")
                .subcommand(
                    Command::new("import")
                        .about("Replace all settlement rows from a marketplace report")
                        .arg(Arg::new("path").long("path").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List settlement rows")
                        .arg(Arg::new("month").long("month").help("YYYY-MM")),
                )),
        )
        .subcommand(
            Command::new("receipt")
                .about("Receipt files attached to purchase orders")
                .subcommand(
                    Command::new("attach")
                        .about("Copy a file into the order's receipt folder")
                        .arg(
                            Arg::new("order")
                                .long("order")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("file").long("file").required(true)),
                )
                .subcommand(
                    Command::new("list")
                        .about("List receipts")
                        .arg(Arg::new("order").long("order").value_parser(value_parser!(i64))),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Remove a receipt")
                        .arg(
                            Arg::new("order")
                                .long("order")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("file").long("file").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("products")
                        .about("Export the catalog")
                        .arg(Arg::new("format").long("format").default_value("csv").help("csv|json"))
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("orders")
                        .about("Export orders flattened to line items")
                        .arg(Arg::new("format").long("format").default_value("csv").help("csv|json"))
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Integrity checks"))
}

// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived financial figures. Pure functions over already-fetched values;
//! nothing here touches the store, mutates its input, or caches a result.
//! Every view recomputes from the stored truths (quantity, buy, sell, fee).

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::ProductKind;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ItemFigures {
    pub cost: Decimal,
    pub profit: Decimal,
    pub roi: Decimal, // percent
}

pub fn item_figures(quantity: i64, buy: Decimal, sell: Decimal, fee: Decimal) -> ItemFigures {
    let qty = Decimal::from(quantity);
    let cost = buy * qty;
    let profit = sell * qty - cost - fee * qty;
    let roi = if cost > Decimal::ZERO {
        profit / cost * HUNDRED
    } else {
        Decimal::ZERO
    };
    ItemFigures { cost, profit, roi }
}

/// Units ordered converted to saleable packs. Integer division drops any
/// remainder units; whether that should instead warn or round up is an
/// unresolved product question, so the source behavior is kept.
pub fn display_quantity(quantity: i64, kind: ProductKind, pack: i64) -> i64 {
    if kind == ProductKind::Bundle && pack > 1 {
        quantity / pack
    } else {
        quantity
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct OrderTotals {
    pub cost: Decimal,
    pub profit: Decimal,
    pub roi: Decimal, // percent
}

pub fn order_totals(items: &[ItemFigures], shipping: Decimal) -> OrderTotals {
    let cost: Decimal = items.iter().map(|i| i.cost).sum::<Decimal>() + shipping;
    let profit: Decimal = items.iter().map(|i| i.profit).sum();
    let roi = if cost > Decimal::ZERO {
        profit / cost * HUNDRED
    } else {
        Decimal::ZERO
    };
    OrderTotals { cost, profit, roi }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pacing {
    pub remaining: Decimal,
    pub percentage: Decimal,
    pub days_left: i64,
    pub daily_target: Decimal,
}

/// Month pacing for a given `today`. Days left run from today (exclusive)
/// to month end (inclusive). Negative remainders are clamped at display
/// time, not here.
pub fn budget_pacing(budget: Decimal, spend: Decimal, today: NaiveDate) -> Pacing {
    let remaining = budget - spend;
    let percentage = if budget > Decimal::ZERO {
        spend / budget * HUNDRED
    } else {
        Decimal::ZERO
    };
    let days_left = i64::from(days_in_month(today.year(), today.month())) - i64::from(today.day());
    let daily_target = if days_left > 0 && remaining > Decimal::ZERO {
        remaining / Decimal::from(days_left)
    } else {
        Decimal::ZERO
    };
    Pacing { remaining, percentage, days_left, daily_target }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthFigure {
    pub month: String, // YYYY-MM
    pub budget: Decimal,
    pub spend: Decimal,
}

/// The three calendar months strictly before `current`, oldest first.
/// Months are drawn from the merged budget/spend keys (a month with spend
/// but no budget still appears); when fewer than three exist, earlier
/// months are synthesized with zeros by walking back one month at a time.
pub fn month_history(
    budgets: &HashMap<String, Decimal>,
    spend: &HashMap<String, Decimal>,
    current: &str,
) -> Result<Vec<MonthFigure>> {
    let mut keys: Vec<String> = budgets
        .keys()
        .chain(spend.keys())
        .filter(|k| k.as_str() < current)
        .cloned()
        .collect();
    keys.sort();
    keys.dedup();
    keys.reverse();
    keys.truncate(3);
    while keys.len() < 3 {
        let seed = keys.last().map(String::as_str).unwrap_or(current);
        keys.push(previous_month(seed)?);
    }
    keys.reverse();
    Ok(keys
        .into_iter()
        .map(|month| {
            let budget = budgets.get(&month).copied().unwrap_or(Decimal::ZERO);
            let spent = spend.get(&month).copied().unwrap_or(Decimal::ZERO);
            MonthFigure { month, budget, spend: spent }
        })
        .collect())
}

fn previous_month(key: &str) -> Result<String> {
    let (y, m) = key
        .split_once('-')
        .with_context(|| format!("Invalid month key '{}'", key))?;
    let y: i32 = y.parse().with_context(|| format!("Invalid month key '{}'", key))?;
    let m: u32 = m.parse().with_context(|| format!("Invalid month key '{}'", key))?;
    let (py, pm) = if m <= 1 { (y - 1, 12) } else { (y, m - 1) };
    Ok(format!("{:04}-{:02}", py, pm))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn item_cost_profit_and_roi() {
        let f = item_figures(3, dec("2.00"), dec("5.00"), dec("0.50"));
        assert_eq!(f.cost, dec("6.00"));
        assert_eq!(f.profit, dec("7.50"));
        assert_eq!(f.roi, dec("125"));
    }

    #[test]
    fn roi_is_zero_when_cost_is_zero() {
        let f = item_figures(4, dec("0"), dec("5.00"), dec("0"));
        assert_eq!(f.roi, Decimal::ZERO);
    }

    #[test]
    fn bundle_display_quantity_floors() {
        assert_eq!(display_quantity(10, ProductKind::Bundle, 4), 2);
        assert_eq!(display_quantity(10, ProductKind::Single, 4), 10);
        assert_eq!(display_quantity(10, ProductKind::Bundle, 1), 10);
    }

    #[test]
    fn order_totals_include_shipping_in_cost_only() {
        let items = vec![
            item_figures(3, dec("2.00"), dec("5.00"), dec("0.50")),
            item_figures(1, dec("4.00"), dec("4.00"), dec("0")),
        ];
        let t = order_totals(&items, dec("5.00"));
        assert_eq!(t.cost, dec("15.00"));
        assert_eq!(t.profit, dec("7.50"));
        assert_eq!(t.roi, dec("50"));
    }

    #[test]
    fn pacing_mid_month_with_budget_headroom() {
        // 21st of a 30-day month
        let today = NaiveDate::from_ymd_opt(2025, 9, 21).unwrap();
        let p = budget_pacing(dec("1000"), dec("400"), today);
        assert_eq!(p.remaining, dec("600"));
        assert_eq!(p.percentage, dec("40"));
        assert_eq!(p.days_left, 9);
        assert_eq!(p.daily_target.round_dp(2), dec("66.67"));
    }

    #[test]
    fn pacing_overspent_month_targets_zero() {
        let today = NaiveDate::from_ymd_opt(2025, 9, 21).unwrap();
        let p = budget_pacing(dec("100"), dec("150"), today);
        assert_eq!(p.remaining, dec("-50"));
        assert_eq!(p.daily_target, Decimal::ZERO);
    }

    #[test]
    fn february_days_respect_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
    }

    #[test]
    fn month_history_synthesizes_three_prior_months() {
        let budgets = HashMap::from([("2025-08".to_string(), dec("1000"))]);
        let spend = HashMap::from([("2025-08".to_string(), dec("400"))]);
        let h = month_history(&budgets, &spend, "2025-08").unwrap();
        assert_eq!(
            h.iter().map(|m| m.month.as_str()).collect::<Vec<_>>(),
            vec!["2025-05", "2025-06", "2025-07"]
        );
        assert!(h.iter().all(|m| m.budget.is_zero() && m.spend.is_zero()));
    }

    #[test]
    fn month_history_merges_spend_only_months() {
        let budgets = HashMap::from([("2025-07".to_string(), dec("500"))]);
        let spend = HashMap::from([
            ("2025-06".to_string(), dec("120")),
            ("2025-07".to_string(), dec("80")),
        ]);
        let h = month_history(&budgets, &spend, "2025-08").unwrap();
        assert_eq!(
            h.iter().map(|m| m.month.as_str()).collect::<Vec<_>>(),
            vec!["2025-05", "2025-06", "2025-07"]
        );
        assert_eq!(h[1].budget, Decimal::ZERO);
        assert_eq!(h[1].spend, dec("120"));
        assert_eq!(h[2].budget, dec("500"));
    }

    #[test]
    fn month_history_walks_across_a_year_boundary() {
        let h = month_history(&HashMap::new(), &HashMap::new(), "2025-01").unwrap();
        assert_eq!(
            h.iter().map(|m| m.month.as_str()).collect::<Vec<_>>(),
            vec!["2024-10", "2024-11", "2024-12"]
        );
    }
}

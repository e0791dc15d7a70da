// Copyright (c) Restock Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::anyhow;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductKind {
    Single,
    Bundle,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Single => "Single",
            ProductKind::Bundle => "Bundle",
        }
    }
}

impl FromStr for ProductKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(ProductKind::Single),
            "bundle" => Ok(ProductKind::Bundle),
            _ => Err(anyhow!("Invalid type '{}' (use Single|Bundle)", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCategory {
    Stock,
    Other,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Stock => "Stock",
            ProductCategory::Other => "Other",
        }
    }
}

impl FromStr for ProductCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stock" => Ok(ProductCategory::Stock),
            "other" => Ok(ProductCategory::Other),
            _ => Err(anyhow!("Invalid category '{}' (use Stock|Other)", s)),
        }
    }
}

/// Purchase-order lifecycle. The last three states are the "finalized" set
/// used by reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Ordered,
    PartiallyDelivered,
    FullyReceived,
    Collected,
    Complete,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Ordered,
        OrderStatus::PartiallyDelivered,
        OrderStatus::FullyReceived,
        OrderStatus::Collected,
        OrderStatus::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Ordered => "ordered",
            OrderStatus::PartiallyDelivered => "partially_delivered",
            OrderStatus::FullyReceived => "fully_received",
            OrderStatus::Collected => "collected",
            OrderStatus::Complete => "complete",
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(
            self,
            OrderStatus::FullyReceived | OrderStatus::Collected | OrderStatus::Complete
        )
    }
}

impl FromStr for OrderStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_lowercase().replace([' ', '-'], "_");
        match norm.as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "ordered" => Ok(OrderStatus::Ordered),
            "partially_delivered" => Ok(OrderStatus::PartiallyDelivered),
            "fully_received" => Ok(OrderStatus::FullyReceived),
            "collected" => Ok(OrderStatus::Collected),
            "complete" => Ok(OrderStatus::Complete),
            _ => Err(anyhow!(
                "Invalid status '{}' (use pending|ordered|partially_delivered|fully_received|collected|complete)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub asin: String,
    pub title: String,
    pub brand: String,
    pub image_url: String,
    pub kind: ProductKind,
    pub pack: i64,
    pub category: ProductCategory,
    pub shipped: i64,
    pub stored: i64,
    pub weight: Option<Decimal>,
    pub weight_unit: Option<String>,
    pub fnsku: Option<String>,
}

impl Product {
    /// A product is incomplete unless title, brand, and image are all
    /// present and not the placeholder sentinel. Recomputed on every read,
    /// never stored.
    pub fn is_incomplete(&self, placeholder: &str) -> bool {
        [&self.title, &self.brand, &self.image_url]
            .iter()
            .any(|v| v.trim().is_empty() || v.trim() == placeholder)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: i64,
    pub ordered_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub supplier_id: i64,
    pub po_number: String,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub status: OrderStatus,
    pub shipping_cost: Decimal,
    pub notes: Option<String>,
}

/// Quantity, buy, sell, and fee are the only stored truths; every
/// cost/profit/ROI figure is derived from them on read (see `metrics`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub asin: String,
    pub quantity: i64,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub est_fee: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub month: String, // YYYY-MM
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: i64,
    pub date: Option<String>, // ISO YYYY-MM-DD, None when unparseable
    pub status: String,
    pub kind: String,
    pub order_ref: String,
    pub product_details: String,
    pub charges: Decimal,
    pub rebates: Decimal,
    pub fees: Decimal,
    pub other: Decimal,
    pub avg_cog: Decimal,
    pub total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_accepts_spaces_and_hyphens() {
        assert_eq!(
            "partially delivered".parse::<OrderStatus>().unwrap(),
            OrderStatus::PartiallyDelivered
        );
        assert_eq!(
            "fully-received".parse::<OrderStatus>().unwrap(),
            OrderStatus::FullyReceived
        );
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn finalized_set_is_last_three_states() {
        let finalized: Vec<_> = OrderStatus::ALL
            .iter()
            .filter(|s| s.is_finalized())
            .collect();
        assert_eq!(finalized.len(), 3);
        assert!(!OrderStatus::Ordered.is_finalized());
        assert!(OrderStatus::Collected.is_finalized());
    }

    #[test]
    fn incomplete_flag_checks_sentinel_and_blanks() {
        let mut p = Product {
            asin: "B000TEST01".into(),
            title: "Widget".into(),
            brand: "Acme".into(),
            image_url: "https://img/x.jpg".into(),
            kind: ProductKind::Single,
            pack: 1,
            category: ProductCategory::Stock,
            shipped: 0,
            stored: 0,
            weight: None,
            weight_unit: None,
            fnsku: None,
        };
        assert!(!p.is_incomplete("Unknown"));
        p.brand = "Unknown".into();
        assert!(p.is_incomplete("Unknown"));
        p.brand = "Acme".into();
        p.image_url = "  ".into();
        assert!(p.is_incomplete("Unknown"));
    }
}

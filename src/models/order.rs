//! Order documents as stored: loosely typed, every field optional.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::coerce;

/// Order lifecycle status. Missing or unrecognized labels collapse to
/// `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OrderStatus {
    Placed,
    Approved,
    Shipped,
    Delivered,
    Declined,
    Cancelled,
    Unknown,
}

impl OrderStatus {
    pub fn parse(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("Placed") => Self::Placed,
            Some("Approved") => Self::Approved,
            Some("Shipped") => Self::Shipped,
            Some("Delivered") => Self::Delivered,
            Some("Declined") => Self::Declined,
            Some("Cancelled") => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "Placed",
            Self::Approved => "Approved",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Declined => "Declined",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single order document: an opaque id plus the raw field map.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: String,
    pub data: Value,
}

/// One coerced line item. Items without a usable name never become a
/// `LineItem`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u64,
    pub price: f64,
}

impl OrderRecord {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Monetary total; absent or non-numeric counts as zero.
    pub fn total(&self) -> f64 {
        self.field("total").and_then(coerce::as_f64).unwrap_or(0.0)
    }

    /// Order placement time, if the stored value is parsable.
    pub fn order_date(&self) -> Option<DateTime<Utc>> {
        self.field("orderDate").and_then(coerce::as_instant)
    }

    pub fn status(&self) -> OrderStatus {
        OrderStatus::parse(self.field("status").and_then(Value::as_str))
    }

    /// Display identity: `userName` falling back to `userEmail`.
    pub fn customer(&self) -> Option<&str> {
        self.field("userName")
            .and_then(Value::as_str)
            .or_else(|| self.field("userEmail").and_then(Value::as_str))
    }

    /// Coerced line items. An absent or malformed `items` field yields an
    /// empty list; individual items missing a name are dropped.
    pub fn items(&self) -> Vec<LineItem> {
        let Some(items) = self.field("items").and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| {
                let name = item.get("name").and_then(Value::as_str)?.to_string();
                Some(LineItem {
                    name,
                    quantity: item
                        .get("quantity")
                        .and_then(coerce::as_u64)
                        .unwrap_or(0),
                    price: item.get("price").and_then(coerce::as_f64).unwrap_or(0.0),
                })
            })
            .collect()
    }
}

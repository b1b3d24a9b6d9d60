//! Domain model for a customer order.
//!
//! Orders are created once through submission, move through the kitchen
//! status state machine, and are never physically deleted; cancellation
//! is a terminal status so historical reporting stays intact.

use crate::domain::models::order_item::OrderItem;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";
pub const ORDER_ID_PREFIX: &str = "ORD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Statuses shown in the kitchen queue.
    pub const ACTIVE: [OrderStatus; 3] =
        [OrderStatus::Pending, OrderStatus::Preparing, OrderStatus::Ready];

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    /// The legal status transition table. Cancellation is only allowed
    /// before an order is ready; terminal statuses allow nothing.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Preparing)
                | (Preparing, Ready)
                | (Ready, Completed)
                | (Pending, Cancelled)
                | (Preparing, Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(Error::validation(
                "status",
                format!("'{}' is not a valid order status", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Takeout,
    Delivery,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dine_in",
            OrderType::Takeout => "takeout",
            OrderType::Delivery => "delivery",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dine_in" => Ok(OrderType::DineIn),
            "takeout" => Ok(OrderType::Takeout),
            "delivery" => Ok(OrderType::Delivery),
            other => Err(Error::validation(
                "order_type",
                format!("'{}' is not a valid order type", other),
            )),
        }
    }
}

/// Who the order is for and how it is fulfilled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: Option<String>,
    pub table_number: Option<String>,
    pub order_type: OrderType,
}

impl Customer {
    /// Normalize and validate. A missing name falls back to the walk-in
    /// default; a phone number, when given, must look like one.
    pub fn new(
        name: Option<&str>,
        phone: Option<&str>,
        table_number: Option<&str>,
        order_type: OrderType,
    ) -> Result<Self> {
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => WALK_IN_CUSTOMER.to_string(),
        };
        let phone = match phone.map(str::trim) {
            Some(p) if !p.is_empty() => Some(validate_phone(p)?),
            _ => None,
        };
        let table_number = table_number
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Ok(Self {
            name,
            phone,
            table_number,
            order_type,
        })
    }
}

fn validate_phone(phone: &str) -> Result<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 7 || digits.len() > 15 {
        return Err(Error::validation(
            "phone",
            "phone number must contain between 7 and 15 digits",
        ));
    }
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ');
    if !phone.chars().all(allowed) {
        return Err(Error::validation("phone", "phone number contains invalid characters"));
    }
    Ok(phone.to_string())
}

/// Derived monetary totals for a set of order lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Pure totals computation: `subtotal = Σ line_total`, tax rounded to
/// cents, `total = subtotal + tax`. Deterministic for identical inputs.
pub fn compute_totals(items: &[OrderItem], tax_rate: Decimal) -> Totals {
    let subtotal: Decimal = items.iter().map(OrderItem::line_total).sum();
    let tax = (subtotal * tax_rate).round_dp(2);
    Totals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Format: `ORD-<YYYYMMDDHHMM>-<8-hex>`. The embedded minute value
    /// participates in the queue display tie-break.
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub priority: bool,
    pub notes: String,
    /// Recorded by cancellation; required then, absent otherwise.
    pub cancel_reason: Option<String>,
    pub status_changed_at: DateTime<Utc>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Order {
    /// Construct a freshly submitted order. Items must be non-empty; an
    /// order with zero items never reaches the store.
    pub fn new(customer: Customer, items: Vec<OrderItem>, tax_rate: Decimal, now: DateTime<Utc>) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::validation("items", "an order must contain at least one item"));
        }
        let totals = compute_totals(&items, tax_rate);
        Ok(Self {
            id: Self::generate_id(now),
            created_at: now,
            customer,
            items,
            status: OrderStatus::Pending,
            priority: false,
            notes: String::new(),
            cancel_reason: None,
            status_changed_at: now,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
        })
    }

    /// `ORD-<YYYYMMDDHHMM>-<8-hex-uppercase>`: a sortable minute-precision
    /// timestamp plus a short random disambiguator.
    pub fn generate_id(now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
        format!("{}-{}-{}", ORDER_ID_PREFIX, now.format("%Y%m%d%H%M"), suffix)
    }

    /// The minute-precision number embedded in the order id, used as the
    /// display tie-break for near-simultaneous orders. `None` for ids
    /// that do not follow the expected format.
    pub fn id_minute(&self) -> Option<u64> {
        let mut parts = self.id.split('-');
        if parts.next() != Some(ORDER_ID_PREFIX) {
            return None;
        }
        parts.next().and_then(|stamp| stamp.parse().ok())
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

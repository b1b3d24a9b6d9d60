//! Shared wire types for the restaurant order core.
//!
//! Everything in this crate is a plain serde data type: the request and
//! response shapes that cross the boundary between the UI layer and the
//! backend. No business logic lives here; the backend maps these to and
//! from its domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Menu category on the wire. Matches the values stored in the
/// `menu_items` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuCategory {
    Appetizers,
    Mains,
    Desserts,
    Beverages,
    Salads,
    Soups,
    Sides,
    Specials,
}

/// Order status on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Takeout,
    Delivery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub category: MenuCategory,
    /// Exact decimal price, quantized to cents.
    pub price: Decimal,
    pub description: String,
    pub is_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddMenuItemRequest {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub is_available: Option<bool>,
}

/// Partial update: only the provided fields change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMenuItemRequest {
    pub id: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub is_available: Option<bool>,
}

/// One order line as captured at submission time. Prices are snapshots
/// taken from the menu item when the line was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub special_instructions: String,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub table_number: Option<String>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub priority: bool,
    pub notes: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// An order line as requested by the UI: references a menu item by id,
/// the backend resolves name and price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub menu_item_id: String,
    pub quantity: u32,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOrderRequest {
    /// Defaults to the walk-in customer name when absent.
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub table_number: Option<String>,
    pub order_type: OrderType,
    pub items: Vec<OrderLineRequest>,
}

/// Filter for order queries. `statuses: None` means the active queue
/// (pending, preparing, ready); an explicit list restricts to those
/// statuses; `all: true` returns everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFilter {
    pub statuses: Option<Vec<OrderStatus>>,
    #[serde(default)]
    pub all: bool,
}

/// Reporting window: a named shorthand or an explicit inclusive range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SalesPeriod {
    Today,
    Week,
    Month,
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: Decimal,
    pub order_count: u64,
    pub avg_order_value: Decimal,
    pub total_items_sold: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularItem {
    pub name: String,
    pub count: u64,
    /// Share of all items sold in the window, one decimal place.
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    /// "HH:00" for hourly buckets, "YYYY-MM-DD" for daily buckets.
    pub label: String,
    pub sales: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTypeBreakdown {
    pub order_type: OrderType,
    pub count: u64,
    pub revenue: Decimal,
    /// Share of window revenue, one decimal place.
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesData {
    pub summary: SalesSummary,
    pub popular_items: Vec<PopularItem>,
    pub time_breakdown: Vec<TimeBucket>,
    pub type_breakdown: Vec<OrderTypeBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Only "csv" is supported.
    pub format: String,
    pub period: SalesPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportResponse {
    pub filename: String,
    pub path: String,
    pub record_count: u64,
}

/// Error kinds exposed across the boundary. Mirrors the backend's
/// error taxonomy without leaking storage details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    Validation,
    NotFound,
    InvalidTransition,
    InvalidState,
    Corruption,
    Io,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// Human-readable message with enough context to act on.
    pub message: String,
    /// Field name for validation errors.
    pub field: Option<String>,
    /// Entity id for not-found / invalid-state errors.
    pub id: Option<String>,
    /// Current and requested status for transition errors.
    pub from: Option<OrderStatus>,
    pub to: Option<OrderStatus>,
}

/// The closed command/query surface. Each variant corresponds to one
/// method the UI layer may invoke; there is no string-keyed dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "data", rename_all = "camelCase")]
pub enum ApiRequest {
    GetMenuItems,
    AddMenuItem(AddMenuItemRequest),
    UpdateMenuItem(UpdateMenuItemRequest),
    DeleteMenuItem { id: String },
    SubmitOrder(SubmitOrderRequest),
    GetOrders(OrderFilter),
    UpdateOrderStatus { order_id: String, status: OrderStatus },
    CancelOrder { order_id: String, reason: String },
    SetOrderPriority { order_id: String, priority: bool },
    SetOrderNotes { order_id: String, notes: String },
    GetSalesData { period: SalesPeriod },
    ExportData(ExportRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", content = "data", rename_all = "camelCase")]
pub enum ApiResponse {
    MenuItems(Vec<MenuItem>),
    MenuItem(MenuItem),
    Deleted { id: String },
    Order(Order),
    Orders(Vec<Order>),
    SalesData(SalesData),
    Export(ExportResponse),
    Error(ApiError),
}

//! CSV-backed order repository.
//!
//! One row per order; the line items are stored as a JSON document in a
//! single column so the table keeps a fixed width. Cancellation reasons
//! and last-status-change timestamps are session state and are not
//! persisted.

use super::connection::CsvConnection;
use crate::domain::models::{Customer, Order, OrderItem};
use crate::error::{Error, Result};
use crate::storage::OrderStorage;
use chrono::{DateTime, Utc};
use csv::{Reader, StringRecord, Writer};
use log::{error, info, warn};
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

const TABLE: &str = "orders";
const HEADER: [&str; 13] = [
    "id",
    "created_at",
    "customer_name",
    "customer_phone",
    "table_number",
    "order_type",
    "status",
    "priority",
    "notes",
    "subtotal",
    "tax",
    "total",
    "items",
];

#[derive(Clone)]
pub struct OrderRepository {
    connection: CsvConnection,
}

impl OrderRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Strict read of the live table; parse failures surface as
    /// corruption without touching backups.
    pub fn load_strict(&self) -> Result<Vec<Order>> {
        self.connection
            .ensure_table_exists(TABLE, &HEADER.join(","))?;
        read_orders_file(&self.connection.table_path(TABLE))
    }

    fn recover_from_backups(&self) -> Result<Vec<Order>> {
        for backup in self.connection.backups_for(TABLE)? {
            match read_orders_file(&backup) {
                Ok(orders) => {
                    info!(
                        "recovered {} table from backup {}",
                        TABLE,
                        backup.display()
                    );
                    fs::copy(&backup, self.connection.table_path(TABLE))?;
                    return Ok(orders);
                }
                Err(e) => {
                    warn!("backup {} also invalid: {}", backup.display(), e);
                }
            }
        }
        error!("no valid {} backup found, starting with an empty table", TABLE);
        Ok(Vec::new())
    }
}

impl OrderStorage for OrderRepository {
    fn load(&self) -> Result<Vec<Order>> {
        match self.load_strict() {
            Ok(orders) => Ok(orders),
            Err(Error::Corruption { detail, .. }) => {
                warn!("{} table corrupted ({}), attempting backup recovery", TABLE, detail);
                self.recover_from_backups()
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, orders: &[Order]) -> Result<()> {
        let mut writer = Writer::from_writer(Vec::new());
        writer
            .write_record(HEADER)
            .map_err(|e| Error::corruption(TABLE, e.to_string()))?;
        for order in orders {
            let items = serde_json::to_string(&order.items)
                .map_err(|e| Error::corruption(TABLE, e.to_string()))?;
            writer
                .write_record(&[
                    order.id.as_str(),
                    &order.created_at.to_rfc3339(),
                    order.customer.name.as_str(),
                    order.customer.phone.as_deref().unwrap_or(""),
                    order.customer.table_number.as_deref().unwrap_or(""),
                    order.customer.order_type.as_str(),
                    order.status.as_str(),
                    if order.priority { "true" } else { "false" },
                    order.notes.as_str(),
                    &order.subtotal.to_string(),
                    &order.tax.to_string(),
                    &order.total.to_string(),
                    &items,
                ])
                .map_err(|e| Error::corruption(TABLE, e.to_string()))?;
        }
        let contents = writer
            .into_inner()
            .map_err(|e| Error::corruption(TABLE, e.to_string()))?;
        self.connection.atomic_replace(TABLE, &contents)
    }
}

fn read_orders_file(path: &Path) -> Result<Vec<Order>> {
    let contents = fs::read_to_string(path)?;
    let mut reader = Reader::from_reader(contents.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::corruption(TABLE, format!("unreadable header: {}", e)))?;
    if headers != &StringRecord::from(HEADER.as_slice()) {
        return Err(Error::corruption(
            TABLE,
            format!("unexpected header: {:?}", headers),
        ));
    }

    let mut orders = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| Error::corruption(TABLE, format!("row {}: {}", row + 1, e)))?;
        orders.push(parse_record(&record, row + 1)?);
    }
    Ok(orders)
}

fn parse_record(record: &StringRecord, row: usize) -> Result<Order> {
    if record.len() != HEADER.len() {
        return Err(Error::corruption(
            TABLE,
            format!("row {}: expected {} columns, found {}", row, HEADER.len(), record.len()),
        ));
    }
    let field = |i: usize| record.get(i).unwrap_or("");
    let bad = |what: &str, detail: String| Error::corruption(TABLE, format!("row {}: bad {}: {}", row, what, detail));

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(field(1))
        .map_err(|e| bad("created_at", e.to_string()))?
        .with_timezone(&Utc);
    let order_type = field(5)
        .parse()
        .map_err(|_| bad("order_type", field(5).to_string()))?;
    let status = field(6)
        .parse()
        .map_err(|_| bad("status", field(6).to_string()))?;
    let priority = match field(7) {
        "true" => true,
        "false" => false,
        other => return Err(bad("priority", other.to_string())),
    };
    let decimal = |i: usize, what: &str| -> Result<Decimal> {
        field(i).parse().map_err(|e: rust_decimal::Error| bad(what, e.to_string()))
    };
    let items: Vec<OrderItem> =
        serde_json::from_str(field(12)).map_err(|e| bad("items", e.to_string()))?;
    let optional = |i: usize| {
        let value = field(i);
        (!value.is_empty()).then(|| value.to_string())
    };

    Ok(Order {
        id: field(0).to_string(),
        created_at,
        customer: Customer {
            name: field(2).to_string(),
            phone: optional(3),
            table_number: optional(4),
            order_type,
        },
        items,
        status,
        priority,
        notes: field(8).to_string(),
        cancel_reason: None,
        status_changed_at: created_at,
        subtotal: decimal(9, "subtotal")?,
        tax: decimal(10, "tax")?,
        total: decimal(11, "total")?,
    })
}

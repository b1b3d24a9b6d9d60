//! Domain model for one line of an order.
//!
//! An order line snapshots the menu item's name and price at add-time:
//! later menu edits must never alter an existing order.

use crate::domain::models::menu_item::MenuItem;
use crate::error::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 99;
pub const MAX_INSTRUCTIONS_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub special_instructions: String,
}

impl OrderItem {
    /// Build a line from a menu item. Out-of-range quantities are a
    /// reported error, never clamped; unavailable items are rejected.
    pub fn new(menu_item: &MenuItem, quantity: u32, special_instructions: Option<&str>) -> Result<Self> {
        if !menu_item.is_available {
            return Err(Error::validation(
                "menu_item_id",
                format!("menu item '{}' is not available", menu_item.name),
            ));
        }
        if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
            return Err(Error::validation(
                "quantity",
                format!(
                    "quantity {} is out of range ({} to {})",
                    quantity, MIN_QUANTITY, MAX_QUANTITY
                ),
            ));
        }
        let instructions = special_instructions.unwrap_or("").trim();
        if instructions.len() > MAX_INSTRUCTIONS_LEN {
            return Err(Error::validation(
                "special_instructions",
                format!("special instructions cannot exceed {} characters", MAX_INSTRUCTIONS_LEN),
            ));
        }

        Ok(Self {
            menu_item_id: menu_item.id.clone(),
            name: menu_item.name.clone(),
            unit_price: menu_item.price,
            quantity,
            special_instructions: instructions.to_string(),
        })
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

//! Menu management service.
//!
//! Owns the in-memory menu table and writes it through to storage after
//! every mutation. A failed write keeps the mutation in memory and marks
//! the table dirty so the next auto-save tick retries it.

use crate::domain::models::MenuItem;
use crate::error::{Error, Result};
use crate::storage::MenuStorage;
use log::{info, warn};
use rust_decimal::Decimal;

pub struct MenuService<S: MenuStorage> {
    storage: S,
    items: Vec<MenuItem>,
    dirty: bool,
}

impl<S: MenuStorage> MenuService<S> {
    /// Load the menu table into memory. Corrupted live files have already
    /// been recovered (or replaced with an empty table) by the storage
    /// layer at this point.
    pub fn new(storage: S) -> Result<Self> {
        let items = storage.load()?;
        info!("loaded {} menu item(s)", items.len());
        Ok(Self {
            storage,
            items,
            dirty: false,
        })
    }

    pub fn list_items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn get_item(&self, id: &str) -> Result<&MenuItem> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .ok_or_else(|| Error::NotFound {
                entity: "menu item",
                id: id.to_string(),
            })
    }

    pub fn add_item(
        &mut self,
        name: &str,
        category: &str,
        price: Decimal,
        description: Option<&str>,
        is_available: bool,
    ) -> Result<MenuItem> {
        let item = MenuItem::new(name, category, price, description, is_available)?;
        info!("added menu item '{}' ({})", item.name, item.id);
        self.items.push(item.clone());
        self.write_through();
        Ok(item)
    }

    pub fn update_item(
        &mut self,
        id: &str,
        name: Option<&str>,
        category: Option<&str>,
        price: Option<Decimal>,
        description: Option<&str>,
        is_available: Option<bool>,
    ) -> Result<MenuItem> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| Error::NotFound {
                entity: "menu item",
                id: id.to_string(),
            })?;
        item.apply_update(name, category, price, description, is_available)?;
        let updated = item.clone();
        self.write_through();
        Ok(updated)
    }

    pub fn delete_item(&mut self, id: &str) -> Result<()> {
        let position = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| Error::NotFound {
                entity: "menu item",
                id: id.to_string(),
            })?;
        let removed = self.items.remove(position);
        info!("deleted menu item '{}' ({})", removed.name, removed.id);
        self.write_through();
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Retry persistence for mutations whose immediate write failed.
    pub fn flush_if_dirty(&mut self) -> Result<()> {
        if self.dirty {
            self.storage.save(&self.items)?;
            self.dirty = false;
        }
        Ok(())
    }

    /// Unconditional save, used at shutdown.
    pub fn persist_now(&mut self) -> Result<()> {
        self.storage.save(&self.items)?;
        self.dirty = false;
        Ok(())
    }

    fn write_through(&mut self) {
        self.dirty = true;
        match self.storage.save(&self.items) {
            Ok(()) => self.dirty = false,
            Err(e) => warn!("menu save failed, will retry on next auto-save: {}", e),
        }
    }
}

//! Order queue management.
//!
//! Owns the full order history in memory and enforces the kitchen
//! status state machine. Orders are never deleted; completed and
//! cancelled orders stay in the table for reporting.

use crate::domain::models::{Customer, Order, OrderItem, OrderStatus};
use crate::error::{Error, Result};
use crate::storage::OrderStorage;
use chrono::{DateTime, Utc};
use log::{info, warn};
use rust_decimal::Decimal;
use std::cmp::Ordering;

pub const MAX_NOTES_LEN: usize = 500;

pub struct OrderQueueService<S: OrderStorage> {
    storage: S,
    orders: Vec<Order>,
    dirty: bool,
}

impl<S: OrderStorage> OrderQueueService<S> {
    pub fn new(storage: S) -> Result<Self> {
        let orders = storage.load()?;
        info!("loaded {} order(s)", orders.len());
        Ok(Self {
            storage,
            orders,
            dirty: false,
        })
    }

    pub fn get_order(&self, order_id: &str) -> Result<&Order> {
        self.orders
            .iter()
            .find(|o| o.id == order_id)
            .ok_or_else(|| Error::NotFound {
                entity: "order",
                id: order_id.to_string(),
            })
    }

    /// Create a new pending order and write it through to storage.
    pub fn submit_order(
        &mut self,
        customer: Customer,
        items: Vec<OrderItem>,
        tax_rate: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        let order = Order::new(customer, items, tax_rate, now)?;
        info!(
            "submitted order {} ({} item(s), total {})",
            order.id,
            order.item_count(),
            order.total
        );
        self.orders.push(order.clone());
        self.write_through();
        Ok(order)
    }

    /// Advance an order along the pending -> preparing -> ready ->
    /// completed path. Requesting the current status is a no-op;
    /// cancellation must go through `cancel_order` so a reason is
    /// always recorded.
    pub fn transition(
        &mut self,
        order_id: &str,
        to: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        if to == OrderStatus::Cancelled {
            return Err(Error::validation(
                "status",
                "cancellation requires a reason, use the cancel operation",
            ));
        }

        let order = self.get_order_mut(order_id)?;
        if order.status == to {
            return Ok(order.clone());
        }
        if !order.status.can_transition_to(to) {
            return Err(Error::InvalidTransition {
                from: order.status,
                to,
            });
        }

        info!("order {} {} -> {}", order.id, order.status, to);
        order.status = to;
        order.status_changed_at = now;
        let updated = order.clone();
        self.write_through();
        Ok(updated)
    }

    /// Cancel an order that has not yet reached the ready status. The
    /// reason is mandatory and kept for the rest of the session.
    pub fn cancel_order(
        &mut self,
        order_id: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(Error::validation("reason", "a cancellation reason is required"));
        }

        let order = self.get_order_mut(order_id)?;
        if !order.status.can_transition_to(OrderStatus::Cancelled) {
            return Err(Error::InvalidTransition {
                from: order.status,
                to: OrderStatus::Cancelled,
            });
        }

        info!("order {} cancelled: {}", order.id, reason);
        order.status = OrderStatus::Cancelled;
        order.cancel_reason = Some(reason.to_string());
        order.status_changed_at = now;
        let updated = order.clone();
        self.write_through();
        Ok(updated)
    }

    pub fn set_priority(&mut self, order_id: &str, priority: bool) -> Result<Order> {
        let order = self.get_order_mut(order_id)?;
        if order.status.is_terminal() {
            return Err(Error::InvalidState {
                order_id: order.id.clone(),
                status: order.status,
            });
        }
        order.priority = priority;
        let updated = order.clone();
        self.write_through();
        Ok(updated)
    }

    pub fn set_notes(&mut self, order_id: &str, notes: &str) -> Result<Order> {
        let notes = notes.trim();
        if notes.len() > MAX_NOTES_LEN {
            return Err(Error::validation(
                "notes",
                format!("notes cannot exceed {} characters", MAX_NOTES_LEN),
            ));
        }

        let order = self.get_order_mut(order_id)?;
        if order.status.is_terminal() {
            return Err(Error::InvalidState {
                order_id: order.id.clone(),
                status: order.status,
            });
        }
        order.notes = notes.to_string();
        let updated = order.clone();
        self.write_through();
        Ok(updated)
    }

    /// Orders for display, newest first. `statuses: None` means the
    /// active queue; `include_all` returns the entire history.
    pub fn list(&self, statuses: Option<&[OrderStatus]>, include_all: bool) -> Vec<Order> {
        let mut selected: Vec<Order> = self
            .orders
            .iter()
            .filter(|order| {
                if include_all {
                    true
                } else {
                    match statuses {
                        Some(wanted) => wanted.contains(&order.status),
                        None => order.status.is_active(),
                    }
                }
            })
            .cloned()
            .collect();
        selected.sort_by(queue_ordering);
        selected
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Retry persistence for mutations whose immediate write failed.
    pub fn flush_if_dirty(&mut self) -> Result<()> {
        if self.dirty {
            self.storage.save(&self.orders)?;
            self.dirty = false;
        }
        Ok(())
    }

    /// Unconditional save, used at shutdown.
    pub fn persist_now(&mut self) -> Result<()> {
        self.storage.save(&self.orders)?;
        self.dirty = false;
        Ok(())
    }

    fn get_order_mut(&mut self, order_id: &str) -> Result<&mut Order> {
        self.orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| Error::NotFound {
                entity: "order",
                id: order_id.to_string(),
            })
    }

    fn write_through(&mut self) {
        self.dirty = true;
        match self.storage.save(&self.orders) {
            Ok(()) => self.dirty = false,
            Err(e) => warn!("order save failed, will retry on next auto-save: {}", e),
        }
    }
}

/// Newest-first display order. The key truncates the creation time to
/// whole seconds, so orders created in the same second compare by the
/// minute stamp embedded in their ids and then by the id string itself,
/// keeping the relative order stable across reloads when creation
/// timestamps collide. The key is a total order, which `sort_by`
/// requires.
fn queue_ordering(a: &Order, b: &Order) -> Ordering {
    queue_key(b).cmp(&queue_key(a))
}

fn queue_key(order: &Order) -> (i64, Option<u64>, &str) {
    (
        order.created_at.timestamp(),
        order.id_minute(),
        order.id.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_tax_rate;
    use crate::domain::models::{MenuItem, OrderType};
    use crate::storage::csv::test_utils::TestHelper;
    use anyhow::Result;
    use chrono::Duration;
    use std::str::FromStr as _;
    use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

    fn lines() -> Vec<OrderItem> {
        let item = MenuItem::new(
            "Ramen",
            "soups",
            Decimal::from_str("11.00").unwrap(),
            None,
            true,
        )
        .unwrap();
        vec![OrderItem::new(&item, 1, None).unwrap()]
    }

    fn walk_in() -> Customer {
        Customer::new(None, None, None, OrderType::Takeout).unwrap()
    }

    fn service(helper: &TestHelper) -> Result<OrderQueueService<crate::storage::csv::OrderRepository>> {
        Ok(OrderQueueService::new(helper.order_repo.clone())?)
    }

    #[test]
    fn orders_walk_the_happy_path() -> Result<()> {
        let helper = TestHelper::new()?;
        let mut queue = service(&helper)?;
        let order = queue.submit_order(walk_in(), lines(), default_tax_rate(), Utc::now())?;
        assert_eq!(order.status, OrderStatus::Pending);

        let now = Utc::now();
        queue.transition(&order.id, OrderStatus::Preparing, now)?;
        queue.transition(&order.id, OrderStatus::Ready, now)?;
        let done = queue.transition(&order.id, OrderStatus::Completed, now)?;
        assert_eq!(done.status, OrderStatus::Completed);
        Ok(())
    }

    #[test]
    fn skipping_a_stage_is_rejected_and_state_is_unchanged() -> Result<()> {
        let helper = TestHelper::new()?;
        let mut queue = service(&helper)?;
        let order = queue.submit_order(walk_in(), lines(), default_tax_rate(), Utc::now())?;

        let err = queue.transition(&order.id, OrderStatus::Ready, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Ready,
            }
        ));
        assert_eq!(queue.get_order(&order.id)?.status, OrderStatus::Pending);
        Ok(())
    }

    #[test]
    fn requesting_the_current_status_is_a_no_op() -> Result<()> {
        let helper = TestHelper::new()?;
        let mut queue = service(&helper)?;
        let order = queue.submit_order(walk_in(), lines(), default_tax_rate(), Utc::now())?;

        let same = queue.transition(&order.id, OrderStatus::Pending, Utc::now())?;
        assert_eq!(same.status, OrderStatus::Pending);
        Ok(())
    }

    #[test]
    fn cancellation_requires_a_reason_and_an_early_status() -> Result<()> {
        let helper = TestHelper::new()?;
        let mut queue = service(&helper)?;
        let order = queue.submit_order(walk_in(), lines(), default_tax_rate(), Utc::now())?;

        let err = queue.cancel_order(&order.id, "   ", Utc::now()).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "reason"));

        let cancelled = queue.cancel_order(&order.id, "customer left", Utc::now())?;
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.cancel_reason.as_deref(), Some("customer left"));
        Ok(())
    }

    #[test]
    fn ready_orders_cannot_be_cancelled() -> Result<()> {
        let helper = TestHelper::new()?;
        let mut queue = service(&helper)?;
        let order = queue.submit_order(walk_in(), lines(), default_tax_rate(), Utc::now())?;
        queue.transition(&order.id, OrderStatus::Preparing, Utc::now())?;
        queue.transition(&order.id, OrderStatus::Ready, Utc::now())?;

        let err = queue.cancel_order(&order.id, "too late", Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: OrderStatus::Ready,
                to: OrderStatus::Cancelled,
            }
        ));
        Ok(())
    }

    #[test]
    fn direct_transition_to_cancelled_is_redirected() -> Result<()> {
        let helper = TestHelper::new()?;
        let mut queue = service(&helper)?;
        let order = queue.submit_order(walk_in(), lines(), default_tax_rate(), Utc::now())?;

        let err = queue
            .transition(&order.id, OrderStatus::Cancelled, Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "status"));
        Ok(())
    }

    #[test]
    fn terminal_orders_reject_priority_and_notes_edits() -> Result<()> {
        let helper = TestHelper::new()?;
        let mut queue = service(&helper)?;
        let order = queue.submit_order(walk_in(), lines(), default_tax_rate(), Utc::now())?;
        queue.cancel_order(&order.id, "out of stock", Utc::now())?;

        assert!(matches!(
            queue.set_priority(&order.id, true),
            Err(Error::InvalidState { .. })
        ));
        assert!(matches!(
            queue.set_notes(&order.id, "rush"),
            Err(Error::InvalidState { .. })
        ));
        Ok(())
    }

    #[test]
    fn default_listing_shows_only_the_active_queue() -> Result<()> {
        let helper = TestHelper::new()?;
        let mut queue = service(&helper)?;
        let keep = queue.submit_order(walk_in(), lines(), default_tax_rate(), Utc::now())?;
        let gone = queue.submit_order(walk_in(), lines(), default_tax_rate(), Utc::now())?;
        queue.cancel_order(&gone.id, "duplicate", Utc::now())?;

        let active = queue.list(None, false);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, keep.id);

        let everything = queue.list(None, true);
        assert_eq!(everything.len(), 2);

        let cancelled = queue.list(Some(&[OrderStatus::Cancelled]), false);
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].id, gone.id);
        Ok(())
    }

    #[test]
    fn same_second_submissions_list_by_id_not_insertion_order() -> Result<()> {
        let helper = TestHelper::new()?;
        let base: DateTime<Utc> = "2025-03-15T12:00:00Z".parse().unwrap();
        // Stored with the lower id last: insertion order must not win.
        let stored = vec![
            order_at("ORD-202503151200-CCCCCCCC", base),
            order_at("ORD-202503151200-AAAAAAAA", base),
        ];
        crate::storage::OrderStorage::save(&helper.order_repo, &stored)?;

        let queue = service(&helper)?;
        let listed = queue.list(None, false);
        let ids: Vec<_> = listed.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["ORD-202503151200-CCCCCCCC", "ORD-202503151200-AAAAAAAA"]
        );
        Ok(())
    }

    #[test]
    fn near_simultaneous_orders_sort_by_id() {
        let base: DateTime<Utc> = "2025-03-15T12:00:00Z".parse().unwrap();
        let mut a = order_at("ORD-202503151200-AAAAAAAA", base);
        let b = order_at("ORD-202503151200-BBBBBBBB", base + Duration::milliseconds(500));

        // Same second: id decides, descending.
        assert_eq!(queue_ordering(&a, &b), Ordering::Greater);
        assert_eq!(queue_ordering(&b, &a), Ordering::Less);

        // Different seconds: newest first by timestamp, id ignored.
        a.created_at = base - Duration::seconds(5);
        assert_eq!(queue_ordering(&a, &b), Ordering::Greater);
    }

    #[test]
    fn rapid_submissions_stay_newest_first_beyond_the_same_second() {
        let base: DateTime<Utc> = "2025-03-15T12:00:00Z".parse().unwrap();
        // Sub-second submission spacing with id suffixes running against
        // the clock, so an id-biased comparison would scramble the
        // timestamp order.
        let mut orders: Vec<Order> = (0..60)
            .map(|i| {
                let id = format!("ORD-202503151200-{:08X}", 0xFFFF_FFFFu32 - i as u32);
                order_at(&id, base + Duration::milliseconds(700 * i as i64))
            })
            .collect();
        orders.sort_by(queue_ordering);

        for pair in orders.windows(2) {
            let (newer, older) = (&pair[0], &pair[1]);
            assert!(
                newer.created_at.timestamp() >= older.created_at.timestamp(),
                "{} listed before {} despite being older",
                newer.id,
                older.id
            );
            if newer.created_at.timestamp() == older.created_at.timestamp() {
                assert!(newer.id > older.id);
            }
        }
    }

    fn order_at(id: &str, created_at: DateTime<Utc>) -> Order {
        let mut order = Order::new(walk_in(), lines(), default_tax_rate(), created_at).unwrap();
        order.id = id.to_string();
        order
    }

    struct FailingStorage {
        failing: AtomicBool,
    }

    impl OrderStorage for FailingStorage {
        fn load(&self) -> crate::error::Result<Vec<Order>> {
            Ok(Vec::new())
        }

        fn save(&self, _orders: &[Order]) -> crate::error::Result<()> {
            if self.failing.load(AtomicOrdering::Relaxed) {
                Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn failed_save_retains_the_order_for_retry() -> Result<()> {
        let storage = FailingStorage {
            failing: AtomicBool::new(true),
        };
        let mut queue = OrderQueueService::new(storage)?;

        let order = queue.submit_order(walk_in(), lines(), default_tax_rate(), Utc::now())?;
        assert!(queue.is_dirty());
        assert!(queue.get_order(&order.id).is_ok());

        queue.storage.failing.store(false, AtomicOrdering::Relaxed);
        queue.flush_if_dirty()?;
        assert!(!queue.is_dirty());
        Ok(())
    }
}

//! Typed command/query surface.
//!
//! The UI layer hands [`shared::ApiRequest`] values to
//! [`Backend::handle`] and always gets a [`shared::ApiResponse`] back;
//! domain errors are mapped to [`shared::ApiError`] and never panic
//! across the boundary.

use crate::domain::models::{Customer, OrderItem, OrderStatus};
use crate::domain::{mappers, sales_service};
use crate::error::{Error, Result};
use crate::storage::OrderStorage;
use crate::Backend;
use chrono::Utc;
use log::debug;
use shared::{
    AddMenuItemRequest, ApiError, ApiErrorKind, ApiRequest, ApiResponse, ExportRequest,
    OrderFilter, SalesPeriod, SubmitOrderRequest, UpdateMenuItemRequest,
};

impl Backend {
    /// Dispatch one request. Infallible at this boundary: every domain
    /// error comes back as an `ApiResponse::Error`.
    pub fn handle(&mut self, request: ApiRequest) -> ApiResponse {
        debug!("handling {:?}", request);
        let result = match request {
            ApiRequest::GetMenuItems => Ok(self.get_menu_items()),
            ApiRequest::AddMenuItem(req) => self.add_menu_item(req),
            ApiRequest::UpdateMenuItem(req) => self.update_menu_item(req),
            ApiRequest::DeleteMenuItem { id } => self.delete_menu_item(id),
            ApiRequest::SubmitOrder(req) => self.submit_order(req),
            ApiRequest::GetOrders(filter) => Ok(self.get_orders(filter)),
            ApiRequest::UpdateOrderStatus { order_id, status } => {
                self.update_order_status(&order_id, status)
            }
            ApiRequest::CancelOrder { order_id, reason } => self.cancel_order(&order_id, &reason),
            ApiRequest::SetOrderPriority { order_id, priority } => {
                self.set_order_priority(&order_id, priority)
            }
            ApiRequest::SetOrderNotes { order_id, notes } => self.set_order_notes(&order_id, &notes),
            ApiRequest::GetSalesData { period } => self.get_sales_data(&period),
            ApiRequest::ExportData(req) => self.export_data(&req),
        };
        result.unwrap_or_else(|err| ApiResponse::Error(to_api_error(&err)))
    }

    fn get_menu_items(&self) -> ApiResponse {
        let items = self
            .menu
            .list_items()
            .iter()
            .map(mappers::menu_item_to_dto)
            .collect();
        ApiResponse::MenuItems(items)
    }

    fn add_menu_item(&mut self, req: AddMenuItemRequest) -> Result<ApiResponse> {
        let item = self.menu.add_item(
            &req.name,
            &req.category,
            req.price,
            req.description.as_deref(),
            req.is_available.unwrap_or(true),
        )?;
        Ok(ApiResponse::MenuItem(mappers::menu_item_to_dto(&item)))
    }

    fn update_menu_item(&mut self, req: UpdateMenuItemRequest) -> Result<ApiResponse> {
        let item = self.menu.update_item(
            &req.id,
            req.name.as_deref(),
            req.category.as_deref(),
            req.price,
            req.description.as_deref(),
            req.is_available,
        )?;
        Ok(ApiResponse::MenuItem(mappers::menu_item_to_dto(&item)))
    }

    fn delete_menu_item(&mut self, id: String) -> Result<ApiResponse> {
        self.menu.delete_item(&id)?;
        Ok(ApiResponse::Deleted { id })
    }

    fn submit_order(&mut self, req: SubmitOrderRequest) -> Result<ApiResponse> {
        let customer = Customer::new(
            req.customer_name.as_deref(),
            req.customer_phone.as_deref(),
            req.table_number.as_deref(),
            mappers::order_type_from_dto(req.order_type),
        )?;

        let mut items = Vec::with_capacity(req.items.len());
        for line in &req.items {
            let menu_item = self.menu.get_item(&line.menu_item_id)?;
            items.push(OrderItem::new(
                menu_item,
                line.quantity,
                line.special_instructions.as_deref(),
            )?);
        }

        let order = self
            .queue
            .submit_order(customer, items, self.config.tax_rate, Utc::now())?;
        Ok(ApiResponse::Order(mappers::order_to_dto(&order)))
    }

    fn get_orders(&self, filter: OrderFilter) -> ApiResponse {
        let statuses: Option<Vec<OrderStatus>> = filter
            .statuses
            .map(|wanted| wanted.into_iter().map(mappers::status_from_dto).collect());
        let orders = self
            .queue
            .list(statuses.as_deref(), filter.all)
            .iter()
            .map(mappers::order_to_dto)
            .collect();
        ApiResponse::Orders(orders)
    }

    fn update_order_status(
        &mut self,
        order_id: &str,
        status: shared::OrderStatus,
    ) -> Result<ApiResponse> {
        let order = self
            .queue
            .transition(order_id, mappers::status_from_dto(status), Utc::now())?;
        Ok(ApiResponse::Order(mappers::order_to_dto(&order)))
    }

    fn cancel_order(&mut self, order_id: &str, reason: &str) -> Result<ApiResponse> {
        let order = self.queue.cancel_order(order_id, reason, Utc::now())?;
        Ok(ApiResponse::Order(mappers::order_to_dto(&order)))
    }

    fn set_order_priority(&mut self, order_id: &str, priority: bool) -> Result<ApiResponse> {
        let order = self.queue.set_priority(order_id, priority)?;
        Ok(ApiResponse::Order(mappers::order_to_dto(&order)))
    }

    fn set_order_notes(&mut self, order_id: &str, notes: &str) -> Result<ApiResponse> {
        let order = self.queue.set_notes(order_id, notes)?;
        Ok(ApiResponse::Order(mappers::order_to_dto(&order)))
    }

    /// Reporting reads a fresh snapshot from the store rather than the
    /// queue's working set, so it only ever sees persisted orders.
    fn get_sales_data(&self, period: &SalesPeriod) -> Result<ApiResponse> {
        let (start, end) = sales_service::resolve_period(period, Utc::now())?;
        let snapshot = self.order_store.load()?;
        let data = sales_service::sales_data(&snapshot, start, end);
        Ok(ApiResponse::SalesData(data))
    }

    fn export_data(&mut self, req: &ExportRequest) -> Result<ApiResponse> {
        let snapshot = self.order_store.load()?;
        let response = self.export.export_report(&snapshot, req, Utc::now())?;
        Ok(ApiResponse::Export(response))
    }
}

fn to_api_error(err: &Error) -> ApiError {
    let mut api = ApiError {
        kind: ApiErrorKind::Io,
        message: err.to_string(),
        field: None,
        id: None,
        from: None,
        to: None,
    };
    match err {
        Error::Validation { field, .. } => {
            api.kind = ApiErrorKind::Validation;
            api.field = Some(field.clone());
        }
        Error::NotFound { id, .. } => {
            api.kind = ApiErrorKind::NotFound;
            api.id = Some(id.clone());
        }
        Error::InvalidTransition { from, to } => {
            api.kind = ApiErrorKind::InvalidTransition;
            api.from = Some(mappers::status_to_dto(*from));
            api.to = Some(mappers::status_to_dto(*to));
        }
        Error::InvalidState { order_id, .. } => {
            api.kind = ApiErrorKind::InvalidState;
            api.id = Some(order_id.clone());
        }
        Error::Corruption { .. } => {
            api.kind = ApiErrorKind::Corruption;
        }
        Error::Io(_) => {
            api.kind = ApiErrorKind::Io;
        }
    }
    api
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use anyhow::Result;
    use rust_decimal::Decimal;
    use shared::OrderLineRequest;
    use std::str::FromStr as _;
    use tempfile::TempDir;

    fn backend() -> Result<(Backend, TempDir)> {
        let dir = TempDir::new()?;
        let backend = Backend::new(AppConfig::with_data_dir(dir.path()))?;
        Ok((backend, dir))
    }

    fn add_item(backend: &mut Backend, name: &str, price: &str) -> String {
        let response = backend.handle(ApiRequest::AddMenuItem(AddMenuItemRequest {
            name: name.to_string(),
            category: "mains".to_string(),
            price: Decimal::from_str(price).unwrap(),
            description: None,
            is_available: None,
        }));
        match response {
            ApiResponse::MenuItem(item) => item.id,
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn submit_order_resolves_lines_and_computes_totals() -> Result<()> {
        let (mut backend, _dir) = backend()?;
        let burger = add_item(&mut backend, "Burger", "10.00");
        let fries = add_item(&mut backend, "Fries", "5.50");

        let response = backend.handle(ApiRequest::SubmitOrder(SubmitOrderRequest {
            customer_name: Some("Sam".to_string()),
            customer_phone: None,
            table_number: Some("7".to_string()),
            order_type: shared::OrderType::DineIn,
            items: vec![
                OrderLineRequest {
                    menu_item_id: burger,
                    quantity: 2,
                    special_instructions: None,
                },
                OrderLineRequest {
                    menu_item_id: fries,
                    quantity: 1,
                    special_instructions: Some("extra crispy".to_string()),
                },
            ],
        }));

        let ApiResponse::Order(order) = response else {
            panic!("unexpected response: {:?}", response);
        };
        assert_eq!(order.subtotal, Decimal::from_str("25.50").unwrap());
        assert_eq!(order.tax, Decimal::from_str("2.04").unwrap());
        assert_eq!(order.total, Decimal::from_str("27.54").unwrap());
        assert_eq!(order.status, shared::OrderStatus::Pending);
        assert_eq!(order.items[1].special_instructions, "extra crispy");
        Ok(())
    }

    #[test]
    fn unknown_menu_item_maps_to_a_not_found_error() -> Result<()> {
        let (mut backend, _dir) = backend()?;
        let response = backend.handle(ApiRequest::SubmitOrder(SubmitOrderRequest {
            customer_name: None,
            customer_phone: None,
            table_number: None,
            order_type: shared::OrderType::Takeout,
            items: vec![OrderLineRequest {
                menu_item_id: "nope".to_string(),
                quantity: 1,
                special_instructions: None,
            }],
        }));

        let ApiResponse::Error(err) = response else {
            panic!("expected an error response");
        };
        assert_eq!(err.kind, ApiErrorKind::NotFound);
        assert_eq!(err.id.as_deref(), Some("nope"));
        Ok(())
    }

    #[test]
    fn invalid_transitions_carry_both_statuses() -> Result<()> {
        let (mut backend, _dir) = backend()?;
        let item = add_item(&mut backend, "Soup", "4.00");
        let ApiResponse::Order(order) = backend.handle(ApiRequest::SubmitOrder(SubmitOrderRequest {
            customer_name: None,
            customer_phone: None,
            table_number: None,
            order_type: shared::OrderType::Takeout,
            items: vec![OrderLineRequest {
                menu_item_id: item,
                quantity: 1,
                special_instructions: None,
            }],
        })) else {
            panic!("order submission failed");
        };

        let response = backend.handle(ApiRequest::UpdateOrderStatus {
            order_id: order.id,
            status: shared::OrderStatus::Completed,
        });
        let ApiResponse::Error(err) = response else {
            panic!("expected an error response");
        };
        assert_eq!(err.kind, ApiErrorKind::InvalidTransition);
        assert_eq!(err.from, Some(shared::OrderStatus::Pending));
        assert_eq!(err.to, Some(shared::OrderStatus::Completed));
        Ok(())
    }

    #[test]
    fn sales_data_reflects_completed_orders() -> Result<()> {
        let (mut backend, _dir) = backend()?;
        let item = add_item(&mut backend, "Burger", "10.00");
        let ApiResponse::Order(order) = backend.handle(ApiRequest::SubmitOrder(SubmitOrderRequest {
            customer_name: None,
            customer_phone: None,
            table_number: None,
            order_type: shared::OrderType::DineIn,
            items: vec![OrderLineRequest {
                menu_item_id: item,
                quantity: 1,
                special_instructions: None,
            }],
        })) else {
            panic!("order submission failed");
        };
        for status in [
            shared::OrderStatus::Preparing,
            shared::OrderStatus::Ready,
            shared::OrderStatus::Completed,
        ] {
            backend.handle(ApiRequest::UpdateOrderStatus {
                order_id: order.id.clone(),
                status,
            });
        }

        let response = backend.handle(ApiRequest::GetSalesData {
            period: SalesPeriod::Today,
        });
        let ApiResponse::SalesData(data) = response else {
            panic!("expected sales data");
        };
        assert_eq!(data.summary.order_count, 1);
        assert_eq!(data.summary.total_sales, Decimal::from_str("10.80").unwrap());
        assert_eq!(data.popular_items[0].name, "Burger");
        Ok(())
    }

    #[test]
    fn reporting_reads_the_persisted_table() -> Result<()> {
        use crate::config::default_tax_rate;
        use crate::domain::models::{MenuItem, Order, OrderType};

        let (mut backend, _dir) = backend()?;

        // Write a completed order straight to the store, bypassing the
        // queue's in-memory collection.
        let menu_item = MenuItem::new(
            "Gnocchi",
            "mains",
            Decimal::from_str("14.00").unwrap(),
            None,
            true,
        )?;
        let line = OrderItem::new(&menu_item, 1, None)?;
        let customer = Customer::new(Some("Rita"), None, None, OrderType::Takeout)?;
        let mut order = Order::new(customer, vec![line], default_tax_rate(), Utc::now())?;
        order.status = OrderStatus::Completed;
        backend.order_store.save(&[order])?;

        let response = backend.handle(ApiRequest::GetSalesData {
            period: SalesPeriod::Today,
        });
        let ApiResponse::SalesData(data) = response else {
            panic!("expected sales data");
        };
        assert_eq!(data.summary.order_count, 1);
        assert_eq!(data.popular_items[0].name, "Gnocchi");
        Ok(())
    }

    #[test]
    fn get_orders_honors_the_filter() -> Result<()> {
        let (mut backend, _dir) = backend()?;
        let item = add_item(&mut backend, "Tea", "2.00");
        for _ in 0..2 {
            backend.handle(ApiRequest::SubmitOrder(SubmitOrderRequest {
                customer_name: None,
                customer_phone: None,
                table_number: None,
                order_type: shared::OrderType::Takeout,
                items: vec![OrderLineRequest {
                    menu_item_id: item.clone(),
                    quantity: 1,
                    special_instructions: None,
                }],
            }));
        }

        let ApiResponse::Orders(active) = backend.handle(ApiRequest::GetOrders(OrderFilter::default()))
        else {
            panic!("expected orders");
        };
        assert_eq!(active.len(), 2);

        let ApiResponse::Orders(completed) = backend.handle(ApiRequest::GetOrders(OrderFilter {
            statuses: Some(vec![shared::OrderStatus::Completed]),
            all: false,
        })) else {
            panic!("expected orders");
        };
        assert!(completed.is_empty());
        Ok(())
    }
}

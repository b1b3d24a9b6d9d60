//! Conversions between domain models and the shared wire types.

use crate::domain::models::{Category, MenuItem, Order, OrderItem, OrderStatus, OrderType};

pub fn category_to_dto(category: Category) -> shared::MenuCategory {
    match category {
        Category::Appetizers => shared::MenuCategory::Appetizers,
        Category::Mains => shared::MenuCategory::Mains,
        Category::Desserts => shared::MenuCategory::Desserts,
        Category::Beverages => shared::MenuCategory::Beverages,
        Category::Salads => shared::MenuCategory::Salads,
        Category::Soups => shared::MenuCategory::Soups,
        Category::Sides => shared::MenuCategory::Sides,
        Category::Specials => shared::MenuCategory::Specials,
    }
}

pub fn status_to_dto(status: OrderStatus) -> shared::OrderStatus {
    match status {
        OrderStatus::Pending => shared::OrderStatus::Pending,
        OrderStatus::Preparing => shared::OrderStatus::Preparing,
        OrderStatus::Ready => shared::OrderStatus::Ready,
        OrderStatus::Completed => shared::OrderStatus::Completed,
        OrderStatus::Cancelled => shared::OrderStatus::Cancelled,
    }
}

pub fn status_from_dto(status: shared::OrderStatus) -> OrderStatus {
    match status {
        shared::OrderStatus::Pending => OrderStatus::Pending,
        shared::OrderStatus::Preparing => OrderStatus::Preparing,
        shared::OrderStatus::Ready => OrderStatus::Ready,
        shared::OrderStatus::Completed => OrderStatus::Completed,
        shared::OrderStatus::Cancelled => OrderStatus::Cancelled,
    }
}

pub fn order_type_to_dto(order_type: OrderType) -> shared::OrderType {
    match order_type {
        OrderType::DineIn => shared::OrderType::DineIn,
        OrderType::Takeout => shared::OrderType::Takeout,
        OrderType::Delivery => shared::OrderType::Delivery,
    }
}

pub fn order_type_from_dto(order_type: shared::OrderType) -> OrderType {
    match order_type {
        shared::OrderType::DineIn => OrderType::DineIn,
        shared::OrderType::Takeout => OrderType::Takeout,
        shared::OrderType::Delivery => OrderType::Delivery,
    }
}

pub fn menu_item_to_dto(item: &MenuItem) -> shared::MenuItem {
    shared::MenuItem {
        id: item.id.clone(),
        name: item.name.clone(),
        category: category_to_dto(item.category),
        price: item.price,
        description: item.description.clone(),
        is_available: item.is_available,
    }
}

fn order_item_to_dto(item: &OrderItem) -> shared::OrderItem {
    shared::OrderItem {
        menu_item_id: item.menu_item_id.clone(),
        name: item.name.clone(),
        unit_price: item.unit_price,
        quantity: item.quantity,
        special_instructions: item.special_instructions.clone(),
        line_total: item.line_total(),
    }
}

pub fn order_to_dto(order: &Order) -> shared::Order {
    shared::Order {
        id: order.id.clone(),
        created_at: order.created_at,
        customer_name: order.customer.name.clone(),
        customer_phone: order.customer.phone.clone(),
        table_number: order.customer.table_number.clone(),
        order_type: order_type_to_dto(order.customer.order_type),
        status: status_to_dto(order.status),
        priority: order.priority,
        notes: order.notes.clone(),
        items: order.items.iter().map(order_item_to_dto).collect(),
        subtotal: order.subtotal,
        tax: order.tax,
        total: order.total,
    }
}

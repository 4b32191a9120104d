//! Event payloads carried on the message bus

use crate::models::{Order, OrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Status (or assignment) change of an existing order
    OrderUpdate,
    /// A customer placed an order
    NewOrder,
    /// A delivery partner was bound to an order
    DeliveryAssignment,
    /// Free-form announcement to a role
    SystemNotification,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderUpdate => "ORDER_UPDATE",
            Self::NewOrder => "NEW_ORDER",
            Self::DeliveryAssignment => "DELIVERY_ASSIGNMENT",
            Self::SystemNotification => "SYSTEM_NOTIFICATION",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order event pushed to live channels
///
/// The optional fields are filled per event type:
/// - `NEW_ORDER`: customer name, restaurant name, total amount
/// - `DELIVERY_ASSIGNMENT`: restaurant name, delivery address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub order_id: i64,
    pub order_number: String,
    pub status: OrderStatus,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
}

impl OrderEvent {
    fn base(event_type: EventType, order: &Order, timestamp: i64) -> Self {
        Self {
            event_type,
            order_id: order.id,
            order_number: order.order_number.clone(),
            status: order.status,
            timestamp,
            customer_name: None,
            restaurant_name: None,
            total_amount: None,
            delivery_address: None,
        }
    }

    pub fn order_update(order: &Order, timestamp: i64) -> Self {
        Self::base(EventType::OrderUpdate, order, timestamp)
    }

    pub fn new_order(
        order: &Order,
        customer_name: impl Into<String>,
        restaurant_name: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            customer_name: Some(customer_name.into()),
            restaurant_name: Some(restaurant_name.into()),
            total_amount: Some(order.total_amount),
            ..Self::base(EventType::NewOrder, order, timestamp)
        }
    }

    pub fn delivery_assignment(
        order: &Order,
        restaurant_name: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            restaurant_name: Some(restaurant_name.into()),
            delivery_address: Some(order.delivery_address.clone()),
            ..Self::base(EventType::DeliveryAssignment, order, timestamp)
        }
    }
}

/// Role-wide announcement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub message: String,
    pub timestamp: i64,
}

impl SystemEvent {
    pub fn new(message: impl Into<String>, timestamp: i64) -> Self {
        Self {
            event_type: EventType::SystemNotification,
            message: message.into(),
            timestamp,
        }
    }
}

/// Anything that can be published
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BusPayload {
    Order(OrderEvent),
    System(SystemEvent),
}

impl BusPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Order(e) => e.event_type,
            Self::System(e) => e.event_type,
        }
    }

    pub fn order_id(&self) -> Option<i64> {
        match self {
            Self::Order(e) => Some(e.order_id),
            Self::System(_) => None,
        }
    }
}

impl From<OrderEvent> for BusPayload {
    fn from(event: OrderEvent) -> Self {
        Self::Order(event)
    }
}

impl From<SystemEvent> for BusPayload {
    fn from(event: SystemEvent) -> Self {
        Self::System(event)
    }
}

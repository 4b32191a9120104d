//! Order Model
//!
//! The order aggregate: the order row, its line items and its append-only
//! status history.

use super::ParseEnumError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Order lifecycle status
///
/// ```text
/// PLACED → CONFIRMED → PREPARING → READY_FOR_PICKUP → PICKED_UP → OUT_FOR_DELIVERY → DELIVERED
///    ↓          ↓           ↓
/// CANCELLED ◄───┴───────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    Placed,
    Confirmed,
    Preparing,
    ReadyForPickup,
    PickedUp,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        Self::Placed,
        Self::Confirmed,
        Self::Preparing,
        Self::ReadyForPickup,
        Self::PickedUp,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "PLACED",
            Self::Confirmed => "CONFIRMED",
            Self::Preparing => "PREPARING",
            Self::ReadyForPickup => "READY_FOR_PICKUP",
            Self::PickedUp => "PICKED_UP",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// DELIVERED and CANCELLED accept no further changes
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("status", s))
    }
}

/// Who performed a status change or cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ActorTag {
    System,
    Customer,
    Restaurant,
    DeliveryPartner,
    Admin,
}

impl ActorTag {
    pub const ALL: [ActorTag; 5] = [
        Self::System,
        Self::Customer,
        Self::Restaurant,
        Self::DeliveryPartner,
        Self::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::Customer => "CUSTOMER",
            Self::Restaurant => "RESTAURANT",
            Self::DeliveryPartner => "DELIVERY_PARTNER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for ActorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorTag {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("actor", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentMethod {
    CashOnDelivery,
    Card,
    Upi,
    Wallet,
    NetBanking,
}

/// Payment status placeholder; no gateway is integrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// A chosen customization option on an order line (size, add-on, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCustomization {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub additional_price: Decimal,
}

/// Order line item with a price snapshot taken at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub customizations: Vec<ItemCustomization>,
}

/// One audit entry per status change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderStatusHistory {
    pub id: i64,
    pub order_id: i64,
    pub status: OrderStatus,
    pub changed_by: ActorTag,
    pub remarks: Option<String>,
    pub timestamp: i64,
}

/// Order aggregate root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub customer_id: i64,
    pub restaurant_id: i64,
    pub delivery_partner_id: Option<i64>,

    // === Delivery ===
    pub delivery_address: String,
    pub delivery_latitude: Option<f64>,
    pub delivery_longitude: Option<f64>,
    pub delivery_instructions: Option<String>,
    pub special_instructions: Option<String>,

    // === Amounts ===
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub platform_fee: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,

    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub promo_code: Option<String>,
    pub loyalty_points_used: i64,
    pub loyalty_points_earned: i64,
    pub delivery_otp: String,

    // === Timeline (epoch millis) ===
    pub estimated_delivery_time: Option<i64>,
    pub actual_delivery_time: Option<i64>,
    pub cooking_started_at: Option<i64>,
    pub ready_for_pickup_at: Option<i64>,
    pub picked_up_at: Option<i64>,
    pub out_for_delivery_at: Option<i64>,
    pub delivered_at: Option<i64>,
    pub cancelled_at: Option<i64>,

    // === Cancellation ===
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<ActorTag>,

    /// Optimistic concurrency counter, bumped on every mutation
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,

    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub status_history: Vec<OrderStatusHistory>,
}

/// Requested order line
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub menu_item_id: i64,
    pub quantity: i32,
    #[validate(length(max = 500))]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub customizations: Vec<ItemCustomization>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_id: i64,
    pub restaurant_id: i64,
    #[validate(length(min = 1, message = "order must contain at least one item"), nested)]
    pub items: Vec<OrderItemRequest>,
    #[validate(length(min = 1, max = 500))]
    pub delivery_address: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub delivery_latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub delivery_longitude: Option<f64>,
    #[validate(length(max = 500))]
    pub delivery_instructions: Option<String>,
    #[validate(length(max = 500))]
    pub special_instructions: Option<String>,
    pub payment_method: PaymentMethod,
    #[validate(length(max = 64))]
    pub promo_code: Option<String>,
}

//! Actor Directory Models (customers, delivery partners, roles)

use super::ParseEnumError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform role of an authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Customer,
    Vendor,
    DeliveryPartner,
    Admin,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        Self::Customer,
        Self::Vendor,
        Self::DeliveryPartner,
        Self::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Vendor => "VENDOR",
            Self::DeliveryPartner => "DELIVERY_PARTNER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("role", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PartnerApprovalStatus {
    #[default]
    PendingApproval,
    Approved,
    Rejected,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum AvailabilityStatus {
    Online,
    #[default]
    Offline,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub loyalty_points: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DeliveryPartner {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub status: PartnerApprovalStatus,
    pub availability_status: AvailabilityStatus,
    pub is_available_for_orders: bool,
    pub current_latitude: Option<f64>,
    pub current_longitude: Option<f64>,
    pub max_concurrent_orders: i32,
    pub current_order_count: i32,
    pub created_at: i64,
}

impl DeliveryPartner {
    /// Approved, online, taking orders and under the concurrent order limit
    pub fn can_take_orders(&self) -> bool {
        self.status == PartnerApprovalStatus::Approved
            && self.availability_status == AvailabilityStatus::Online
            && self.is_available_for_orders
            && self.current_order_count < self.max_concurrent_orders
    }
}

/// Delivery partner found by a radius query, with the distance to the query point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyPartner {
    #[serde(flatten)]
    pub partner: DeliveryPartner,
    pub distance_meters: f64,
}

/// Seed payload for a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreate {
    pub user_id: i64,
    pub name: String,
    pub phone: Option<String>,
}

/// Seed payload for a delivery partner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPartnerCreate {
    pub user_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub status: Option<PartnerApprovalStatus>,
    pub availability_status: Option<AvailabilityStatus>,
    pub is_available_for_orders: Option<bool>,
    pub current_latitude: Option<f64>,
    pub current_longitude: Option<f64>,
    pub max_concurrent_orders: Option<i32>,
}

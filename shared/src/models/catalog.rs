//! Catalog Models (restaurants and menu items)
//!
//! Read-mostly reference data consumed by the order engine. Only the fields
//! the engine needs are modelled; catalog CRUD lives elsewhere.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default delivery window upper bound (minutes)
pub const DEFAULT_DELIVERY_TIME_MAX: i32 = 45;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: i64,
    /// Vendor user who owns the restaurant (notification audience)
    pub vendor_user_id: i64,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Flat delivery fee, zero when unset
    pub delivery_fee: Decimal,
    pub delivery_time_max: i32,
    pub is_accepting_orders: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub price: Decimal,
    pub discounted_price: Option<Decimal>,
    pub is_available: bool,
    pub is_active: bool,
    /// Lifetime ordered quantity
    pub total_orders: i64,
    pub created_at: i64,
}

impl MenuItem {
    /// Price charged per unit: discounted price when present, list price otherwise
    pub fn effective_price(&self) -> Decimal {
        self.discounted_price.unwrap_or(self.price)
    }

    pub fn is_orderable(&self) -> bool {
        self.is_available && self.is_active
    }
}

/// Seed payload for a restaurant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantCreate {
    pub vendor_user_id: i64,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub delivery_fee: Option<Decimal>,
    pub delivery_time_max: Option<i32>,
    pub is_accepting_orders: Option<bool>,
}

/// Seed payload for a menu item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemCreate {
    pub restaurant_id: i64,
    pub name: String,
    pub price: Decimal,
    pub discounted_price: Option<Decimal>,
    pub is_available: Option<bool>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: &str, discounted: Option<&str>) -> MenuItem {
        MenuItem {
            id: 1,
            restaurant_id: 1,
            name: "Paneer Tikka".into(),
            price: price.parse().unwrap(),
            discounted_price: discounted.map(|d| d.parse().unwrap()),
            is_available: true,
            is_active: true,
            total_orders: 0,
            created_at: 0,
        }
    }

    #[test]
    fn test_effective_price_prefers_discount() {
        assert_eq!(item("100.00", None).effective_price(), Decimal::new(10000, 2));
        assert_eq!(
            item("100.00", Some("80.00")).effective_price(),
            Decimal::new(8000, 2)
        );
    }

    #[test]
    fn test_orderable_requires_available_and_active() {
        let mut m = item("10.00", None);
        assert!(m.is_orderable());
        m.is_active = false;
        assert!(!m.is_orderable());
        m.is_active = true;
        m.is_available = false;
        assert!(!m.is_orderable());
    }
}

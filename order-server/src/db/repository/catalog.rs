//! Catalog Repository (restaurants, menu items)

use super::{RepoResult, cents_to_decimal, decimal_to_cents};
use shared::models::{
    DEFAULT_DELIVERY_TIME_MAX, MenuItem, MenuItemCreate, Restaurant, RestaurantCreate,
};
use sqlx::SqliteConnection;

const RESTAURANT_SELECT: &str = "SELECT id, vendor_user_id, name, address, latitude, longitude, delivery_fee_cents, delivery_time_max, is_accepting_orders, created_at FROM restaurant";
const MENU_ITEM_SELECT: &str = "SELECT id, restaurant_id, name, price_cents, discounted_price_cents, is_available, is_active, total_orders, created_at FROM menu_item";

#[derive(sqlx::FromRow)]
struct RestaurantRow {
    id: i64,
    vendor_user_id: i64,
    name: String,
    address: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    delivery_fee_cents: i64,
    delivery_time_max: i32,
    is_accepting_orders: bool,
    created_at: i64,
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        Self {
            id: row.id,
            vendor_user_id: row.vendor_user_id,
            name: row.name,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            delivery_fee: cents_to_decimal(row.delivery_fee_cents),
            delivery_time_max: row.delivery_time_max,
            is_accepting_orders: row.is_accepting_orders,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MenuItemRow {
    id: i64,
    restaurant_id: i64,
    name: String,
    price_cents: i64,
    discounted_price_cents: Option<i64>,
    is_available: bool,
    is_active: bool,
    total_orders: i64,
    created_at: i64,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        Self {
            id: row.id,
            restaurant_id: row.restaurant_id,
            name: row.name,
            price: cents_to_decimal(row.price_cents),
            discounted_price: row.discounted_price_cents.map(cents_to_decimal),
            is_available: row.is_available,
            is_active: row.is_active,
            total_orders: row.total_orders,
            created_at: row.created_at,
        }
    }
}

pub async fn find_restaurant(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Restaurant>> {
    let row = sqlx::query_as::<_, RestaurantRow>(&format!("{RESTAURANT_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(Restaurant::from))
}

pub async fn create_restaurant(
    conn: &mut SqliteConnection,
    data: RestaurantCreate,
) -> RepoResult<Restaurant> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let delivery_fee_cents = decimal_to_cents(data.delivery_fee.unwrap_or_default())?;
    sqlx::query(
        "INSERT INTO restaurant (id, vendor_user_id, name, address, latitude, longitude, delivery_fee_cents, delivery_time_max, is_accepting_orders, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.vendor_user_id)
    .bind(&data.name)
    .bind(&data.address)
    .bind(data.latitude)
    .bind(data.longitude)
    .bind(delivery_fee_cents)
    .bind(data.delivery_time_max.unwrap_or(DEFAULT_DELIVERY_TIME_MAX))
    .bind(data.is_accepting_orders.unwrap_or(true))
    .bind(now)
    .execute(&mut *conn)
    .await?;

    find_restaurant(conn, id)
        .await?
        .ok_or_else(|| super::RepoError::Database("Failed to create restaurant".into()))
}

pub async fn find_menu_item(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<MenuItem>> {
    let row = sqlx::query_as::<_, MenuItemRow>(&format!("{MENU_ITEM_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(MenuItem::from))
}

pub async fn create_menu_item(
    conn: &mut SqliteConnection,
    data: MenuItemCreate,
) -> RepoResult<MenuItem> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let price_cents = decimal_to_cents(data.price)?;
    let discounted_cents = data.discounted_price.map(decimal_to_cents).transpose()?;
    sqlx::query(
        "INSERT INTO menu_item (id, restaurant_id, name, price_cents, discounted_price_cents, is_available, is_active, total_orders, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(id)
    .bind(data.restaurant_id)
    .bind(&data.name)
    .bind(price_cents)
    .bind(discounted_cents)
    .bind(data.is_available.unwrap_or(true))
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .execute(&mut *conn)
    .await?;

    find_menu_item(conn, id)
        .await?
        .ok_or_else(|| super::RepoError::Database("Failed to create menu item".into()))
}

/// Atomic `total_orders += quantity`
pub async fn increment_total_orders(
    conn: &mut SqliteConnection,
    menu_item_id: i64,
    quantity: i32,
) -> RepoResult<()> {
    sqlx::query("UPDATE menu_item SET total_orders = total_orders + ? WHERE id = ?")
        .bind(i64::from(quantity))
        .bind(menu_item_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn set_menu_item_availability(
    conn: &mut SqliteConnection,
    menu_item_id: i64,
    is_available: bool,
    is_active: bool,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE menu_item SET is_available = ?, is_active = ? WHERE id = ?")
        .bind(is_available)
        .bind(is_active)
        .bind(menu_item_id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(super::RepoError::NotFound(format!(
            "Menu item {menu_item_id} not found"
        )));
    }
    Ok(())
}

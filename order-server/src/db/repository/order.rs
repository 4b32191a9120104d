//! Order Repository
//!
//! The order aggregate is loaded and saved as one unit: the `orders` row,
//! its `order_item` rows and its `order_status_history` rows. There is no
//! ORM cascade; every child write is an explicit call here.

use super::{RepoError, RepoResult, cents_to_decimal, decimal_to_cents};
use shared::models::{
    ActorTag, ItemCustomization, Order, OrderItem, OrderStatus, OrderStatusHistory,
    PaymentMethod, PaymentStatus,
};
use sqlx::SqliteConnection;

const ORDER_SELECT: &str = "SELECT id, order_number, customer_id, restaurant_id, delivery_partner_id, delivery_address, delivery_latitude, delivery_longitude, delivery_instructions, special_instructions, subtotal_cents, delivery_fee_cents, platform_fee_cents, tax_cents, discount_cents, total_cents, status, payment_method, payment_status, promo_code, loyalty_points_used, loyalty_points_earned, delivery_otp, estimated_delivery_time, actual_delivery_time, cooking_started_at, ready_for_pickup_at, picked_up_at, out_for_delivery_at, delivered_at, cancelled_at, cancellation_reason, cancelled_by, version, created_at, updated_at FROM orders";

const ITEM_SELECT: &str = "SELECT id, order_id, menu_item_id, menu_item_name, quantity, unit_price_cents, total_price_cents, special_instructions, customizations FROM order_item";

const HISTORY_SELECT: &str =
    "SELECT id, order_id, status, changed_by, remarks, timestamp FROM order_status_history";

/// Statuses that still wait on the restaurant
const PENDING_STATUSES: [OrderStatus; 3] = [
    OrderStatus::Placed,
    OrderStatus::Confirmed,
    OrderStatus::Preparing,
];

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    customer_id: i64,
    restaurant_id: i64,
    delivery_partner_id: Option<i64>,
    delivery_address: String,
    delivery_latitude: Option<f64>,
    delivery_longitude: Option<f64>,
    delivery_instructions: Option<String>,
    special_instructions: Option<String>,
    subtotal_cents: i64,
    delivery_fee_cents: i64,
    platform_fee_cents: i64,
    tax_cents: i64,
    discount_cents: i64,
    total_cents: i64,
    status: OrderStatus,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    promo_code: Option<String>,
    loyalty_points_used: i64,
    loyalty_points_earned: i64,
    delivery_otp: String,
    estimated_delivery_time: Option<i64>,
    actual_delivery_time: Option<i64>,
    cooking_started_at: Option<i64>,
    ready_for_pickup_at: Option<i64>,
    picked_up_at: Option<i64>,
    out_for_delivery_at: Option<i64>,
    delivered_at: Option<i64>,
    cancelled_at: Option<i64>,
    cancellation_reason: Option<String>,
    cancelled_by: Option<ActorTag>,
    version: i64,
    created_at: i64,
    updated_at: i64,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>, status_history: Vec<OrderStatusHistory>) -> Order {
        Order {
            id: self.id,
            order_number: self.order_number,
            customer_id: self.customer_id,
            restaurant_id: self.restaurant_id,
            delivery_partner_id: self.delivery_partner_id,
            delivery_address: self.delivery_address,
            delivery_latitude: self.delivery_latitude,
            delivery_longitude: self.delivery_longitude,
            delivery_instructions: self.delivery_instructions,
            special_instructions: self.special_instructions,
            subtotal: cents_to_decimal(self.subtotal_cents),
            delivery_fee: cents_to_decimal(self.delivery_fee_cents),
            platform_fee: cents_to_decimal(self.platform_fee_cents),
            tax_amount: cents_to_decimal(self.tax_cents),
            discount_amount: cents_to_decimal(self.discount_cents),
            total_amount: cents_to_decimal(self.total_cents),
            status: self.status,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            promo_code: self.promo_code,
            loyalty_points_used: self.loyalty_points_used,
            loyalty_points_earned: self.loyalty_points_earned,
            delivery_otp: self.delivery_otp,
            estimated_delivery_time: self.estimated_delivery_time,
            actual_delivery_time: self.actual_delivery_time,
            cooking_started_at: self.cooking_started_at,
            ready_for_pickup_at: self.ready_for_pickup_at,
            picked_up_at: self.picked_up_at,
            out_for_delivery_at: self.out_for_delivery_at,
            delivered_at: self.delivered_at,
            cancelled_at: self.cancelled_at,
            cancellation_reason: self.cancellation_reason,
            cancelled_by: self.cancelled_by,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
            status_history,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    order_id: i64,
    menu_item_id: i64,
    menu_item_name: String,
    quantity: i32,
    unit_price_cents: i64,
    total_price_cents: i64,
    special_instructions: Option<String>,
    customizations: String,
}

impl TryFrom<ItemRow> for OrderItem {
    type Error = RepoError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let customizations: Vec<ItemCustomization> = serde_json::from_str(&row.customizations)?;
        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            menu_item_id: row.menu_item_id,
            menu_item_name: row.menu_item_name,
            quantity: row.quantity,
            unit_price: cents_to_decimal(row.unit_price_cents),
            total_price: cents_to_decimal(row.total_price_cents),
            special_instructions: row.special_instructions,
            customizations,
        })
    }
}

// =============================================================================
// Aggregate load
// =============================================================================

async fn find_items(conn: &mut SqliteConnection, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let rows = sqlx::query_as::<_, ItemRow>(&format!("{ITEM_SELECT} WHERE order_id = ? ORDER BY rowid"))
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;
    rows.into_iter().map(OrderItem::try_from).collect()
}

pub async fn find_history(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> RepoResult<Vec<OrderStatusHistory>> {
    let history = sqlx::query_as::<_, OrderStatusHistory>(&format!(
        "{HISTORY_SELECT} WHERE order_id = ? ORDER BY timestamp, rowid"
    ))
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(history)
}

async fn hydrate(conn: &mut SqliteConnection, row: OrderRow) -> RepoResult<Order> {
    let items = find_items(conn, row.id).await?;
    let history = find_history(conn, row.id).await?;
    Ok(row.into_order(items, history))
}

async fn hydrate_all(conn: &mut SqliteConnection, rows: Vec<OrderRow>) -> RepoResult<Vec<Order>> {
    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        orders.push(hydrate(conn, row).await?);
    }
    Ok(orders)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match row {
        Some(row) => Ok(Some(hydrate(conn, row).await?)),
        None => Ok(None),
    }
}

pub async fn find_by_number(
    conn: &mut SqliteConnection,
    order_number: &str,
) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE order_number = ?"))
        .bind(order_number)
        .fetch_optional(&mut *conn)
        .await?;
    match row {
        Some(row) => Ok(Some(hydrate(conn, row).await?)),
        None => Ok(None),
    }
}

pub async fn number_exists(conn: &mut SqliteConnection, order_number: &str) -> RepoResult<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE order_number = ?)")
            .bind(order_number)
            .fetch_one(&mut *conn)
            .await?;
    Ok(exists)
}

// =============================================================================
// Writes
// =============================================================================

/// Insert the order row and its items (history is written separately)
pub async fn insert(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, order_number, customer_id, restaurant_id, delivery_partner_id, delivery_address, delivery_latitude, delivery_longitude, delivery_instructions, special_instructions, subtotal_cents, delivery_fee_cents, platform_fee_cents, tax_cents, discount_cents, total_cents, status, payment_method, payment_status, promo_code, loyalty_points_used, loyalty_points_earned, delivery_otp, estimated_delivery_time, actual_delivery_time, cooking_started_at, ready_for_pickup_at, picked_up_at, out_for_delivery_at, delivered_at, cancelled_at, cancellation_reason, cancelled_by, version, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order.id)
    .bind(&order.order_number)
    .bind(order.customer_id)
    .bind(order.restaurant_id)
    .bind(order.delivery_partner_id)
    .bind(&order.delivery_address)
    .bind(order.delivery_latitude)
    .bind(order.delivery_longitude)
    .bind(&order.delivery_instructions)
    .bind(&order.special_instructions)
    .bind(decimal_to_cents(order.subtotal)?)
    .bind(decimal_to_cents(order.delivery_fee)?)
    .bind(decimal_to_cents(order.platform_fee)?)
    .bind(decimal_to_cents(order.tax_amount)?)
    .bind(decimal_to_cents(order.discount_amount)?)
    .bind(decimal_to_cents(order.total_amount)?)
    .bind(order.status)
    .bind(order.payment_method)
    .bind(order.payment_status)
    .bind(&order.promo_code)
    .bind(order.loyalty_points_used)
    .bind(order.loyalty_points_earned)
    .bind(&order.delivery_otp)
    .bind(order.estimated_delivery_time)
    .bind(order.actual_delivery_time)
    .bind(order.cooking_started_at)
    .bind(order.ready_for_pickup_at)
    .bind(order.picked_up_at)
    .bind(order.out_for_delivery_at)
    .bind(order.delivered_at)
    .bind(order.cancelled_at)
    .bind(&order.cancellation_reason)
    .bind(order.cancelled_by)
    .bind(order.version)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    for item in &order.items {
        sqlx::query(
            "INSERT INTO order_item (id, order_id, menu_item_id, menu_item_name, quantity, unit_price_cents, total_price_cents, special_instructions, customizations) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(item.id)
        .bind(order.id)
        .bind(item.menu_item_id)
        .bind(&item.menu_item_name)
        .bind(item.quantity)
        .bind(decimal_to_cents(item.unit_price)?)
        .bind(decimal_to_cents(item.total_price)?)
        .bind(&item.special_instructions)
        .bind(serde_json::to_string(&item.customizations)?)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn insert_history(
    conn: &mut SqliteConnection,
    entry: &OrderStatusHistory,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO order_status_history (id, order_id, status, changed_by, remarks, timestamp) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(entry.id)
    .bind(entry.order_id)
    .bind(entry.status)
    .bind(entry.changed_by)
    .bind(&entry.remarks)
    .bind(entry.timestamp)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn last_history_timestamp(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> RepoResult<Option<i64>> {
    let ts: Option<i64> =
        sqlx::query_scalar("SELECT MAX(timestamp) FROM order_status_history WHERE order_id = ?")
            .bind(order_id)
            .fetch_one(&mut *conn)
            .await?;
    Ok(ts)
}

/// Compare-and-swap write of the mutable order columns
///
/// Succeeds only while the stored version still equals `expected_version`;
/// the stored version becomes `expected_version + 1`. Returns `false` when
/// another writer got there first.
pub async fn update_versioned(
    conn: &mut SqliteConnection,
    order: &Order,
    expected_version: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE orders SET status = ?, delivery_partner_id = ?, cooking_started_at = ?, ready_for_pickup_at = ?, picked_up_at = ?, out_for_delivery_at = ?, delivered_at = ?, actual_delivery_time = ?, cancelled_at = ?, cancellation_reason = ?, cancelled_by = ?, payment_status = ?, updated_at = ?, version = version + 1 WHERE id = ? AND version = ?",
    )
    .bind(order.status)
    .bind(order.delivery_partner_id)
    .bind(order.cooking_started_at)
    .bind(order.ready_for_pickup_at)
    .bind(order.picked_up_at)
    .bind(order.out_for_delivery_at)
    .bind(order.delivered_at)
    .bind(order.actual_delivery_time)
    .bind(order.cancelled_at)
    .bind(&order.cancellation_reason)
    .bind(order.cancelled_by)
    .bind(order.payment_status)
    .bind(order.updated_at)
    .bind(order.id)
    .bind(expected_version)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Projections
// =============================================================================

pub async fn find_by_customer(
    conn: &mut SqliteConnection,
    customer_id: i64,
) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} WHERE customer_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await?;
    hydrate_all(conn, rows).await
}

pub async fn find_by_restaurant(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} WHERE restaurant_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(restaurant_id)
    .fetch_all(&mut *conn)
    .await?;
    hydrate_all(conn, rows).await
}

pub async fn find_by_partner(
    conn: &mut SqliteConnection,
    partner_id: i64,
) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} WHERE delivery_partner_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(partner_id)
    .fetch_all(&mut *conn)
    .await?;
    hydrate_all(conn, rows).await
}

/// PLACED / CONFIRMED / PREPARING, oldest first
pub async fn find_pending(conn: &mut SqliteConnection) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} WHERE status IN (?, ?, ?) ORDER BY created_at ASC, id ASC"
    ))
    .bind(PENDING_STATUSES[0])
    .bind(PENDING_STATUSES[1])
    .bind(PENDING_STATUSES[2])
    .fetch_all(&mut *conn)
    .await?;
    hydrate_all(conn, rows).await
}

/// READY_FOR_PICKUP without a partner, oldest first
pub async fn find_ready_unassigned(conn: &mut SqliteConnection) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} WHERE status = ? AND delivery_partner_id IS NULL ORDER BY created_at ASC, id ASC"
    ))
    .bind(OrderStatus::ReadyForPickup)
    .fetch_all(&mut *conn)
    .await?;
    hydrate_all(conn, rows).await
}

pub async fn find_by_status(
    conn: &mut SqliteConnection,
    status: OrderStatus,
) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} WHERE status = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(status)
    .fetch_all(&mut *conn)
    .await?;
    hydrate_all(conn, rows).await
}

pub async fn count_by_status(conn: &mut SqliteConnection, status: OrderStatus) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = ?")
        .bind(status)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

/// Newest first page
pub async fn find_all(
    conn: &mut SqliteConnection,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut *conn)
    .await?;
    hydrate_all(conn, rows).await
}

/// Orders created in `[start, end)`, newest first
pub async fn find_created_between(
    conn: &mut SqliteConnection,
    start: i64,
    end: i64,
) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} WHERE created_at >= ? AND created_at < ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(start)
    .bind(end)
    .fetch_all(&mut *conn)
    .await?;
    hydrate_all(conn, rows).await
}

/// Sum of `total_cents` over non-cancelled orders created in `[start, end)`
pub async fn revenue_cents_between(
    conn: &mut SqliteConnection,
    start: i64,
    end: i64,
) -> RepoResult<i64> {
    let cents: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total_cents), 0) FROM orders WHERE created_at >= ? AND created_at < ? AND status != ?",
    )
    .bind(start)
    .bind(end)
    .bind(OrderStatus::Cancelled)
    .fetch_one(&mut *conn)
    .await?;
    Ok(cents)
}

//! OrdersManager - order creation, lifecycle transitions and projections
//!
//! # Mutation Flow
//!
//! ```text
//! update_status(order_id, status)
//!     ├─ 1. Per-order lock
//!     ├─ 2. Begin transaction
//!     ├─ 3. Load aggregate, check the transition table
//!     ├─ 4. Stamp stage timestamp, versioned UPDATE (0 rows → conflict)
//!     ├─ 5. Append history row (strictly increasing timestamp)
//!     ├─ 6. Resolve audience, write inbox record
//!     ├─ 7. Commit
//!     └─ 8. Spawn live fan-out (never fails the caller)
//! ```
//!
//! The database work of one mutation never reaches for a second pooled
//! connection, and the spawned fan-out never touches the database.

mod error;
pub use error::*;

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::models::{
    ActorTag, CreateOrderRequest, MenuItem, Order, OrderItem, OrderStatus, OrderStatusHistory,
    PaymentStatus,
};
use shared::util::{generate_order_number, generate_otp, now_millis, snowflake_id, utc_day_bounds};
use sqlx::SqliteConnection;
use validator::Validate;

use super::locks::OrderLocks;
use super::transitions;
use crate::db::DbService;
use crate::db::repository::{actor, catalog, cents_to_decimal, notification, order as order_repo};
use crate::notifications::{NotificationDispatcher, OrderAudience, inbox};
use crate::pricing::{
    DiscountContext, DiscountPolicy, NoDiscount, OrderAmounts, PricingRates, price_items,
};

/// Order number allocation attempts before giving up
const MAX_ORDER_NUMBER_ATTEMPTS: usize = 5;

const PLACED_REMARKS: &str = "Order placed by customer";

/// Reason recorded when a status update to CANCELLED carries no remarks
const DEFAULT_CANCEL_REASON: &str = "Cancelled";

const MINUTE_MS: i64 = 60_000;

/// Largest page `list_orders` returns
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct OrdersManager {
    db: DbService,
    dispatcher: NotificationDispatcher,
    rates: PricingRates,
    discounts: Arc<dyn DiscountPolicy>,
    locks: OrderLocks,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("rates", &self.rates)
            .field("discounts", &"<dyn DiscountPolicy>")
            .field("locked_orders", &self.locks.len())
            .finish()
    }
}

impl OrdersManager {
    pub fn new(db: DbService, dispatcher: NotificationDispatcher) -> Self {
        Self {
            db,
            dispatcher,
            rates: PricingRates::default(),
            discounts: Arc::new(NoDiscount),
            locks: OrderLocks::new(),
        }
    }

    pub fn with_rates(mut self, rates: PricingRates) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_discount_policy(mut self, policy: Arc<dyn DiscountPolicy>) -> Self {
        self.discounts = policy;
        self
    }

    pub fn rates(&self) -> PricingRates {
        self.rates
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Validate, price and persist a new order
    ///
    /// Order row, items, menu item counters, the PLACED history row and the
    /// vendor inbox record commit together or not at all.
    pub async fn create_order(&self, req: CreateOrderRequest) -> ManagerResult<Order> {
        let mut tx = self.db.begin_write().await?;

        let customer = actor::find_customer(&mut *tx, req.customer_id)
            .await?
            .ok_or(ManagerError::CustomerNotFound(req.customer_id))?;
        let restaurant = catalog::find_restaurant(&mut *tx, req.restaurant_id)
            .await?
            .ok_or(ManagerError::RestaurantNotFound(req.restaurant_id))?;
        if !restaurant.is_accepting_orders {
            return Err(ManagerError::RestaurantNotAccepting(restaurant.id));
        }
        if req.items.is_empty() {
            return Err(ManagerError::EmptyOrder);
        }

        let mut menu_items: Vec<MenuItem> = Vec::with_capacity(req.items.len());
        for (index, line) in req.items.iter().enumerate() {
            if line.quantity <= 0 {
                return Err(ManagerError::InvalidQuantity {
                    index,
                    quantity: line.quantity,
                });
            }
            let item = catalog::find_menu_item(&mut *tx, line.menu_item_id)
                .await?
                .ok_or(ManagerError::MenuItemNotFound(line.menu_item_id))?;
            if item.restaurant_id != restaurant.id {
                return Err(ManagerError::MenuItemRestaurantMismatch {
                    menu_item_id: item.id,
                    restaurant_id: restaurant.id,
                });
            }
            if !item.is_orderable() {
                return Err(ManagerError::MenuItemUnavailable {
                    menu_item_id: item.id,
                    name: item.name,
                });
            }
            menu_items.push(item);
        }
        req.validate()?;

        // Pricing
        let (lines, subtotal) = price_items(
            menu_items
                .iter()
                .zip(&req.items)
                .map(|(item, line)| (item, line.quantity)),
        );
        let discount = self.discounts.discount(&DiscountContext {
            customer_id: customer.id,
            restaurant_id: restaurant.id,
            subtotal,
            promo_code: req.promo_code.as_deref(),
        });
        let amounts = OrderAmounts::compute(subtotal, restaurant.delivery_fee, discount, &self.rates);

        let now = now_millis();
        let order_number = allocate_order_number(&mut tx, now).await?;
        let order_id = snowflake_id();

        let items: Vec<OrderItem> = lines
            .into_iter()
            .zip(&req.items)
            .map(|(line, requested)| OrderItem {
                id: snowflake_id(),
                order_id,
                menu_item_id: line.menu_item_id,
                menu_item_name: line.menu_item_name,
                quantity: line.quantity,
                unit_price: line.unit_price,
                total_price: line.total_price,
                special_instructions: requested.special_instructions.clone(),
                customizations: requested.customizations.clone(),
            })
            .collect();

        let order = Order {
            id: order_id,
            order_number,
            customer_id: customer.id,
            restaurant_id: restaurant.id,
            delivery_partner_id: None,
            delivery_address: req.delivery_address.clone(),
            delivery_latitude: req.delivery_latitude,
            delivery_longitude: req.delivery_longitude,
            delivery_instructions: req.delivery_instructions.clone(),
            special_instructions: req.special_instructions.clone(),
            subtotal: amounts.subtotal,
            delivery_fee: amounts.delivery_fee,
            platform_fee: amounts.platform_fee,
            tax_amount: amounts.tax_amount,
            discount_amount: amounts.discount_amount,
            total_amount: amounts.total_amount,
            status: OrderStatus::Placed,
            payment_method: req.payment_method,
            payment_status: PaymentStatus::Pending,
            promo_code: req.promo_code.clone(),
            loyalty_points_used: 0,
            loyalty_points_earned: 0,
            delivery_otp: generate_otp(),
            estimated_delivery_time: Some(now + i64::from(restaurant.delivery_time_max) * MINUTE_MS),
            actual_delivery_time: None,
            cooking_started_at: None,
            ready_for_pickup_at: None,
            picked_up_at: None,
            out_for_delivery_at: None,
            delivered_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            cancelled_by: None,
            version: 0,
            created_at: now,
            updated_at: now,
            items,
            status_history: Vec::new(),
        };

        order_repo::insert(&mut *tx, &order).await?;
        for item in &order.items {
            catalog::increment_total_orders(&mut *tx, item.menu_item_id, item.quantity).await?;
        }
        order_repo::insert_history(
            &mut *tx,
            &OrderStatusHistory {
                id: snowflake_id(),
                order_id,
                status: OrderStatus::Placed,
                changed_by: ActorTag::System,
                remarks: Some(PLACED_REMARKS.to_string()),
                timestamp: now,
            },
        )
        .await?;
        notification::create(
            &mut *tx,
            inbox::new_order_notice(&order, restaurant.vendor_user_id),
        )
        .await?;

        let order = load(&mut tx, order_id).await?;
        tx.commit().await?;

        tracing::info!(
            order_id,
            order_number = %order.order_number,
            customer_id = customer.id,
            restaurant_id = restaurant.id,
            total = %order.total_amount,
            "Order created"
        );

        let audience = OrderAudience {
            customer_user_id: customer.user_id,
            vendor_user_id: restaurant.vendor_user_id,
            partner_user_id: None,
            customer_name: customer.name,
            restaurant_name: restaurant.name,
        };
        self.dispatcher.spawn_new_order(order.clone(), audience);
        Ok(order)
    }

    /// Move an order one step along the lifecycle
    ///
    /// A target of CANCELLED goes through [`Self::cancel_order`] with the
    /// remarks as reason.
    pub async fn update_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
        remarks: Option<String>,
        actor: ActorTag,
    ) -> ManagerResult<Order> {
        let remarks = remarks.filter(|r| !r.trim().is_empty());
        if new_status == OrderStatus::Cancelled {
            let reason = remarks.unwrap_or_else(|| DEFAULT_CANCEL_REASON.to_string());
            return self.cancel_order(order_id, &reason, actor).await;
        }

        let _guard = self.locks.acquire(order_id).await;
        let mut tx = self.db.begin_write().await?;

        let mut order = load(&mut tx, order_id).await?;
        let from = order.status;
        if !transitions::can_transition(from, new_status) {
            return Err(ManagerError::InvalidTransition {
                from,
                to: new_status,
            });
        }

        let at = next_history_timestamp(&mut tx, order_id).await?;
        order.status = new_status;
        transitions::stamp_stage(&mut order, new_status, at);
        order.updated_at = at;
        save(&mut tx, &order).await?;

        order_repo::insert_history(
            &mut *tx,
            &OrderStatusHistory {
                id: snowflake_id(),
                order_id,
                status: new_status,
                changed_by: actor,
                remarks,
                timestamp: at,
            },
        )
        .await?;

        let audience = resolve_audience(&mut tx, &order).await?;
        if let Some(notice) = inbox::status_notice(&order, audience.customer_user_id) {
            notification::create(&mut *tx, notice).await?;
        }

        let order = load(&mut tx, order_id).await?;
        tx.commit().await?;

        tracing::info!(
            order_id,
            order_number = %order.order_number,
            from = %from,
            status = %new_status,
            actor = %actor,
            "Order status updated"
        );

        self.dispatcher.spawn_order_update(order.clone(), audience);
        Ok(order)
    }

    /// Cancel an order that the kitchen has not finished
    ///
    /// - DELIVERED → [`ManagerError::OrderAlreadyDelivered`]
    /// - CANCELLED → [`ManagerError::OrderAlreadyCancelled`]
    /// - READY_FOR_PICKUP and later → [`ManagerError::InvalidTransition`]
    pub async fn cancel_order(
        &self,
        order_id: i64,
        reason: &str,
        cancelled_by: ActorTag,
    ) -> ManagerResult<Order> {
        if cancelled_by == ActorTag::System {
            return Err(ManagerError::InvalidArgument {
                field: "cancelledBy",
                message: "SYSTEM cannot cancel an order".to_string(),
            });
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ManagerError::InvalidArgument {
                field: "reason",
                message: "must not be empty".to_string(),
            });
        }

        let _guard = self.locks.acquire(order_id).await;
        let mut tx = self.db.begin_write().await?;

        let mut order = load(&mut tx, order_id).await?;
        match order.status {
            OrderStatus::Delivered => return Err(ManagerError::OrderAlreadyDelivered(order_id)),
            OrderStatus::Cancelled => return Err(ManagerError::OrderAlreadyCancelled(order_id)),
            status if !transitions::is_cancellable(status) => {
                return Err(ManagerError::InvalidTransition {
                    from: status,
                    to: OrderStatus::Cancelled,
                });
            }
            _ => {}
        }

        let from = order.status;
        let at = next_history_timestamp(&mut tx, order_id).await?;
        order.status = OrderStatus::Cancelled;
        transitions::stamp_stage(&mut order, OrderStatus::Cancelled, at);
        order.cancellation_reason = Some(reason.to_string());
        order.cancelled_by = Some(cancelled_by);
        order.updated_at = at;
        save(&mut tx, &order).await?;

        order_repo::insert_history(
            &mut *tx,
            &OrderStatusHistory {
                id: snowflake_id(),
                order_id,
                status: OrderStatus::Cancelled,
                changed_by: cancelled_by,
                remarks: Some(reason.to_string()),
                timestamp: at,
            },
        )
        .await?;

        let audience = resolve_audience(&mut tx, &order).await?;
        if let Some(notice) = inbox::status_notice(&order, audience.customer_user_id) {
            notification::create(&mut *tx, notice).await?;
        }

        let order = load(&mut tx, order_id).await?;
        tx.commit().await?;

        tracing::info!(
            order_id,
            order_number = %order.order_number,
            from = %from,
            actor = %cancelled_by,
            reason,
            "Order cancelled"
        );

        self.dispatcher.spawn_order_update(order.clone(), audience);
        Ok(order)
    }

    /// Bind (or re-bind) a delivery partner
    ///
    /// Status is unchanged, so no history row is written; the version still
    /// moves. Partner load and availability are not checked here.
    pub async fn assign_delivery_partner(
        &self,
        order_id: i64,
        partner_id: i64,
    ) -> ManagerResult<Order> {
        let _guard = self.locks.acquire(order_id).await;
        let mut tx = self.db.begin_write().await?;

        let mut order = load(&mut tx, order_id).await?;
        let partner = actor::find_partner(&mut *tx, partner_id)
            .await?
            .ok_or(ManagerError::DeliveryPartnerNotFound(partner_id))?;
        if order.status.is_terminal() {
            return Err(ManagerError::OrderTerminal {
                order_id,
                status: order.status,
            });
        }

        let previous = order.delivery_partner_id;
        order.delivery_partner_id = Some(partner.id);
        order.updated_at = now_millis().max(order.updated_at);
        save(&mut tx, &order).await?;

        notification::create(&mut *tx, inbox::assignment_notice(&order, partner.user_id)).await?;
        let audience = resolve_audience(&mut tx, &order).await?;

        let order = load(&mut tx, order_id).await?;
        tx.commit().await?;

        tracing::info!(
            order_id,
            order_number = %order.order_number,
            partner_id,
            previous_partner_id = ?previous,
            "Delivery partner assigned"
        );

        self.dispatcher.spawn_assignment(order.clone(), audience);
        Ok(order)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn get_order(&self, order_id: i64) -> ManagerResult<Order> {
        let mut conn = self.db.pool.acquire().await?;
        load(&mut conn, order_id).await
    }

    pub async fn get_order_by_number(&self, order_number: &str) -> ManagerResult<Order> {
        let mut conn = self.db.pool.acquire().await?;
        order_repo::find_by_number(&mut conn, order_number)
            .await?
            .ok_or_else(|| ManagerError::OrderNumberNotFound(order_number.to_string()))
    }

    /// Newest first
    pub async fn orders_by_customer(&self, customer_id: i64) -> ManagerResult<Vec<Order>> {
        let mut conn = self.db.pool.acquire().await?;
        Ok(order_repo::find_by_customer(&mut conn, customer_id).await?)
    }

    /// Newest first
    pub async fn orders_by_restaurant(&self, restaurant_id: i64) -> ManagerResult<Vec<Order>> {
        let mut conn = self.db.pool.acquire().await?;
        Ok(order_repo::find_by_restaurant(&mut conn, restaurant_id).await?)
    }

    /// Newest first
    pub async fn orders_by_delivery_partner(&self, partner_id: i64) -> ManagerResult<Vec<Order>> {
        let mut conn = self.db.pool.acquire().await?;
        Ok(order_repo::find_by_partner(&mut conn, partner_id).await?)
    }

    /// PLACED / CONFIRMED / PREPARING, oldest first
    pub async fn pending_orders(&self) -> ManagerResult<Vec<Order>> {
        let mut conn = self.db.pool.acquire().await?;
        Ok(order_repo::find_pending(&mut conn).await?)
    }

    /// READY_FOR_PICKUP without a partner, oldest first
    pub async fn ready_for_pickup_unassigned(&self) -> ManagerResult<Vec<Order>> {
        let mut conn = self.db.pool.acquire().await?;
        Ok(order_repo::find_ready_unassigned(&mut conn).await?)
    }

    pub async fn orders_by_status(&self, status: OrderStatus) -> ManagerResult<Vec<Order>> {
        let mut conn = self.db.pool.acquire().await?;
        Ok(order_repo::find_by_status(&mut conn, status).await?)
    }

    pub async fn count_by_status(&self, status: OrderStatus) -> ManagerResult<i64> {
        let mut conn = self.db.pool.acquire().await?;
        Ok(order_repo::count_by_status(&mut conn, status).await?)
    }

    /// One page, newest first
    pub async fn list_orders(&self, limit: i64, offset: i64) -> ManagerResult<Vec<Order>> {
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(ManagerError::InvalidArgument {
                field: "limit",
                message: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }
        if offset < 0 {
            return Err(ManagerError::InvalidArgument {
                field: "offset",
                message: "must not be negative".to_string(),
            });
        }
        let mut conn = self.db.pool.acquire().await?;
        Ok(order_repo::find_all(&mut conn, limit, offset).await?)
    }

    /// Orders created during the current UTC day
    pub async fn today_orders(&self) -> ManagerResult<Vec<Order>> {
        let (start, end) = utc_day_bounds(now_millis());
        let mut conn = self.db.pool.acquire().await?;
        Ok(order_repo::find_created_between(&mut conn, start, end).await?)
    }

    /// Revenue of the current UTC day
    pub async fn today_revenue(&self) -> ManagerResult<Decimal> {
        let (start, end) = utc_day_bounds(now_millis());
        self.revenue_between(start, end).await
    }

    /// Sum of `total_amount` over non-cancelled orders created in `[start, end)`
    pub async fn revenue_between(&self, start: i64, end: i64) -> ManagerResult<Decimal> {
        if end < start {
            return Err(ManagerError::InvalidArgument {
                field: "end",
                message: "must not be before start".to_string(),
            });
        }
        let mut conn = self.db.pool.acquire().await?;
        let cents = order_repo::revenue_cents_between(&mut conn, start, end).await?;
        Ok(cents_to_decimal(cents))
    }
}

// ============================================================================
// Transaction helpers
// ============================================================================

async fn load(conn: &mut SqliteConnection, order_id: i64) -> ManagerResult<Order> {
    order_repo::find_by_id(conn, order_id)
        .await?
        .ok_or(ManagerError::OrderNotFound(order_id))
}

/// Versioned write; a stale version means another writer won
async fn save(conn: &mut SqliteConnection, order: &Order) -> ManagerResult<()> {
    if !order_repo::update_versioned(conn, order, order.version).await? {
        tracing::warn!(order_id = order.id, version = order.version, "Order version conflict");
        return Err(ManagerError::VersionConflict(order.id));
    }
    Ok(())
}

/// `max(now, last entry + 1ms)` so history stays strictly ordered
async fn next_history_timestamp(conn: &mut SqliteConnection, order_id: i64) -> ManagerResult<i64> {
    let now = now_millis();
    let last = order_repo::last_history_timestamp(conn, order_id).await?;
    Ok(last.map_or(now, |last| now.max(last + 1)))
}

async fn allocate_order_number(conn: &mut SqliteConnection, now: i64) -> ManagerResult<String> {
    for _ in 0..MAX_ORDER_NUMBER_ATTEMPTS {
        let candidate = generate_order_number(now);
        if !order_repo::number_exists(conn, &candidate).await? {
            return Ok(candidate);
        }
        tracing::debug!(order_number = %candidate, "Order number collision, regenerating");
    }
    Err(ManagerError::OrderNumberConflict)
}

async fn resolve_audience(conn: &mut SqliteConnection, order: &Order) -> ManagerResult<OrderAudience> {
    let customer = actor::find_customer(conn, order.customer_id)
        .await?
        .ok_or(ManagerError::CustomerNotFound(order.customer_id))?;
    let restaurant = catalog::find_restaurant(conn, order.restaurant_id)
        .await?
        .ok_or(ManagerError::RestaurantNotFound(order.restaurant_id))?;
    let partner_user_id = match order.delivery_partner_id {
        Some(partner_id) => actor::find_partner(conn, partner_id)
            .await?
            .map(|p| p.user_id),
        None => None,
    };
    Ok(OrderAudience {
        customer_user_id: customer.user_id,
        vendor_user_id: restaurant.vendor_user_id,
        partner_user_id,
        customer_name: customer.name,
        restaurant_name: restaurant.name,
    })
}

#[cfg(test)]
mod tests;

//! Order API Handlers

use axum::extract::State;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{ActorTag, CreateOrderRequest, Order, OrderStatus};

use crate::api::{ApiJson, ApiPath, ApiQuery};
use crate::auth::{CurrentUser, permissions};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ok, ok_with_message};

const DEFAULT_PAGE_SIZE: i64 = 20;

fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
    raw.parse::<OrderStatus>()
        .map_err(|_| AppError::invalid_argument("status", format!("unknown order status: {raw}")))
}

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub status: Option<String>,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignQuery {
    pub delivery_partner_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelQuery {
    #[serde(default)]
    pub reason: String,
    /// Defaults to the caller's own tag
    pub cancelled_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
    pub start: i64,
    pub end: i64,
}

// =============================================================================
// Mutations
// =============================================================================

/// Place a new order
pub async fn create(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<CreateOrderRequest>,
) -> AppResult<ApiResponse<Order>> {
    user.require_any(permissions::CREATE_ORDER)?;
    let order = state.orders.create_order(payload).await?;
    Ok(ok_with_message(order, "Order created successfully"))
}

/// Advance an order one stage (or cancel it)
pub async fn update_status(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<StatusQuery>,
) -> AppResult<ApiResponse<Order>> {
    user.require_any(permissions::UPDATE_STATUS)?;
    let status = parse_status(&query.status)?;
    let order = state
        .orders
        .update_status(id, status, query.remarks, user.actor_tag())
        .await?;
    Ok(ok_with_message(order, "Order status updated successfully"))
}

pub async fn assign_delivery_partner(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<AssignQuery>,
) -> AppResult<ApiResponse<Order>> {
    user.require_any(permissions::ASSIGN_PARTNER)?;
    let order = state
        .orders
        .assign_delivery_partner(id, query.delivery_partner_id)
        .await?;
    Ok(ok_with_message(order, "Delivery partner assigned successfully"))
}

pub async fn cancel(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<CancelQuery>,
) -> AppResult<ApiResponse<Order>> {
    user.require_any(permissions::CANCEL_ORDER)?;
    let cancelled_by = match query.cancelled_by.as_deref() {
        Some(raw) => raw.parse::<ActorTag>().map_err(|_| {
            AppError::invalid_argument("cancelledBy", format!("unknown actor: {raw}"))
        })?,
        None => user.actor_tag(),
    };
    let order = state
        .orders
        .cancel_order(id, &query.reason, cancelled_by)
        .await?;
    Ok(ok_with_message(order, "Order cancelled successfully"))
}

// =============================================================================
// Reads
// =============================================================================

pub async fn get_by_id(
    _user: CurrentUser,
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<Order>> {
    Ok(ok(state.orders.get_order(id).await?))
}

pub async fn get_by_number(
    _user: CurrentUser,
    State(state): State<ServerState>,
    ApiPath(order_number): ApiPath<String>,
) -> AppResult<ApiResponse<Order>> {
    Ok(ok(state.orders.get_order_by_number(&order_number).await?))
}

/// Admin listing, optionally narrowed to one status
pub async fn list(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    user.require_any(permissions::LIST_ORDERS)?;
    let orders = match query.status.as_deref() {
        Some(raw) => state.orders.orders_by_status(parse_status(raw)?).await?,
        None => state.orders.list_orders(query.limit, query.offset).await?,
    };
    Ok(ok(orders))
}

pub async fn count_by_status(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiPath(status): ApiPath<String>,
) -> AppResult<ApiResponse<i64>> {
    user.require_any(permissions::LIST_ORDERS)?;
    let status = parse_status(&status)?;
    Ok(ok(state.orders.count_by_status(status).await?))
}

pub async fn by_customer(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiPath(customer_id): ApiPath<i64>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    user.require_any(permissions::CUSTOMER_ORDERS)?;
    Ok(ok(state.orders.orders_by_customer(customer_id).await?))
}

pub async fn by_restaurant(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiPath(restaurant_id): ApiPath<i64>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    user.require_any(permissions::RESTAURANT_ORDERS)?;
    Ok(ok(state.orders.orders_by_restaurant(restaurant_id).await?))
}

pub async fn by_delivery_partner(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiPath(partner_id): ApiPath<i64>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    user.require_any(permissions::PARTNER_ORDERS)?;
    Ok(ok(state.orders.orders_by_delivery_partner(partner_id).await?))
}

/// Orders the kitchen has not finished, oldest first
pub async fn pending(
    user: CurrentUser,
    State(state): State<ServerState>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    user.require_any(permissions::PENDING_ORDERS)?;
    Ok(ok(state.orders.pending_orders().await?))
}

pub async fn ready_for_pickup(
    user: CurrentUser,
    State(state): State<ServerState>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    user.require_any(permissions::READY_FOR_PICKUP)?;
    Ok(ok(state.orders.ready_for_pickup_unassigned().await?))
}

pub async fn today(
    user: CurrentUser,
    State(state): State<ServerState>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    user.require_any(permissions::TODAY_ORDERS)?;
    Ok(ok(state.orders.today_orders().await?))
}

pub async fn revenue_today(
    user: CurrentUser,
    State(state): State<ServerState>,
) -> AppResult<ApiResponse<Decimal>> {
    user.require_any(permissions::REVENUE)?;
    Ok(ok(state.orders.today_revenue().await?))
}

/// Revenue over `[start, end)` in epoch millis
pub async fn revenue(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<RevenueQuery>,
) -> AppResult<ApiResponse<Decimal>> {
    user.require_any(permissions::REVENUE)?;
    Ok(ok(state.orders.revenue_between(query.start, query.end).await?))
}

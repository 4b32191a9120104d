use crate::db::repository::RepoError;
use crate::utils::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),

    #[error("Invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Order not found: {0}")]
    OrderNumberNotFound(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(i64),

    #[error("Restaurant not found: {0}")]
    RestaurantNotFound(i64),

    #[error("Restaurant {0} is not accepting orders")]
    RestaurantNotAccepting(i64),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(i64),

    #[error("Menu item {menu_item_id} does not belong to restaurant {restaurant_id}")]
    MenuItemRestaurantMismatch {
        menu_item_id: i64,
        restaurant_id: i64,
    },

    #[error("Menu item '{name}' ({menu_item_id}) is not available")]
    MenuItemUnavailable { menu_item_id: i64, name: String },

    #[error("Delivery partner not found: {0}")]
    DeliveryPartnerNotFound(i64),

    #[error("Order must contain at least one item")]
    EmptyOrder,

    #[error("items[{index}].quantity: must be a positive integer, got {quantity}")]
    InvalidQuantity { index: usize, quantity: i32 },

    #[error("{field}: {message}")]
    InvalidArgument {
        field: &'static str,
        message: String,
    },

    #[error("Cannot transition order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Cannot cancel delivered order {0}")]
    OrderAlreadyDelivered(i64),

    #[error("Order {0} is already cancelled")]
    OrderAlreadyCancelled(i64),

    #[error("Order {order_id} is {status} and can no longer be changed")]
    OrderTerminal { order_id: i64, status: OrderStatus },

    #[error("Order {0} was modified concurrently")]
    VersionConflict(i64),

    #[error("Could not allocate a unique order number")]
    OrderNumberConflict,
}

pub type ManagerResult<T> = Result<T, ManagerError>;

impl From<sqlx::Error> for ManagerError {
    fn from(err: sqlx::Error) -> Self {
        ManagerError::Repo(err.into())
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        let message = err.to_string();
        match err {
            ManagerError::Repo(e) => {
                tracing::error!(error = %e, "Order repository error");
                e.into()
            }
            ManagerError::Validation(e) => e.into(),
            ManagerError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message).with_detail("orderId", id)
            }
            ManagerError::OrderNumberNotFound(number) => {
                AppError::with_message(ErrorCode::OrderNotFound, message)
                    .with_detail("orderNumber", number)
            }
            ManagerError::CustomerNotFound(id) => {
                AppError::with_message(ErrorCode::CustomerNotFound, message)
                    .with_detail("customerId", id)
            }
            ManagerError::RestaurantNotFound(id) => {
                AppError::with_message(ErrorCode::RestaurantNotFound, message)
                    .with_detail("restaurantId", id)
            }
            ManagerError::RestaurantNotAccepting(id) => {
                AppError::with_message(ErrorCode::RestaurantNotAccepting, message)
                    .with_detail("restaurantId", id)
            }
            ManagerError::MenuItemNotFound(id) => {
                AppError::with_message(ErrorCode::MenuItemNotFound, message)
                    .with_detail("menuItemId", id)
            }
            ManagerError::MenuItemRestaurantMismatch { menu_item_id, .. } => {
                AppError::with_message(ErrorCode::MenuItemRestaurantMismatch, message)
                    .with_detail("menuItemId", menu_item_id)
            }
            ManagerError::MenuItemUnavailable { menu_item_id, .. } => {
                AppError::with_message(ErrorCode::MenuItemUnavailable, message)
                    .with_detail("menuItemId", menu_item_id)
            }
            ManagerError::DeliveryPartnerNotFound(id) => {
                AppError::with_message(ErrorCode::DeliveryPartnerNotFound, message)
                    .with_detail("deliveryPartnerId", id)
            }
            ManagerError::EmptyOrder => AppError::with_message(ErrorCode::OrderEmpty, message)
                .with_detail("field", "items"),
            ManagerError::InvalidQuantity { index, .. } => {
                AppError::with_message(ErrorCode::OrderInvalidQuantity, message)
                    .with_detail("field", format!("items[{index}].quantity"))
            }
            ManagerError::InvalidArgument { field, message } => {
                AppError::invalid_argument(field, message)
            }
            ManagerError::InvalidTransition { from, to } => AppError::invalid_transition(from, to),
            ManagerError::OrderAlreadyDelivered(id) => {
                AppError::with_message(ErrorCode::OrderAlreadyDelivered, message)
                    .with_detail("orderId", id)
            }
            ManagerError::OrderAlreadyCancelled(id) => {
                AppError::with_message(ErrorCode::OrderAlreadyCancelled, message)
                    .with_detail("orderId", id)
            }
            ManagerError::OrderTerminal { order_id, status } => AppError::invalid_state(message)
                .with_detail("orderId", order_id)
                .with_detail("status", status.as_str()),
            ManagerError::VersionConflict(id) => {
                AppError::with_message(ErrorCode::OrderVersionConflict, message)
                    .with_detail("orderId", id)
            }
            ManagerError::OrderNumberConflict => {
                AppError::with_message(ErrorCode::OrderNumberConflict, message)
            }
        }
    }
}

//! Unified error codes for the delivery platform
//!
//! Error codes are organized by range:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 6xxx: Catalog errors (restaurants, menu items)
//! - 7xxx: Actor errors (customers, delivery partners)
//! - 8xxx: Notification errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so that clients can switch
/// on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed (malformed argument)
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Operation not allowed in the current state
    InvalidState = 9,
    /// Concurrent modification detected
    Conflict = 10,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Identity headers are malformed
    InvalidIdentity = 1002,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Status change not permitted by the transition graph
    OrderInvalidTransition = 4002,
    /// Order already delivered
    OrderAlreadyDelivered = 4003,
    /// Order already cancelled
    OrderAlreadyCancelled = 4004,
    /// Order has no items
    OrderEmpty = 4005,
    /// Order was modified concurrently
    OrderVersionConflict = 4006,
    /// Could not allocate a unique order number
    OrderNumberConflict = 4007,
    /// Invalid item quantity
    OrderInvalidQuantity = 4008,

    // ==================== 6xxx: Catalog ====================
    /// Restaurant not found
    RestaurantNotFound = 6001,
    /// Restaurant is not accepting orders
    RestaurantNotAccepting = 6002,
    /// Menu item not found
    MenuItemNotFound = 6101,
    /// Menu item is unavailable or inactive
    MenuItemUnavailable = 6102,
    /// Menu item belongs to another restaurant
    MenuItemRestaurantMismatch = 6103,

    // ==================== 7xxx: Actor ====================
    /// Customer not found
    CustomerNotFound = 7001,
    /// Delivery partner not found
    DeliveryPartnerNotFound = 7101,

    // ==================== 8xxx: Notification ====================
    /// Notification not found
    NotificationNotFound = 8001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidState => "Operation not allowed in the current state",
            ErrorCode::Conflict => "Resource was modified concurrently",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidIdentity => "Caller identity is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderInvalidTransition => "Order status transition is not allowed",
            ErrorCode::OrderAlreadyDelivered => "Order has already been delivered",
            ErrorCode::OrderAlreadyCancelled => "Order has already been cancelled",
            ErrorCode::OrderEmpty => "Order must contain at least one item",
            ErrorCode::OrderVersionConflict => "Order was modified by another request",
            ErrorCode::OrderNumberConflict => "Could not allocate a unique order number",
            ErrorCode::OrderInvalidQuantity => "Item quantity must be positive",

            // Catalog
            ErrorCode::RestaurantNotFound => "Restaurant not found",
            ErrorCode::RestaurantNotAccepting => "Restaurant is not accepting orders",
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",
            ErrorCode::MenuItemRestaurantMismatch => {
                "Menu item does not belong to the restaurant"
            }

            // Actor
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::DeliveryPartnerNotFound => "Delivery partner not found",

            // Notification
            ErrorCode::NotificationNotFound => "Notification not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            9 => Ok(ErrorCode::InvalidState),
            10 => Ok(ErrorCode::Conflict),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidIdentity),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderInvalidTransition),
            4003 => Ok(ErrorCode::OrderAlreadyDelivered),
            4004 => Ok(ErrorCode::OrderAlreadyCancelled),
            4005 => Ok(ErrorCode::OrderEmpty),
            4006 => Ok(ErrorCode::OrderVersionConflict),
            4007 => Ok(ErrorCode::OrderNumberConflict),
            4008 => Ok(ErrorCode::OrderInvalidQuantity),

            // Catalog
            6001 => Ok(ErrorCode::RestaurantNotFound),
            6002 => Ok(ErrorCode::RestaurantNotAccepting),
            6101 => Ok(ErrorCode::MenuItemNotFound),
            6102 => Ok(ErrorCode::MenuItemUnavailable),
            6103 => Ok(ErrorCode::MenuItemRestaurantMismatch),

            // Actor
            7001 => Ok(ErrorCode::CustomerNotFound),
            7101 => Ok(ErrorCode::DeliveryPartnerNotFound),

            // Notification
            8001 => Ok(ErrorCode::NotificationNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

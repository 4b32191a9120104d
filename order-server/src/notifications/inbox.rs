//! Durable notification inbox
//!
//! Admin-facing CRUD over the `notification` table, plus the builders for
//! the records the order engine writes alongside each change.

use shared::models::{
    Notification, NotificationCreate, NotificationPriority, NotificationType, Order, OrderStatus,
};

use crate::db::DbService;
use crate::db::repository::{RepoError, notification};
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Debug, Clone)]
pub struct InboxService {
    db: DbService,
}

impl InboxService {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    pub async fn create(&self, data: NotificationCreate) -> AppResult<Notification> {
        let mut conn = self.db.pool.acquire().await.map_err(RepoError::from)?;
        let created = notification::create(&mut conn, data).await?;
        tracing::debug!(notification_id = created.id, title = %created.title, "Notification created");
        Ok(created)
    }

    /// Newest first
    pub async fn list(&self, user_id: Option<i64>) -> AppResult<Vec<Notification>> {
        let mut conn = self.db.pool.acquire().await.map_err(RepoError::from)?;
        Ok(notification::find_all(&mut conn, user_id).await?)
    }

    pub async fn list_unread(&self, user_id: Option<i64>) -> AppResult<Vec<Notification>> {
        let mut conn = self.db.pool.acquire().await.map_err(RepoError::from)?;
        Ok(notification::find_unread(&mut conn, user_id).await?)
    }

    pub async fn unread_count(&self, user_id: Option<i64>) -> AppResult<i64> {
        let mut conn = self.db.pool.acquire().await.map_err(RepoError::from)?;
        Ok(notification::count_unread(&mut conn, user_id).await?)
    }

    pub async fn mark_read(&self, id: i64) -> AppResult<Notification> {
        let mut conn = self.db.pool.acquire().await.map_err(RepoError::from)?;
        notification::mark_read(&mut conn, id)
            .await
            .map_err(|e| not_found_as_notification(e, id))
    }

    /// Scoped to `user_id` when given, every record otherwise
    pub async fn mark_all_read(&self, user_id: Option<i64>) -> AppResult<u64> {
        let mut conn = self.db.pool.acquire().await.map_err(RepoError::from)?;
        let updated = notification::mark_all_read(&mut conn, user_id).await?;
        tracing::info!(user_id = ?user_id, updated, "Notifications marked as read");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut conn = self.db.pool.acquire().await.map_err(RepoError::from)?;
        notification::delete(&mut conn, id)
            .await
            .map_err(|e| not_found_as_notification(e, id))
    }
}

fn not_found_as_notification(err: RepoError, id: i64) -> AppError {
    match err {
        RepoError::NotFound(_) => AppError::with_message(
            ErrorCode::NotificationNotFound,
            format!("Notification {id} not found"),
        ),
        other => other.into(),
    }
}

// =============================================================================
// Records written by the order engine
// =============================================================================

/// Vendor inbox record for a freshly placed order
pub fn new_order_notice(order: &Order, vendor_user_id: i64) -> NotificationCreate {
    NotificationCreate {
        notification_type: NotificationType::Order,
        title: "New Order".into(),
        message: format!(
            "New order #{} received. Total: {}",
            order.order_number, order.total_amount
        ),
        priority: NotificationPriority::Medium,
        user_id: Some(vendor_user_id),
        order_id: Some(order.id),
    }
}

/// Customer inbox record for the order's current status
///
/// PLACED, PICKED_UP and OUT_FOR_DELIVERY produce no record.
pub fn status_notice(order: &Order, customer_user_id: i64) -> Option<NotificationCreate> {
    let number = &order.order_number;
    let (title, message, priority) = match order.status {
        OrderStatus::Confirmed => (
            "Order Confirmed",
            format!("Your order #{number} has been confirmed by the restaurant"),
            NotificationPriority::Medium,
        ),
        OrderStatus::Preparing => (
            "Order Being Prepared",
            format!("Your order #{number} is being prepared"),
            NotificationPriority::Medium,
        ),
        OrderStatus::ReadyForPickup => (
            "Order Ready",
            format!("Your order #{number} is ready for pickup"),
            NotificationPriority::Medium,
        ),
        OrderStatus::Delivered => (
            "Order Delivered",
            format!("Your order #{number} has been delivered"),
            NotificationPriority::Low,
        ),
        OrderStatus::Cancelled => (
            "Order Cancelled",
            format!(
                "Your order #{number} has been cancelled. Reason: {}",
                order.cancellation_reason.as_deref().unwrap_or("not given")
            ),
            NotificationPriority::High,
        ),
        OrderStatus::Placed | OrderStatus::PickedUp | OrderStatus::OutForDelivery => return None,
    };

    Some(NotificationCreate {
        notification_type: NotificationType::Order,
        title: title.into(),
        message,
        priority,
        user_id: Some(customer_user_id),
        order_id: Some(order.id),
    })
}

/// Partner inbox record for an assignment
pub fn assignment_notice(order: &Order, partner_user_id: i64) -> NotificationCreate {
    NotificationCreate {
        notification_type: NotificationType::DeliveryPartner,
        title: "Delivery Partner Assigned".into(),
        message: format!(
            "You have been assigned order #{}. Deliver to: {}",
            order.order_number, order.delivery_address
        ),
        priority: NotificationPriority::Medium,
        user_id: Some(partner_user_id),
        order_id: Some(order.id),
    }
}

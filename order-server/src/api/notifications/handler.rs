//! Notification API Handlers

use axum::extract::State;
use serde::Deserialize;
use shared::models::{Notification, NotificationCreate, UserRole};

use crate::api::{ApiJson, ApiPath, ApiQuery};
use crate::auth::{CurrentUser, permissions};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ok, ok_with_message};

/// Optional recipient scope shared by the inbox reads
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScope {
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SystemNotificationRequest {
    pub message: String,
    pub role: UserRole,
}

pub async fn list(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiQuery(scope): ApiQuery<UserScope>,
) -> AppResult<ApiResponse<Vec<Notification>>> {
    user.require_any(permissions::NOTIFICATION_INBOX)?;
    Ok(ok(state.inbox.list(scope.user_id).await?))
}

pub async fn list_unread(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiQuery(scope): ApiQuery<UserScope>,
) -> AppResult<ApiResponse<Vec<Notification>>> {
    user.require_any(permissions::NOTIFICATION_INBOX)?;
    Ok(ok(state.inbox.list_unread(scope.user_id).await?))
}

pub async fn unread_count(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiQuery(scope): ApiQuery<UserScope>,
) -> AppResult<ApiResponse<i64>> {
    user.require_any(permissions::NOTIFICATION_INBOX)?;
    Ok(ok(state.inbox.unread_count(scope.user_id).await?))
}

pub async fn create(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<NotificationCreate>,
) -> AppResult<ApiResponse<Notification>> {
    user.require_any(permissions::NOTIFICATION_INBOX)?;
    if payload.title.trim().is_empty() {
        return Err(AppError::invalid_argument("title", "title must not be blank"));
    }
    if payload.message.trim().is_empty() {
        return Err(AppError::invalid_argument("message", "message must not be blank"));
    }
    let created = state.inbox.create(payload).await?;
    Ok(ok_with_message(created, "Notification created successfully"))
}

/// Announce on a role's system topic; returns the number of deliveries
pub async fn send_system(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<SystemNotificationRequest>,
) -> AppResult<ApiResponse<usize>> {
    user.require_any(permissions::NOTIFICATION_INBOX)?;
    if payload.message.trim().is_empty() {
        return Err(AppError::invalid_argument("message", "message must not be blank"));
    }
    let delivered = state
        .orders
        .dispatcher()
        .send_system_notification(&payload.message, payload.role)
        .await;
    tracing::info!(role = %payload.role, delivered, "System notification sent");
    Ok(ok_with_message(delivered, "System notification sent"))
}

pub async fn mark_read(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<Notification>> {
    user.require_any(permissions::NOTIFICATION_INBOX)?;
    let notification = state.inbox.mark_read(id).await?;
    Ok(ok_with_message(notification, "Notification marked as read"))
}

/// Returns how many records changed
pub async fn mark_all_read(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiQuery(scope): ApiQuery<UserScope>,
) -> AppResult<ApiResponse<u64>> {
    user.require_any(permissions::NOTIFICATION_INBOX)?;
    let updated = state.inbox.mark_all_read(scope.user_id).await?;
    Ok(ok_with_message(updated, "All notifications marked as read"))
}

pub async fn delete(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<()>> {
    user.require_any(permissions::NOTIFICATION_INBOX)?;
    state.inbox.delete(id).await?;
    Ok(ok_with_message((), "Notification deleted successfully"))
}

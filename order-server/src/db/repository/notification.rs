//! Notification Repository

use super::{RepoError, RepoResult};
use shared::models::{Notification, NotificationCreate};
use sqlx::SqliteConnection;

const NOTIFICATION_SELECT: &str = "SELECT id, notification_type, title, message, priority, is_read, user_id, order_id, created_at, updated_at FROM notification";

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Notification>> {
    let notification =
        sqlx::query_as::<_, Notification>(&format!("{NOTIFICATION_SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(notification)
}

pub async fn create(
    conn: &mut SqliteConnection,
    data: NotificationCreate,
) -> RepoResult<Notification> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO notification (id, notification_type, title, message, priority, is_read, user_id, order_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.notification_type)
    .bind(&data.title)
    .bind(&data.message)
    .bind(data.priority)
    .bind(data.user_id)
    .bind(data.order_id)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    find_by_id(conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create notification".into()))
}

/// Newest first; scoped to `user_id` when given
pub async fn find_all(
    conn: &mut SqliteConnection,
    user_id: Option<i64>,
) -> RepoResult<Vec<Notification>> {
    let notifications = match user_id {
        Some(user_id) => {
            sqlx::query_as::<_, Notification>(&format!(
                "{NOTIFICATION_SELECT} WHERE user_id = ? ORDER BY created_at DESC, id DESC"
            ))
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_as::<_, Notification>(&format!(
                "{NOTIFICATION_SELECT} ORDER BY created_at DESC, id DESC"
            ))
            .fetch_all(&mut *conn)
            .await?
        }
    };
    Ok(notifications)
}

pub async fn find_unread(
    conn: &mut SqliteConnection,
    user_id: Option<i64>,
) -> RepoResult<Vec<Notification>> {
    let notifications = match user_id {
        Some(user_id) => {
            sqlx::query_as::<_, Notification>(&format!(
                "{NOTIFICATION_SELECT} WHERE is_read = 0 AND user_id = ? ORDER BY created_at DESC, id DESC"
            ))
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_as::<_, Notification>(&format!(
                "{NOTIFICATION_SELECT} WHERE is_read = 0 ORDER BY created_at DESC, id DESC"
            ))
            .fetch_all(&mut *conn)
            .await?
        }
    };
    Ok(notifications)
}

pub async fn count_unread(conn: &mut SqliteConnection, user_id: Option<i64>) -> RepoResult<i64> {
    let count: i64 = match user_id {
        Some(user_id) => {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM notification WHERE is_read = 0 AND user_id = ?",
            )
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_scalar("SELECT COUNT(*) FROM notification WHERE is_read = 0")
                .fetch_one(&mut *conn)
                .await?
        }
    };
    Ok(count)
}

/// Flip one record to read; `NotFound` when the id is unknown
pub async fn mark_read(conn: &mut SqliteConnection, id: i64) -> RepoResult<Notification> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE notification SET is_read = 1, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Notification {id} not found")));
    }
    find_by_id(conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Notification {id} not found")))
}

/// Returns the number of records flipped
pub async fn mark_all_read(conn: &mut SqliteConnection, user_id: Option<i64>) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let result = match user_id {
        Some(user_id) => {
            sqlx::query(
                "UPDATE notification SET is_read = 1, updated_at = ? WHERE is_read = 0 AND user_id = ?",
            )
            .bind(now)
            .bind(user_id)
            .execute(&mut *conn)
            .await?
        }
        None => {
            sqlx::query("UPDATE notification SET is_read = 1, updated_at = ? WHERE is_read = 0")
                .bind(now)
                .execute(&mut *conn)
                .await?
        }
    };
    Ok(result.rows_affected())
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM notification WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Notification {id} not found")));
    }
    Ok(())
}

//! Notification API Module
//!
//! Admin inbox over the durable `notification` table, plus role-topic
//! announcements on the live bus.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Notification router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/notifications", get(handler::list).post(handler::create))
        .route("/notifications/system", post(handler::send_system))
        .route("/notifications/unread", get(handler::list_unread))
        .route("/notifications/unread/count", get(handler::unread_count))
        .route("/notifications/read-all", put(handler::mark_all_read))
        .route("/notifications/{id}/read", put(handler::mark_read))
        .route("/notifications/{id}", axum::routing::delete(handler::delete))
}

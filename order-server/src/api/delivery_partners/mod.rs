//! Delivery Partner API Module
//!
//! Only the availability search; partner CRUD lives outside this service.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/delivery-partners/available", get(handler::available))
}

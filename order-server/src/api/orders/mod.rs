//! Order API Module
//!
//! Every mutation goes through `OrdersManager`; handlers only check the
//! caller's role and translate query strings.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/orders", post(handler::create).get(handler::list))
        // Static segments take precedence over `/{id}`
        .route("/orders/pending", get(handler::pending))
        .route("/orders/ready-for-pickup", get(handler::ready_for_pickup))
        .route("/orders/today", get(handler::today))
        .route("/orders/revenue", get(handler::revenue))
        .route("/orders/revenue/today", get(handler::revenue_today))
        .route("/orders/status/{status}/count", get(handler::count_by_status))
        .route("/orders/number/{order_number}", get(handler::get_by_number))
        .route("/orders/customer/{customer_id}", get(handler::by_customer))
        .route("/orders/restaurant/{restaurant_id}", get(handler::by_restaurant))
        .route(
            "/orders/delivery-partner/{partner_id}",
            get(handler::by_delivery_partner),
        )
        .route("/orders/{id}", get(handler::get_by_id))
        .route("/orders/{id}/status", put(handler::update_status))
        .route(
            "/orders/{id}/assign-delivery-partner",
            put(handler::assign_delivery_partner),
        )
        .route("/orders/{id}/cancel", put(handler::cancel))
}

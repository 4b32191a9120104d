//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单生命周期与查询
//! - [`notifications`] - 通知收件箱 (管理后台)
//! - [`delivery_partners`] - 可接单骑手查询
//! - [`events`] - 实时推送 (SSE)
//!
//! 除 `/health` 外，所有路由都需要 `x-user-id` / `x-user-role` 身份头。

pub mod delivery_partners;
pub mod events;
pub mod extract;
pub mod health;
pub mod notifications;
pub mod orders;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

pub use extract::{ApiJson, ApiPath, ApiQuery};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone, Copy, Default)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(notifications::router())
        .merge(delivery_partners::router())
        .merge(events::router())
}

/// Build a fully configured application with all middleware and state
///
/// Used by both the HTTP server and in-process `oneshot` tests.
pub fn build_app(state: ServerState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    build_router()
        .with_state(state)
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        // Trace - Request tracing
        .layer(TraceLayer::new_for_http())
        // Request ID - outermost, so the trace span sees it
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
}

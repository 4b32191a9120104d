//! 实时推送 (Server-Sent Events)
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /events | GET | 订阅调用者可见的总线消息 | 任意角色 |
//!
//! 每个连接订阅 [`Audience::subscriptions_for`] 给出的受众：
//! 自己的用户队列、所属角色的系统主题，管理员另加订单主题。
//! SSE 事件名为消息类型 (`ORDER_UPDATE` 等)，数据为完整的 [`BusMessage`] JSON。
//! 总线关闭时流结束。

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::Stream;
use shared::message::{Audience, BusMessage};
use tokio_util::sync::CancellationToken;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::message::AudienceReceiver;

pub fn router() -> Router<ServerState> {
    Router::new().route("/events", get(subscribe))
}

pub async fn subscribe(
    user: CurrentUser,
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state
        .bus
        .subscribe_filtered(Audience::subscriptions_for(user.user_id, user.role));
    tracing::info!(user_id = user.user_id, role = %user.role, "Event stream opened");

    Sse::new(event_stream(rx, state.bus.shutdown_token().clone()))
        .keep_alive(KeepAlive::default())
}

fn event_stream(
    rx: AudienceReceiver,
    shutdown: CancellationToken,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    futures::stream::unfold((rx, shutdown), |(mut rx, shutdown)| async move {
        let msg = tokio::select! {
            _ = shutdown.cancelled() => None,
            msg = rx.recv() => msg,
        }?;
        Some((to_event(&msg), (rx, shutdown)))
    })
}

fn to_event(msg: &BusMessage) -> Result<Event, axum::Error> {
    Event::default()
        .event(msg.event_type().as_str())
        .id(msg.request_id.to_string())
        .json_data(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageBus;
    use futures::StreamExt;
    use shared::message::SystemEvent;
    use shared::models::UserRole;

    #[tokio::test]
    async fn test_stream_yields_matching_messages() {
        let bus = MessageBus::new();
        let rx = bus.subscribe_filtered(Audience::subscriptions_for(7, UserRole::Vendor));
        let mut stream = Box::pin(event_stream(rx, bus.shutdown_token().clone()));

        bus.send(BusMessage::new(Audience::User(8), SystemEvent::new("other", 1)))
            .unwrap();
        bus.send(BusMessage::new(
            Audience::RoleSystem(UserRole::Vendor),
            SystemEvent::new("menu sync tonight", 2),
        ))
        .unwrap();

        let event = stream.next().await.unwrap();
        assert!(event.is_ok());
    }

    #[tokio::test]
    async fn test_stream_ends_on_shutdown() {
        let bus = MessageBus::new();
        let rx = bus.subscribe_filtered([Audience::AdminOrders]);
        let mut stream = Box::pin(event_stream(rx, bus.shutdown_token().clone()));

        bus.shutdown();
        assert!(stream.next().await.is_none());
    }
}

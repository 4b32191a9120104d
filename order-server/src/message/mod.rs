//! 进程内消息总线
//!
//! 订单引擎通过 [`EventPublisher`] 发布事件，不关心推送渠道的具体实现。
//! 默认实现 [`MessageBus`] 基于 `tokio::sync::broadcast`，订阅方按
//! [`Audience`] 过滤自己的消息。
//!
//! ```text
//! NotificationDispatcher ──▶ EventPublisher::publish(audience, payload)
//!                                     │
//!                                     ▼
//!                     broadcast::Sender<BusMessage>
//!                                     │
//!              ┌──────────────────────┼──────────────────────┐
//!              ▼                      ▼                      ▼
//!     AudienceReceiver(User)  AudienceReceiver(Admin)   SSE /events
//! ```

use async_trait::async_trait;
use thiserror::Error;

pub mod bus;
pub mod filter;

pub use bus::MessageBus;
pub use filter::{AudienceFilter, AudienceReceiver};
pub use shared::message::{Audience, BusMessage, BusPayload, EventType};

/// 发布失败
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Message bus is shut down")]
    Closed,

    #[error("Publish failed: {0}")]
    Failed(String),
}

/// 推送渠道抽象
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, audience: Audience, payload: BusPayload) -> Result<(), PublishError>;
}

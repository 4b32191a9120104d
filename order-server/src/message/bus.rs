//! 消息总线核心实现

use async_trait::async_trait;
use shared::message::{Audience, BusMessage, BusPayload};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::filter::{AudienceFilter, AudienceReceiver};
use super::{EventPublisher, PublishError};

/// Default broadcast channel capacity
pub const DEFAULT_CAPACITY: usize = 1024;

/// 消息总线 - 广播通道 + 关闭令牌
#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<BusMessage>,
    /// 关闭信号令牌
    shutdown_token: CancellationToken,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建指定容量的消息总线
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 发布消息到所有订阅者
    ///
    /// 没有订阅者不算错误：消息直接丢弃。
    pub fn send(&self, msg: BusMessage) -> Result<usize, PublishError> {
        if self.shutdown_token.is_cancelled() {
            return Err(PublishError::Closed);
        }
        match self.tx.send(msg) {
            Ok(receivers) => Ok(receivers),
            Err(broadcast::error::SendError(msg)) => {
                tracing::debug!(
                    audience = %msg.audience,
                    event_type = %msg.event_type(),
                    "No subscribers, message dropped"
                );
                Ok(0)
            }
        }
    }

    /// 订阅全部消息
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    /// 只订阅给定受众的消息
    pub fn subscribe_filtered(&self, audiences: impl IntoIterator<Item = Audience>) -> AudienceReceiver {
        AudienceReceiver::new(self.tx.subscribe(), AudienceFilter::new(audiences))
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// 获取关闭令牌 (用于监控关闭信号)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// 关闭总线，之后的发布返回 [`PublishError::Closed`]
    pub fn shutdown(&self) {
        tracing::info!("Message bus shutting down");
        self.shutdown_token.cancel();
    }
}

#[async_trait]
impl EventPublisher for MessageBus {
    async fn publish(&self, audience: Audience, payload: BusPayload) -> Result<(), PublishError> {
        self.send(BusMessage::new(audience, payload)).map(|_| ())
    }
}
